use crate::http::{Request, Response};
use reqwest::StatusCode;
use serde_json::Value;
use std::{fmt, time::Duration};
use thiserror::Error;

/// Convenience alias used across the client.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible error types while talking to the API.
#[derive(Error, Debug)]
pub enum Error {
    /// The operation needs something the client was never given, e.g. an access token.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body could not be read the way the operation required.
    #[error("invalid response ({message}): {body}")]
    InvalidResponse { body: String, message: String },

    /// A signed request was malformed or failed verification.
    #[error("invalid signed request: {0}")]
    InvalidSignedRequest(String),

    #[error(transparent)]
    Api(#[from] Box<ApiError>),
}

impl Error {
    /// Returns the API failure, if this error came from an unsuccessful reply.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }

    pub(crate) fn invalid_response(body: &str, message: impl fmt::Display) -> Self {
        Self::InvalidResponse {
            body: body.to_string(),
            message: message.to_string(),
        }
    }
}

/// Failures of the HTTP exchange itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP exchange failed: {0}")]
    Other(String),
}

/// Known business-rule violations reported through `non_field_errors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApiErrorCode {
    #[default]
    Generic,
    RequestExists,
    OrderAllocatedToYou,
    OrderAllocatedToAnotherPublisher,
}

impl ApiErrorCode {
    const KNOWN: [ApiErrorCode; 3] = [
        ApiErrorCode::RequestExists,
        ApiErrorCode::OrderAllocatedToYou,
        ApiErrorCode::OrderAllocatedToAnotherPublisher,
    ];

    /// The numeric code the provider documents for this violation.
    pub const fn code(self) -> u32 {
        match self {
            Self::Generic => 0,
            Self::RequestExists => 1100,
            Self::OrderAllocatedToYou => 1200,
            Self::OrderAllocatedToAnotherPublisher => 1300,
        }
    }

    /// The message the API sends for this violation.
    pub const fn message(self) -> Option<&'static str> {
        match self {
            Self::Generic => None,
            Self::RequestExists => Some("A request with this order number already exists"),
            Self::OrderAllocatedToYou => {
                Some("Order with this Order ID has already been allocated to you")
            }
            Self::OrderAllocatedToAnotherPublisher => {
                Some("Order with this Order ID has been allocated to another publisher")
            }
        }
    }

    /// Matches a `non_field_errors` entry against the known messages.
    ///
    /// Surrounding whitespace and letter case are ignored.
    pub fn from_message(message: &str) -> Self {
        let normalized = message.trim().to_lowercase();
        Self::KNOWN
            .into_iter()
            .find(|code| {
                code.message()
                    .is_some_and(|known| known.to_lowercase() == normalized)
            })
            .unwrap_or_default()
    }

    /// Classifies an error body. Anything we can't read is `Generic`.
    fn classify(response: &Response) -> Self {
        let Ok(Some(errors)) = response.result_field("non_field_errors") else {
            return Self::Generic;
        };

        errors
            .get(0)
            .and_then(Value::as_str)
            .map(Self::from_message)
            .unwrap_or_default()
    }
}

/// An HTTP reply was received, but its status reported a failure.
#[derive(Debug, Clone)]
pub struct ApiError {
    message: String,
    code: ApiErrorCode,
    request: Request,
    response: Response,
}

impl ApiError {
    /// Wraps a failed exchange, classifying the body on a best-effort basis.
    pub fn new(message: impl Into<String>, request: Request, response: Response) -> Self {
        let code = ApiErrorCode::classify(&response);
        Self {
            message: message.into(),
            code,
            request,
            response,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> ApiErrorCode {
        self.code
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// The request as it was dispatched, authorization header included.
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Whether the API rejected the call because the campaign does not exist.
    pub fn is_advcampaign_not_found(&self) -> bool {
        let Ok(Some(advcampaign)) = self.response.result_field("advcampaign") else {
            return false;
        };
        advcampaign.get(0).and_then(Value::as_str) == Some("advcampaign not found")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {}): HTTP {}",
            self.message,
            self.request.method(),
            self.request.url(),
            self.response.status()
        )?;
        if self.code != ApiErrorCode::Generic {
            write!(f, ", code {}", self.code.code())?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl From<ApiError> for Error {
    fn from(error: ApiError) -> Self {
        Self::Api(Box::new(error))
    }
}
