use super::{Request, Response};
use crate::{config::DEFAULT_TIMEOUT, error::TransportError};
use async_trait::async_trait;
use std::time::Duration;

/// Performs a single HTTP exchange on behalf of the client.
///
/// This is the seam for swapping out the network, e.g. in tests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request` as-is. Non-empty `form` fields replace the request body
    /// and are sent as `application/x-www-form-urlencoded`.
    async fn send(
        &self,
        request: &Request,
        form: &[(String, String)],
    ) -> Result<Response, TransportError>;
}

/// The default transport, backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport with the long default timeout of 300 seconds.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        Self::build(reqwest::Client::builder(), timeout)
    }

    pub(crate) fn build(
        builder: reqwest::ClientBuilder,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = builder
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError::Other(error.to_string()))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else {
            TransportError::Other(error.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: &Request,
        form: &[(String, String)],
    ) -> Result<Response, TransportError> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url())
            .headers(request.headers().clone());

        // Form fields win over any pre-serialized body.
        if !form.is_empty() {
            builder = builder.form(form);
        } else if let Some(body) = request.body() {
            builder = builder.body(body.to_string());
        }

        let result = builder
            .send()
            .await
            .map_err(|error| self.map_error(error))?;

        let status = result.status();
        let headers = result.headers().clone();
        let body = result
            .text()
            .await
            .map_err(|error| self.map_error(error))?;

        Ok(Response::new(status, headers, body))
    }
}
