use crate::{
    error::{Error, Result},
    model::Model,
};
use reqwest::{header::HeaderMap, StatusCode};
use serde_json::Value;
use std::sync::OnceLock;

/// A raw HTTP reply, plus a lazily decoded JSON view of its body.
///
/// The body never changes once a transport hands it over, so the decoded
/// view is computed at most once and shared by every accessor.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
    decoded: OnceLock<Model>,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: String) -> Self {
        Self {
            status,
            headers,
            body,
            decoded: OnceLock::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the status is in the 2xx range.
    pub fn is_successful(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// The decoded body, wrapped as a [`Model`].
    ///
    /// Fails with [`Error::InvalidResponse`] if the body isn't JSON.
    pub fn result(&self) -> Result<&Model> {
        if let Some(model) = self.decoded.get() {
            return Ok(model);
        }

        let value: Value = serde_json::from_str(&self.body)
            .map_err(|error| Error::invalid_response(&self.body, error))?;
        Ok(self.decoded.get_or_init(|| Model::new(value)))
    }

    /// A single field of the decoded body. A missing field is `Ok(None)`.
    pub fn result_field(&self, field: &str) -> Result<Option<&Value>> {
        Ok(self.result()?.get(field))
    }

    /// The decoded body as a plain JSON value.
    pub fn array_result(&self) -> Result<&Value> {
        Ok(self.result()?.as_value())
    }

    /// The given field of the decoded body, or the whole body if that field is
    /// absent or null.
    pub fn array_result_field(&self, field: &str) -> Result<&Value> {
        let value = self.array_result()?;
        Ok(value.get(field).filter(|field| !field.is_null()).unwrap_or(value))
    }

    /// The OAuth2 `error` field.
    pub fn error(&self) -> Result<Option<&Value>> {
        self.result_field("error")
    }

    /// The OAuth2 `error_description` field.
    pub fn error_description(&self) -> Result<Option<&Value>> {
        self.result_field("error_description")
    }

    pub fn error_code(&self) -> Result<Option<&Value>> {
        self.result_field("error_code")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: &str) -> Response {
        Response::new(StatusCode::OK, HeaderMap::new(), body.to_string())
    }

    #[test]
    fn test_decoding_is_cached() {
        let response = response(r#"{"access_token": "abc", "expires_in": 604800}"#);

        let first = response.result().unwrap();
        let second = response.result().unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(first.as_value(), response.array_result().unwrap()));
        assert_eq!(response.array_result().unwrap(), response.array_result().unwrap());
    }

    #[test]
    fn test_missing_field_is_none() {
        let response = response(r#"{"id": 1}"#);
        assert!(response.result_field("username").unwrap().is_none());
        assert_eq!(response.result_field("id").unwrap(), Some(&json!(1)));
    }

    #[test]
    fn test_array_result_field_falls_back_to_whole_body() {
        let response = response(r#"{"results": [1, 2], "_meta": {"count": 2}}"#);
        assert_eq!(response.array_result_field("results").unwrap(), &json!([1, 2]));
        assert_eq!(
            response.array_result_field("missing").unwrap(),
            response.array_result().unwrap()
        );
    }

    #[test]
    fn test_null_field_counts_as_absent() {
        let response = response(r#"{"advcampaign": null, "detail": "gone"}"#);
        assert_eq!(
            response.array_result_field("advcampaign").unwrap(),
            &json!({"advcampaign": null, "detail": "gone"})
        );
        // Plain field lookups still see the null.
        assert_eq!(response.result_field("advcampaign").unwrap(), Some(&Value::Null));
    }

    #[test]
    fn test_non_json_body_is_invalid() {
        for body in ["not json", "", "{\"unterminated\": "] {
            let response = response(body);
            assert!(matches!(response.array_result(), Err(Error::InvalidResponse { .. })));
            assert!(matches!(
                response.array_result_field("error"),
                Err(Error::InvalidResponse { .. })
            ));
            assert!(matches!(response.result(), Err(Error::InvalidResponse { .. })));
            assert!(matches!(response.error(), Err(Error::InvalidResponse { .. })));
        }
    }

    #[test]
    fn test_oauth_error_fields() {
        let response = Response::new(
            StatusCode::BAD_REQUEST,
            HeaderMap::new(),
            json!({"error": "invalid_grant", "error_description": "Invalid credentials given."})
                .to_string(),
        );
        assert!(!response.is_successful());
        assert_eq!(response.error().unwrap(), Some(&json!("invalid_grant")));
        assert_eq!(
            response.error_description().unwrap(),
            Some(&json!("Invalid credentials given."))
        );
        assert!(response.error_code().unwrap().is_none());
    }
}
