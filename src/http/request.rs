use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use std::borrow::Borrow;
use url::form_urlencoded;

/// An outgoing API request, assembled before it is handed to a transport.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    /// Filled in with the client's host at dispatch time when left unset.
    host: Option<String>,
    /// The path, plus any query string, relative to the host.
    resource: String,
    headers: HeaderMap,
    body: Option<String>,
}

impl Request {
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self {
            method,
            host: None,
            resource: resource.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Creates a GET request with `params` serialized into its query string.
    pub fn get<I, K, V>(resource: &str, params: I) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<(K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let query = encode_form(params);
        if query.is_empty() {
            return Self::new(Method::GET, resource);
        }

        // Some resources already carry a query of their own.
        let separator = if resource.contains('?') { '&' } else { '?' };
        Self::new(Method::GET, format!("{resource}{separator}{query}"))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn set_host(&mut self, host: impl Into<String>) -> &mut Self {
        self.host = Some(host.into());
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Appends a header line, keeping any earlier line with the same name.
    pub fn add_header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.append(name, value);
        self
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    /// The absolute URL, or just the resource if no host has been assigned yet.
    pub fn url(&self) -> String {
        match &self.host {
            Some(host) => format!("{}{}", host.trim_end_matches('/'), self.resource),
            None => self.resource.clone(),
        }
    }
}

/// Serializes pairs as `application/x-www-form-urlencoded`.
pub(crate) fn encode_form<I, K, V>(params: I) -> String
where
    I: IntoIterator,
    I::Item: Borrow<(K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

/// Copies borrowed pairs into owned form fields.
pub(crate) fn owned_pairs<I, K, V>(params: I) -> Vec<(String, String)>
where
    I: IntoIterator,
    I::Item: Borrow<(K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    params
        .into_iter()
        .map(|pair| {
            let (key, value) = pair.borrow();
            (key.as_ref().to_string(), value.as_ref().to_string())
        })
        .collect()
}
