use super::paginator::Paginator;
use crate::{
    auth::{self, Grant},
    config::{ClientConfig, DEFAULT_HOST, DEFAULT_PAGE_LIMIT},
    error::{ApiError, Error, Result},
    http::{owned_pairs, HttpTransport, ReqwestTransport, Request, Response},
};
use reqwest::{
    header::{HeaderValue, ACCEPT, AUTHORIZATION},
    Method,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::{borrow::Borrow, fmt};

/// The resource describing the authorized user.
const ME_RESOURCE: &str = "/me/";

/// The single authenticated entry point for all API operations.
///
/// A client holds one access token plus the most recent request/response
/// pair for diagnostics. Every dispatching method takes `&mut self`, so a
/// client can't be shared across concurrent tasks; use one client per task.
pub struct ApiClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    host: String,
    access_token: Option<SecretString>,
    last_request: Option<Request>,
    last_response: Option<Response>,
}

impl ApiClient<ReqwestTransport> {
    /// Creates a client for the production API, without an access token.
    pub fn new() -> Result<Self> {
        Self::from_config(ClientConfig::default())
    }

    /// Creates a client around an access token obtained earlier.
    pub fn with_access_token(access_token: impl Into<String>) -> Result<Self> {
        let mut client = Self::new()?;
        client.set_access_token(access_token);
        Ok(client)
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        let transport = ReqwestTransport::build(builder, config.timeout)?;
        Ok(Self::with_transport(transport).host(config.host))
    }
}

impl<T: HttpTransport> ApiClient<T> {
    /// Creates a client over a custom transport, pointed at the production API.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            host: DEFAULT_HOST.to_string(),
            access_token: None,
            last_request: None,
            last_response: None,
        }
    }

    /// Points the client at another host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn api_host(&self) -> &str {
        &self.host
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }

    /// Replaces the current access token. Nothing checks whether it has expired.
    pub fn set_access_token(&mut self, access_token: impl Into<String>) -> &mut Self {
        self.access_token = Some(SecretString::new(access_token.into()));
        self
    }

    /// Obtains a token for a user by their username and password.
    pub async fn authorize_by_password(
        &mut self,
        client_id: &str,
        client_secret: &str,
        scope: &str,
        username: &str,
        password: &str,
    ) -> Result<Response> {
        let grant = Grant::Password {
            client_id,
            scope,
            username,
            password,
        };
        self.request_token(&grant, client_id, client_secret).await
    }

    /// Builds the URL to send a user to so they can authorize this client.
    ///
    /// `response_type` is normally `"code"`.
    pub fn authorize_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        scope: &str,
        response_type: &str,
    ) -> String {
        auth::authorize_url(&self.host, client_id, redirect_uri, scope, response_type)
    }

    /// Exchanges an authorization code for an access token.
    pub async fn request_access_token(
        &mut self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Response> {
        let grant = Grant::AuthorizationCode {
            client_id,
            client_secret,
            code,
            redirect_uri,
        };
        self.request_token(&grant, client_id, client_secret).await
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// The new token is returned, not stored; see [`ApiClient::set_access_token`].
    pub async fn refresh_token(
        &mut self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<Response> {
        let grant = Grant::RefreshToken {
            client_id,
            client_secret,
            refresh_token,
        };
        self.request_token(&grant, client_id, client_secret).await
    }

    /// Obtains a token for the client itself via the `client_credentials` grant.
    pub async fn authorize_client(
        &mut self,
        client_id: &str,
        client_secret: &str,
        scope: &str,
    ) -> Result<Response> {
        let grant = Grant::ClientCredentials { client_id, scope };
        self.request_token(&grant, client_id, client_secret).await
    }

    /// Authorizes the client itself, then keeps the issued token for later calls.
    pub async fn self_authorize(
        &mut self,
        client_id: &str,
        client_secret: &str,
        scope: &str,
    ) -> Result<&mut Self> {
        let response = self
            .authorize_client(client_id, client_secret, scope)
            .await?;

        let Some(access_token) = response.result()?.get_str("access_token") else {
            return Err(Error::invalid_response(
                response.body(),
                "token reply has no access_token",
            ));
        };

        tracing::debug!("stored access token from client_credentials grant");
        Ok(self.set_access_token(access_token))
    }

    /// Verifies a signed request issued by the provider and returns its payload.
    pub fn parse_signed_request(&self, signed_request: &str, client_secret: &str) -> Result<Value> {
        auth::parse_signed_request(signed_request, client_secret)
    }

    /// Sends an authenticated GET with `params` in the query string.
    pub async fn get<I, K, V>(&mut self, resource: &str, params: I) -> Result<Response>
    where
        I: IntoIterator,
        I::Item: Borrow<(K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let request = Request::get(resource, params);
        self.send(request, &[], true).await
    }

    /// Sends an authenticated POST with `params` as form fields.
    pub async fn post<I, K, V>(&mut self, resource: &str, params: I) -> Result<Response>
    where
        I: IntoIterator,
        I::Item: Borrow<(K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let form = owned_pairs(params);
        let request = Request::new(Method::POST, resource);
        self.send(request, &form, true).await
    }

    /// Fetches the authorized user.
    pub async fn me(&mut self) -> Result<Response> {
        self.get(ME_RESOURCE, std::iter::empty::<(&str, &str)>())
            .await
    }

    /// Walks a paged list resource, `limit` items per request.
    pub fn paginate<I, K, V>(&mut self, resource: &str, params: I, limit: usize) -> Paginator<'_, T>
    where
        I: IntoIterator,
        I::Item: Borrow<(K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Paginator::new(self, resource, owned_pairs(params), limit)
    }

    /// Same as [`ApiClient::paginate`] with the default page size of 200.
    pub fn paginate_default<I, K, V>(&mut self, resource: &str, params: I) -> Paginator<'_, T>
    where
        I: IntoIterator,
        I::Item: Borrow<(K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.paginate(resource, params, DEFAULT_PAGE_LIMIT)
    }

    /// Dispatches `request` and checks the reply.
    ///
    /// Non-empty `form` fields are posted instead of the request body. With
    /// `use_auth`, the request carries the current access token as a bearer
    /// token and fails up front if there is none. Replies outside 2xx become
    /// [`Error::Api`].
    pub async fn send(
        &mut self,
        mut request: Request,
        form: &[(String, String)],
        use_auth: bool,
    ) -> Result<Response> {
        if request.host().is_none() {
            request.set_host(self.host.as_str());
        }
        if request.headers().get(ACCEPT).is_none() {
            request.add_header(ACCEPT, HeaderValue::from_static("application/json"));
        }
        self.last_request = Some(request.clone());
        self.last_response = None;

        if use_auth {
            let Some(access_token) = &self.access_token else {
                return Err(Error::Configuration("access token not provided".to_string()));
            };

            let mut value = HeaderValue::try_from(format!(
                "Bearer {}",
                access_token.expose_secret()
            ))
            .map_err(|error| Error::Configuration(format!("unusable access token: {error}")))?;
            value.set_sensitive(true);
            request.add_header(AUTHORIZATION, value);
            self.last_request = Some(request.clone());
        }

        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            authenticated = use_auth,
            "sending API request"
        );
        let response = self.transport.send(&request, form).await?;
        tracing::debug!(status = %response.status(), "received API response");
        self.last_response = Some(response.clone());

        if !response.is_successful() {
            let error = ApiError::new("Send failed", request, response);
            tracing::warn!(
                status = %error.status(),
                code = error.code().code(),
                "API request failed"
            );
            return Err(error.into());
        }

        Ok(response)
    }

    /// The most recently dispatched request, including its headers.
    pub fn last_request(&self) -> Option<&Request> {
        self.last_request.as_ref()
    }

    /// The reply to the most recent request, if the transport produced one.
    pub fn last_response(&self) -> Option<&Response> {
        self.last_response.as_ref()
    }

    async fn request_token(
        &mut self,
        grant: &Grant<'_>,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Response> {
        let request = auth::token_request(grant, client_id, client_secret)?;
        self.send(request, &[], false).await
    }
}

impl<T: HttpTransport> fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("host", &self.host)
            .field("access_token", &self.access_token)
            .field("last_request", &self.last_request)
            .finish_non_exhaustive()
    }
}
