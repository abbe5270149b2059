use crate::{
    error::{Error, Result},
    http::{encode_form, Request},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{
    header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Method,
};

/// The resource leveraged for every token grant.
pub const TOKEN_RESOURCE: &str = "/token/";

/// An OAuth2 grant accepted by the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant<'a> {
    /// Username and password on behalf of a client.
    ///
    /// The provider expects this shaped as a `client_credentials` grant.
    Password {
        client_id: &'a str,
        scope: &'a str,
        username: &'a str,
        password: &'a str,
    },
    AuthorizationCode {
        client_id: &'a str,
        client_secret: &'a str,
        code: &'a str,
        redirect_uri: &'a str,
    },
    RefreshToken {
        client_id: &'a str,
        client_secret: &'a str,
        refresh_token: &'a str,
    },
    ClientCredentials { client_id: &'a str, scope: &'a str },
}

impl<'a> Grant<'a> {
    /// The value sent as `grant_type`.
    pub fn grant_type(&self) -> &'static str {
        match self {
            Self::Password { .. } | Self::ClientCredentials { .. } => "client_credentials",
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }

    /// The form parameters posted to the token endpoint, in wire order.
    pub fn params(&self) -> Vec<(&'static str, &'a str)> {
        let grant_type = self.grant_type();
        match *self {
            Self::Password {
                client_id,
                scope,
                username,
                password,
            } => vec![
                ("client_id", client_id),
                ("grant_type", grant_type),
                ("username", username),
                ("password", password),
                ("scope", scope),
            ],
            Self::AuthorizationCode {
                client_id,
                client_secret,
                code,
                redirect_uri,
            } => vec![
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", grant_type),
                ("redirect_uri", redirect_uri),
            ],
            Self::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            } => vec![
                ("refresh_token", refresh_token),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", grant_type),
            ],
            Self::ClientCredentials { client_id, scope } => vec![
                ("client_id", client_id),
                ("scope", scope),
                ("grant_type", grant_type),
            ],
        }
    }

    /// Whether the client authenticates with HTTP Basic instead of body fields.
    fn uses_basic_auth(&self) -> bool {
        matches!(self, Self::Password { .. } | Self::ClientCredentials { .. })
    }
}

/// Builds the `POST /token/` request for `grant`.
///
/// `client_secret` is only used for grants that authenticate with HTTP Basic;
/// the others carry it within their parameters.
pub fn token_request(grant: &Grant<'_>, client_id: &str, client_secret: &str) -> Result<Request> {
    let mut request = Request::new(Method::POST, TOKEN_RESOURCE);
    request
        .set_body(encode_form(grant.params()))
        .add_header(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

    if grant.uses_basic_auth() {
        let credentials = STANDARD.encode(format!("{client_id}:{client_secret}"));
        let mut value = HeaderValue::try_from(format!("Basic {credentials}"))
            .map_err(|error| Error::Configuration(format!("invalid client credentials: {error}")))?;
        value.set_sensitive(true);
        request.add_header(AUTHORIZATION, value);
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use url::form_urlencoded;

    fn decoded_body(request: &Request) -> HashMap<String, String> {
        form_urlencoded::parse(request.body().unwrap().as_bytes())
            .into_owned()
            .collect()
    }

    fn expected(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_body_reproduces_every_grant() {
        let grants = [
            Grant::Password {
                client_id: "client",
                scope: "public_data websites",
                username: "user@example.com",
                password: "p&ss=word",
            },
            Grant::AuthorizationCode {
                client_id: "client",
                client_secret: "secret",
                code: "abc+/=",
                redirect_uri: "https://example.com/callback?x=1",
            },
            Grant::RefreshToken {
                client_id: "client",
                client_secret: "secret",
                refresh_token: "refresh token",
            },
            Grant::ClientCredentials {
                client_id: "client",
                scope: "advcampaigns banners",
            },
        ];

        for grant in grants {
            let request = token_request(&grant, "client", "secret").unwrap();
            assert_eq!(decoded_body(&request), expected(&grant.params()));
            assert_eq!(*request.method(), Method::POST);
            assert_eq!(request.resource(), "/token/");
        }
    }

    #[test]
    fn test_grant_types() {
        let password = Grant::Password {
            client_id: "c",
            scope: "s",
            username: "u",
            password: "p",
        };
        assert_eq!(password.grant_type(), "client_credentials");

        let refresh = Grant::RefreshToken {
            client_id: "c",
            client_secret: "s",
            refresh_token: "r",
        };
        assert_eq!(refresh.grant_type(), "refresh_token");
        let request = token_request(&refresh, "c", "s").unwrap();
        assert_eq!(decoded_body(&request)["grant_type"], "refresh_token");
    }

    #[test]
    fn test_basic_auth_only_for_client_credentials_shapes() {
        let client = Grant::ClientCredentials {
            client_id: "id",
            scope: "scope",
        };
        let request = token_request(&client, "id", "secret").unwrap();
        // base64("id:secret")
        assert_eq!(request.headers()[AUTHORIZATION], "Basic aWQ6c2VjcmV0");

        let code = Grant::AuthorizationCode {
            client_id: "id",
            client_secret: "secret",
            code: "code",
            redirect_uri: "https://example.com",
        };
        let request = token_request(&code, "id", "secret").unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
        assert_eq!(
            request.headers()[CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
    }
}
