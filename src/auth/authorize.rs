use crate::http::encode_form;

/// The path to the browser-facing authorization page.
pub const AUTHORIZE_RESOURCE: &str = "/authorize/";

/// Builds the URL a user is redirected to in order to grant access.
///
/// This is pure string assembly; nothing is sent.
pub fn authorize_url(
    host: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    response_type: &str,
) -> String {
    // Standard OAuth2 query parameters.
    let query = encode_form([
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
        ("scope", scope),
        ("response_type", response_type),
    ]);
    format!(
        "{}{AUTHORIZE_RESOURCE}?{query}",
        host.trim_end_matches('/')
    )
}
