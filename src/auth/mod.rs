mod authorize;
mod signed_request;
mod token;

pub use authorize::{authorize_url, AUTHORIZE_RESOURCE};
pub use signed_request::parse_signed_request;
pub use token::{token_request, Grant, TOKEN_RESOURCE};

#[cfg(test)]
pub(crate) use signed_request::sign;
