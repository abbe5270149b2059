//! Client for the Admitad affiliate network REST API.
//!
//! [`ApiClient`] obtains OAuth2 tokens, sends authenticated requests and turns
//! unsuccessful replies into typed errors. Replies are decoded lazily through
//! [`Response::result`], list resources can be walked with a [`Paginator`], and
//! signed requests issued by the provider are verified with
//! [`parse_signed_request`].
//!
//! ```no_run
//! # async fn run() -> admitad_api::Result<()> {
//! let mut client = admitad_api::ApiClient::new()?;
//! client
//!     .self_authorize("client-id", "client-secret", "public_data websites")
//!     .await?;
//!
//! let me = client.me().await?;
//! println!("{:?}", me.result()?.get_str("username"));
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod model;

pub use api::{ApiClient, Paginator};
pub use auth::{parse_signed_request, Grant};
pub use config::ClientConfig;
pub use error::{ApiError, ApiErrorCode, Error, Result, TransportError};
pub use http::{HttpTransport, ReqwestTransport, Request, Response};
pub use model::Model;
