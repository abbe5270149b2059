mod client;
mod paginator;

pub use client::ApiClient;
pub use paginator::Paginator;
