mod request;
mod response;
mod transport;

pub use request::Request;
pub use response::Response;
pub use transport::{HttpTransport, ReqwestTransport};

pub(crate) use request::{encode_form, owned_pairs};
