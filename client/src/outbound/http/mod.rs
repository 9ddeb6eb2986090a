//! HTTP transport adapter and its session cookie jar.

mod cookies;
mod transport;

pub use cookies::{COOKIE_FILE_NAME, SessionCookies};
pub use transport::ReqwestTransport;
