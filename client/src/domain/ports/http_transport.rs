//! Port for sending HTTP requests to the portal backend.
//!
//! The [`HttpTransport`] trait is the only way the domain reaches the network.
//! Adapters own connection handling and the session credential: every request
//! they send must carry the credential the backend issued at login, and the
//! domain never sees its value.

use std::fmt;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by transport adapters before any HTTP response exists.
    ///
    /// These are distinct from normalized backend errors: a
    /// transport failure means the backend never answered.
    pub enum TransportError {
        /// The request URL could not be resolved to an absolute URL.
        InvalidUrl {
            /// Description of the URL problem.
            message: String,
        } => "invalid request URL: {message}",
        /// The backend could not be reached.
        Connect {
            /// Description of the connection failure.
            message: String,
        } => "backend unreachable: {message}",
        /// The transport gave up waiting for the backend.
        Timeout {
            /// Description of the timeout.
            message: String,
        } => "backend request timed out: {message}",
        /// Any other failure while sending or reading the exchange.
        Other {
            /// Description of the failure.
            message: String,
        } => "transport failure: {message}",
    }
}

/// HTTP verbs used by portal endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    /// `GET`, the default when a caller does not choose a method.
    #[default]
    Get,
    /// `POST`.
    Post,
    /// `PATCH`.
    Patch,
    /// `DELETE`.
    Delete,
}

impl HttpMethod {
    /// Upper-case method token as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request handed to a transport adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Configured base URL joined with the endpoint path. Relative when the
    /// base URL is empty; adapters resolve it against their origin.
    pub url: String,
    /// Header pairs in send order.
    pub headers: Vec<(String, String)>,
    /// Pre-serialized request body.
    pub body: Option<String>,
}

/// Raw response returned by a transport adapter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers; names compare case-insensitively.
    pub headers: Vec<(String, String)>,
    /// Undecoded response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Create an empty response with the given status.
    ///
    /// # Examples
    /// ```
    /// use portal_client::domain::ports::TransportResponse;
    ///
    /// let response = TransportResponse::new(204);
    /// assert!(response.is_success());
    /// assert!(response.body.is_empty());
    /// ```
    #[must_use]
    pub const fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Append a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// JSON response with the matching content type.
    #[must_use]
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    /// First header value whose name matches `name`, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Declared content type, or an empty string when absent.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or_default()
    }

    /// Whether the status lies in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status <= 299
    }
}

/// Port for exchanging HTTP messages with the backend.
///
/// Implementations must transmit the session credential on every request
/// (the equivalent of `credentials: include` in a browser) and store any
/// credential the backend sets in a response.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and return the raw response.
    ///
    /// Non-2xx statuses are not errors at this layer; only failures that
    /// leave no response at all are reported as [`TransportError`].
    async fn send(&self, request: TransportRequest)
    -> Result<TransportResponse, TransportError>;

    /// Forget any session credential held by the transport.
    fn clear_credentials(&self);
}
