//! Reqwest-backed [`HttpTransport`].
//!
//! The adapter resolves gateway URLs against a configured origin, sends the
//! session cookie on every request and records any cookie the backend sets.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};

use super::cookies::SessionCookies;
use crate::domain::ports::{
    HttpMethod, HttpTransport, TransportError, TransportRequest, TransportResponse,
};

/// Transport that talks to the backend over HTTP.
pub struct ReqwestTransport {
    client: Client,
    origin: Url,
    cookies: Arc<SessionCookies>,
}

impl ReqwestTransport {
    /// Build a transport.
    ///
    /// Relative request URLs are resolved against `origin`. Without a
    /// `timeout` requests wait as long as the backend takes.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Other`] when the HTTP client cannot be
    /// constructed.
    pub fn new(
        origin: Url,
        cookies: Arc<SessionCookies>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = Client::builder().cookie_provider(Arc::clone(&cookies));
        if let Some(limit) = timeout {
            builder = builder.timeout(limit);
        }
        let client = builder
            .build()
            .map_err(|err| TransportError::other(err.to_string()))?;
        Ok(Self {
            client,
            origin,
            cookies,
        })
    }

    fn resolve(&self, raw: &str) -> Result<Url, TransportError> {
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .origin
                .join(raw)
                .map_err(|err| TransportError::invalid_url(format!("{raw}: {err}"))),
            Err(err) => Err(TransportError::invalid_url(format!("{raw}: {err}"))),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let url = self.resolve(&request.url)?;
        let mut builder = self.client.request(to_reqwest_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|text| (name.as_str().to_owned(), text.to_owned()))
            })
            .collect();
        let body = response.bytes().await.map_err(map_transport_error)?;

        Ok(TransportResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }

    fn clear_credentials(&self) {
        self.cookies.clear();
    }
}

const fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::connect(error.to_string())
    } else if error.is_builder() {
        TransportError::invalid_url(error.to_string())
    } else {
        TransportError::other(error.to_string())
    }
}
