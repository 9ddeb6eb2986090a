//! Request gateway: the single choke point for backend calls.
//!
//! Every call goes through [`RequestGateway::request`] (or
//! [`RequestGateway::download`] for binary bodies), which attaches default
//! headers, hands the exchange to the transport, parses the response by
//! content type and converts non-2xx statuses into [`ApiError`].
//!
//! The gateway never retries and never swallows an error. Unauthorized
//! responses are returned like any other failure; reacting to them is the
//! caller's job.

mod normalize;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{Instrument, debug, debug_span, warn};
use uuid::Uuid;

use self::normalize::{ParsedBody, filename_from_disposition, normalize_failure, parse_body};
use super::error::{ApiError, RequestError};
use super::ports::{HttpMethod, HttpTransport, TransportRequest, TransportResponse};

/// Content type sent with every request unless the caller overrides it.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Per-call options for [`RequestGateway::request`].
///
/// # Examples
/// ```
/// use portal_client::domain::ports::HttpMethod;
/// use portal_client::domain::RequestOptions;
///
/// let options = RequestOptions::new(HttpMethod::Post)
///     .with_body(r#"{"email":"a@x.com"}"#)
///     .with_header("Accept", "application/json");
/// assert_eq!(options.method(), HttpMethod::Post);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    method: HttpMethod,
    body: Option<String>,
    headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// Options for the given method with no body and no extra headers.
    #[must_use]
    pub const fn new(method: HttpMethod) -> Self {
        Self {
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    /// Attach a body that the caller has already serialized.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `payload` as JSON and attach it as the body.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Encode`] when `payload` cannot be serialized.
    pub fn with_json<B>(self, payload: &B) -> Result<Self, RequestError>
    where
        B: Serialize + ?Sized,
    {
        let body =
            serde_json::to_string(payload).map_err(|err| RequestError::encode(err.to_string()))?;
        Ok(self.with_body(body))
    }

    /// Add or override a header. Names compare case-insensitively.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Method the call will use.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    fn merged_headers(&self) -> Vec<(String, String)> {
        let mut merged = vec![("Content-Type".to_owned(), DEFAULT_CONTENT_TYPE.to_owned())];
        for (name, value) in &self.headers {
            match merged
                .iter_mut()
                .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            {
                Some(slot) => slot.1.clone_from(value),
                None => merged.push((name.clone(), value.clone())),
            }
        }
        merged
    }
}

/// Parsed success body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body of a response declaring a JSON content type.
    Json(Value),
    /// Body of any other response, as text.
    Text(String),
}

impl Payload {
    /// Borrow the JSON value, if this is a JSON payload.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Convert into a JSON value; text becomes a JSON string.
    #[must_use]
    pub fn into_json(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }

    /// Decode the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Decode`] when the payload does not match `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, RequestError> {
        serde_json::from_value(self.into_json()).map_err(|err| RequestError::decode(err.to_string()))
    }
}

/// Binary success body with the metadata needed to save it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Raw body bytes.
    pub bytes: Vec<u8>,
    /// Declared content type, when present.
    pub content_type: Option<String>,
    /// File name suggested by `Content-Disposition`, when present.
    pub filename: Option<String>,
}

/// Gateway over an [`HttpTransport`] with a configurable base URL.
pub struct RequestGateway<T> {
    transport: T,
    base_url: String,
}

impl<T> RequestGateway<T> {
    /// Create a gateway. An empty `base_url` means endpoints are sent as-is,
    /// relative to whatever origin the transport serves.
    #[must_use]
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        let raw = base_url.into();
        Self {
            transport,
            base_url: raw.trim_end_matches('/').to_owned(),
        }
    }

    /// Base URL prefixed to every endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: HttpTransport> RequestGateway<T> {
    /// Perform one backend call and return its parsed body.
    ///
    /// Returns `Ok(None)` for `204 No Content` and for success bodies that
    /// declare JSON but fail to parse.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Api`] for any non-2xx status, normalized.
    /// - [`RequestError::Transport`] when no response was received.
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<Payload>, RequestError> {
        let span = request_span(options.method, endpoint);
        async move {
            let response = self.dispatch(endpoint, &options).await?;
            if response.status == 204 {
                debug!(status = 204, "request succeeded without content");
                return Ok(None);
            }
            let parsed = parse_body(response.content_type(), &response.body);
            debug!(status = response.status, "request succeeded");
            Ok(match parsed {
                ParsedBody::Json(value) => Some(Payload::Json(value)),
                ParsedBody::Text(text) => Some(Payload::Text(text)),
                ParsedBody::Empty => None,
            })
        }
        .instrument(span)
        .await
    }

    /// Perform a `GET` whose success body is binary.
    ///
    /// # Errors
    ///
    /// Same as [`RequestGateway::request`].
    pub async fn download(&self, endpoint: &str) -> Result<Download, RequestError> {
        let span = request_span(HttpMethod::Get, endpoint);
        async move {
            let options = RequestOptions::new(HttpMethod::Get);
            let response = self.dispatch(endpoint, &options).await?;
            debug!(
                status = response.status,
                bytes = response.body.len(),
                "download succeeded"
            );
            let filename = response
                .header("content-disposition")
                .and_then(filename_from_disposition);
            let content_type = response.header("content-type").map(str::to_owned);
            Ok(Download {
                bytes: response.body,
                content_type,
                filename,
            })
        }
        .instrument(span)
        .await
    }

    async fn dispatch(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<TransportResponse, RequestError> {
        let request = TransportRequest {
            method: options.method,
            url: format!("{}{endpoint}", self.base_url),
            headers: options.merged_headers(),
            body: options.body.clone(),
        };
        debug!("dispatching request");
        let response = self.transport.send(request).await.map_err(|err| {
            warn!(error = %err, "transport failure");
            RequestError::from(err)
        })?;

        if response.is_success() {
            return Ok(response);
        }
        let status = response.status;
        let error = normalize_failure(status, parse_body(response.content_type(), &response.body));
        log_failure(&error);
        Err(error.into())
    }
}

fn request_span(method: HttpMethod, endpoint: &str) -> tracing::Span {
    debug_span!(
        "portal_request",
        request_id = %Uuid::new_v4(),
        method = %method,
        endpoint = %endpoint,
    )
}

fn log_failure(error: &ApiError) {
    warn!(
        status = error.status(),
        message = error.message(),
        validation = error.is_validation(),
        "request failed"
    );
}

#[cfg(test)]
mod tests {
    //! Gateway behaviour against a mocked transport.
    use super::*;
    use crate::domain::ports::{MockHttpTransport, TransportError};
    use rstest::rstest;
    use serde_json::json;

    fn gateway_returning(response: TransportResponse) -> RequestGateway<MockHttpTransport> {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(move |_| Ok(response.clone()));
        RequestGateway::new(transport, "")
    }

    #[tokio::test]
    async fn no_content_yields_none_regardless_of_body() {
        let gateway = gateway_returning(
            TransportResponse::new(204)
                .with_header("content-type", "application/json")
                .with_body(r#"{"ignored":true}"#),
        );
        let result = gateway
            .request("/auth/logout-user", RequestOptions::new(HttpMethod::Post))
            .await
            .expect("success");
        assert!(result.is_none());
    }

    #[rstest]
    #[case(json!({"role": "STUDENT", "id": 7}))]
    #[case(json!([{"rollNo": "R1"}, {"rollNo": "R2"}]))]
    #[case(json!("plain string"))]
    #[case(json!(12.5))]
    #[case(json!({"nested": {"deep": [null, true, {"k": "v"}]}}))]
    #[tokio::test]
    async fn json_success_bodies_are_returned_unchanged(#[case] body: Value) {
        let gateway = gateway_returning(TransportResponse::json(200, &body));
        let result = gateway
            .request("/student/profile", RequestOptions::default())
            .await
            .expect("success");
        assert_eq!(result, Some(Payload::Json(body)));
    }

    #[tokio::test]
    async fn text_success_bodies_are_returned_as_text() {
        let gateway = gateway_returning(
            TransportResponse::new(200)
                .with_header("content-type", "text/plain")
                .with_body("ok"),
        );
        let result = gateway
            .request("/auth/login/generate-otp", RequestOptions::new(HttpMethod::Post))
            .await
            .expect("success");
        assert_eq!(result, Some(Payload::Text("ok".to_owned())));
    }

    #[tokio::test]
    async fn sends_default_content_type_and_joined_url() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.method == HttpMethod::Patch
                    && request.url == "https://portal.example/api/student/profile/update"
                    && request.body.as_deref() == Some(r#"{"name":"Asha"}"#)
                    && request.headers
                        == vec![("Content-Type".to_owned(), "application/json".to_owned())]
            })
            .times(1)
            .returning(|_| Ok(TransportResponse::new(204)));
        let gateway = RequestGateway::new(transport, "https://portal.example/api/");

        let options = RequestOptions::new(HttpMethod::Patch)
            .with_json(&json!({"name": "Asha"}))
            .expect("encode");
        gateway
            .request("/student/profile/update", options)
            .await
            .expect("success");
    }

    #[rstest]
    #[case("", "")]
    #[case("/api", "/api")]
    #[case("https://portal.example/api//", "https://portal.example/api")]
    fn base_url_drops_trailing_slashes(#[case] raw: &str, #[case] expected: &str) {
        let gateway = RequestGateway::new(MockHttpTransport::new(), raw);
        assert_eq!(gateway.base_url(), expected);
    }

    #[tokio::test]
    async fn caller_headers_override_content_type() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.headers
                    == vec![
                        ("Content-Type".to_owned(), "text/csv".to_owned()),
                        ("X-Trace".to_owned(), "abc".to_owned()),
                    ]
            })
            .times(1)
            .returning(|_| Ok(TransportResponse::new(204)));
        let gateway = RequestGateway::new(transport, "");

        let options = RequestOptions::new(HttpMethod::Post)
            .with_header("content-type", "text/csv")
            .with_header("X-Trace", "abc");
        gateway.request("/upload", options).await.expect("success");
    }

    #[tokio::test]
    async fn validation_failures_carry_field_errors() {
        let gateway = gateway_returning(TransportResponse::json(
            400,
            &json!({"message": "Validation failure", "data": {"email": "already taken"}}),
        ));
        let err = gateway
            .request("/student/profile/update", RequestOptions::new(HttpMethod::Patch))
            .await
            .expect_err("400 must fail");
        let api = err.api().expect("normalized error");
        assert_eq!(api.status(), 400);
        assert_eq!(api.field_error("email"), Some("already taken"));
        assert_eq!(api.message(), "Validation failed. Please check the fields.");
    }

    #[tokio::test]
    async fn unparseable_failure_body_reports_status() {
        let gateway = gateway_returning(
            TransportResponse::new(503)
                .with_header("content-type", "application/json")
                .with_body("<html>unavailable</html>"),
        );
        let err = gateway
            .request("/admin/profile", RequestOptions::default())
            .await
            .expect_err("503 must fail");
        assert_eq!(err.api().map(ApiError::message), Some("HTTP 503"));
    }

    #[tokio::test]
    async fn transport_failures_are_not_normalized() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Err(TransportError::connect("connection refused")));
        let gateway = RequestGateway::new(transport, "");

        let err = gateway
            .request("/auth/login-user", RequestOptions::new(HttpMethod::Post))
            .await
            .expect_err("transport failure");
        assert!(matches!(err, RequestError::Transport(TransportError::Connect { .. })));
    }

    #[tokio::test]
    async fn downloads_keep_bytes_and_filename() {
        let gateway = gateway_returning(
            TransportResponse::new(200)
                .with_header(
                    "Content-Type",
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                )
                .with_header("Content-Disposition", "attachment; filename=Students_1.xlsx")
                .with_body(vec![0x50, 0x4b, 0x03, 0x04]),
        );
        let download = gateway
            .download("/admin/students/filter/export/excel?")
            .await
            .expect("download");
        assert_eq!(download.bytes, vec![0x50, 0x4b, 0x03, 0x04]);
        assert_eq!(download.filename.as_deref(), Some("Students_1.xlsx"));
    }

    #[tokio::test]
    async fn download_failures_are_normalized() {
        let gateway = gateway_returning(TransportResponse::json(
            403,
            &json!({"message": "Forbidden", "data": {"details": "Admins only"}}),
        ));
        let err = gateway
            .download("/admin/students/filter/export/excel?")
            .await
            .expect_err("403 must fail");
        assert_eq!(err.to_string(), "Admins only");
    }

    #[test]
    fn payload_decode_reports_shape_mismatch() {
        let err = Payload::Text("nope".to_owned())
            .decode::<Vec<u8>>()
            .expect_err("text is not a list");
        assert!(matches!(err, RequestError::Decode { .. }));
    }
}
