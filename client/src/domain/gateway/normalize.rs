//! Response body parsing and failure normalization.
//!
//! Pure functions only; the gateway feeds them what the transport returned.

use serde_json::{Map, Value};

use crate::domain::error::{
    ApiError, FieldErrors, VALIDATION_FAILED_MESSAGE, VALIDATION_FAILURE_MARKER,
};

const JSON_MEDIA_TYPE: &str = "application/json";

/// Body as read according to the declared content type.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParsedBody {
    Json(Value),
    Text(String),
    Empty,
}

/// Parse `body` as JSON when `content_type` declares it, as text otherwise.
///
/// A JSON parse failure produces [`ParsedBody::Empty`] rather than an error.
pub(crate) fn parse_body(content_type: &str, body: &[u8]) -> ParsedBody {
    if declares_json(content_type) {
        serde_json::from_slice(body).map_or(ParsedBody::Empty, ParsedBody::Json)
    } else {
        ParsedBody::Text(String::from_utf8_lossy(body).into_owned())
    }
}

fn declares_json(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains(JSON_MEDIA_TYPE)
}

/// Fold a non-2xx response into the single error shape callers handle.
pub(crate) fn normalize_failure(status: u16, body: ParsedBody) -> ApiError {
    match body {
        ParsedBody::Json(value @ (Value::Object(_) | Value::Array(_))) => {
            normalize_structured(status, &value)
        }
        ParsedBody::Json(Value::String(text)) | ParsedBody::Text(text) => {
            normalize_plain(status, &text)
        }
        ParsedBody::Json(_) | ParsedBody::Empty => normalize_plain(status, ""),
    }
}

fn normalize_structured(status: u16, body: &Value) -> ApiError {
    let data = body.get("data");

    if let Some(fields) = validation_fields(body, data) {
        return ApiError::new(VALIDATION_FAILED_MESSAGE, status, Some(fields));
    }

    let message = data
        .and_then(|inner| inner.get("details"))
        .and_then(message_text)
        .or_else(|| body.get("message").and_then(message_text))
        .or_else(|| body.get("error").and_then(message_text))
        .or_else(|| {
            data.and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| format!("HTTP {status} Unknown Error"));
    ApiError::new(message, status, None)
}

fn validation_fields(body: &Value, data: Option<&Value>) -> Option<FieldErrors> {
    let marker = body.get("message").and_then(Value::as_str)?;
    if marker != VALIDATION_FAILURE_MARKER {
        return None;
    }
    data.and_then(Value::as_object).map(field_errors_from)
}

fn field_errors_from(fields: &Map<String, Value>) -> FieldErrors {
    fields
        .iter()
        .map(|(name, value)| {
            let text = value
                .as_str()
                .map_or_else(|| value.to_string(), str::to_owned);
            (name.clone(), text)
        })
        .collect()
}

/// Text for a candidate message field; absent, null, false and empty
/// values do not count.
fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn normalize_plain(status: u16, text: &str) -> ApiError {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        ApiError::new(format!("HTTP {status}"), status, None)
    } else {
        ApiError::new(trimmed, status, None)
    }
}

/// Extract the `filename` parameter from a `Content-Disposition` header.
pub(crate) fn filename_from_disposition(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("filename")
                .then(|| value.trim().trim_matches('"').to_owned())
        })
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    //! Coverage for every branch of the failure normalization rules.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn json_body(value: &Value) -> ParsedBody {
        ParsedBody::Json(value.clone())
    }

    #[rstest]
    #[case("application/json", br#"{"a":1}"#.as_slice(), ParsedBody::Json(json!({"a": 1})))]
    #[case(
        "application/json;charset=UTF-8",
        br#"[1,2]"#.as_slice(),
        ParsedBody::Json(json!([1, 2]))
    )]
    #[case("application/json", b"not json".as_slice(), ParsedBody::Empty)]
    #[case("application/json", b"".as_slice(), ParsedBody::Empty)]
    #[case("text/plain", b"Forbidden".as_slice(), ParsedBody::Text("Forbidden".to_owned()))]
    #[case("", b"".as_slice(), ParsedBody::Text(String::new()))]
    fn parses_by_content_type(
        #[case] content_type: &str,
        #[case] body: &[u8],
        #[case] expected: ParsedBody,
    ) {
        assert_eq!(parse_body(content_type, body), expected);
    }

    #[test]
    fn validation_failure_exposes_field_errors() {
        let body = json!({
            "message": "Validation failure",
            "data": {"a": "x", "b": "y"}
        });
        let err = normalize_failure(400, json_body(&body));

        assert_eq!(err.message(), VALIDATION_FAILED_MESSAGE);
        assert_eq!(err.status(), 400);
        let fields = err.field_errors().expect("validation fields");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("a").map(String::as_str), Some("x"));
        assert_eq!(fields.get("b").map(String::as_str), Some("y"));
    }

    #[test]
    fn validation_marker_without_object_data_is_plain_message() {
        let body = json!({"message": "Validation failure", "data": "email invalid"});
        let err = normalize_failure(400, json_body(&body));
        assert_eq!(err.message(), "Validation failure");
        assert!(err.field_errors().is_none());
    }

    #[rstest]
    #[case(json!({"data": {"details": "D"}}))]
    #[case(json!({"message": "Request Failed", "data": {"details": "D", "error": "NOT FOUND."}}))]
    #[case(json!({"message": "Login Failed", "error": "E", "data": {"details": "D", "status": 401}}))]
    fn nested_details_take_priority(#[case] body: Value) {
        let err = normalize_failure(404, json_body(&body));
        assert_eq!(err.message(), "D");
        assert!(err.field_errors().is_none());
    }

    #[rstest]
    #[case(json!({"message": "M", "error": "E", "data": "S"}), "M")]
    #[case(json!({"message": "", "error": "E", "data": "S"}), "E")]
    #[case(json!({"error": "", "data": "S"}), "S")]
    #[case(json!({"data": {"details": ""}, "message": "M"}), "M")]
    #[case(json!({"data": ""}), "HTTP 409 Unknown Error")]
    #[case(json!({}), "HTTP 409 Unknown Error")]
    #[case(json!([1, 2, 3]), "HTTP 409 Unknown Error")]
    fn falls_through_message_priorities(#[case] body: Value, #[case] expected: &str) {
        let err = normalize_failure(409, json_body(&body));
        assert_eq!(err.message(), expected);
        assert_eq!(err.status(), 409);
    }

    #[rstest]
    #[case(ParsedBody::Empty, "HTTP 502")]
    #[case(ParsedBody::Text(String::new()), "HTTP 502")]
    #[case(ParsedBody::Text("  \n ".to_owned()), "HTTP 502")]
    #[case(ParsedBody::Text("  Bad Gateway \n".to_owned()), "Bad Gateway")]
    #[case(ParsedBody::Json(json!("quoted text")), "quoted text")]
    #[case(ParsedBody::Json(json!(42)), "HTTP 502")]
    #[case(ParsedBody::Json(Value::Null), "HTTP 502")]
    fn unstructured_bodies_use_text_or_status(#[case] body: ParsedBody, #[case] expected: &str) {
        let err = normalize_failure(502, body);
        assert_eq!(err.message(), expected);
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn unparseable_json_body_reports_status() {
        let parsed = parse_body("application/json", b"<html>oops</html>");
        let err = normalize_failure(500, parsed);
        assert_eq!(err.message(), "HTTP 500");
    }

    #[rstest]
    #[case("attachment; filename=Students_2024-01-02.xlsx", Some("Students_2024-01-02.xlsx"))]
    #[case("attachment; filename=\"report.xlsx\"", Some("report.xlsx"))]
    #[case("attachment; FILENAME = roster.xlsx", Some("roster.xlsx"))]
    #[case("attachment", None)]
    #[case("attachment; filename=\"\"", None)]
    fn reads_disposition_filename(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(filename_from_disposition(header).as_deref(), expected);
    }
}
