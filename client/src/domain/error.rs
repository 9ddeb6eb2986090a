//! Normalized backend errors and the gateway's error taxonomy.
//!
//! The backend reports failures in several shapes. The gateway folds all of
//! them into [`ApiError`] so that callers handle exactly one error type for
//! "the backend said no", separate from "the backend never answered".

use std::collections::BTreeMap;

use thiserror::Error;

use super::ports::TransportError;

/// Field name to error message mapping carried by validation failures.
pub type FieldErrors = BTreeMap<String, String>;

/// Top-level message the backend uses to mark validation failures.
pub const VALIDATION_FAILURE_MARKER: &str = "Validation failure";

/// Message surfaced to callers in place of the marker.
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed. Please check the fields.";

/// Normalized error raised for every non-2xx backend response.
///
/// ## Invariants
/// - `message` is never empty.
/// - `field_errors` is `Some` only for validation failures.
///
/// # Examples
/// ```
/// use portal_client::domain::ApiError;
///
/// let err = ApiError::new("", 502, None);
/// assert_eq!(err.message(), "HTTP 502");
/// assert!(!err.is_validation());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    status: u16,
    field_errors: Option<FieldErrors>,
}

impl ApiError {
    /// Construct an error, substituting `HTTP <status>` for a blank message.
    #[must_use]
    pub fn new(message: impl Into<String>, status: u16, field_errors: Option<FieldErrors>) -> Self {
        let raw = message.into();
        let resolved = if raw.trim().is_empty() {
            format!("HTTP {status}")
        } else {
            raw
        };
        Self {
            message: resolved,
            status,
            field_errors,
        }
    }

    /// Human-readable message suitable for display.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// HTTP status returned by the backend.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Per-field messages for validation failures.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        self.field_errors.as_ref()
    }

    /// Message for a single field, when the backend reported one.
    #[must_use]
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors
            .as_ref()
            .and_then(|errors| errors.get(field))
            .map(String::as_str)
    }

    /// Whether this is a validation failure with per-field messages.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        self.field_errors.is_some()
    }

    /// Whether the backend rejected the session credential.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Everything that can go wrong while performing one gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The backend answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The backend could not be reached.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The request body could not be serialized.
    #[error("request body could not be serialized: {message}")]
    Encode {
        /// Serializer error description.
        message: String,
    },
    /// A success response did not have the expected shape.
    #[error("unexpected response body: {message}")]
    Decode {
        /// Decoder error description.
        message: String,
    },
}

impl RequestError {
    /// Construct [`RequestError::Encode`].
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Construct [`RequestError::Decode`].
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// The normalized backend error, when there is one.
    #[must_use]
    pub const fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }

    /// Whether the backend answered 401.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.api().is_some_and(ApiError::is_unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 500, "HTTP 500")]
    #[case("   ", 404, "HTTP 404")]
    #[case("Login Failed", 401, "Login Failed")]
    fn message_is_never_empty(#[case] raw: &str, #[case] status: u16, #[case] expected: &str) {
        assert_eq!(ApiError::new(raw, status, None).message(), expected);
    }

    #[test]
    fn field_lookup_reads_validation_map() {
        let mut fields = FieldErrors::new();
        fields.insert("email".to_owned(), "already taken".to_owned());
        let err = ApiError::new(VALIDATION_FAILED_MESSAGE, 400, Some(fields));
        assert!(err.is_validation());
        assert_eq!(err.field_error("email"), Some("already taken"));
        assert!(err.field_error("phone").is_none());
    }

    #[test]
    fn unauthorized_is_detected_through_request_error() {
        let err = RequestError::from(ApiError::new("Session expired", 401, None));
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Session expired");

        let transport = RequestError::from(TransportError::connect("refused"));
        assert!(!transport.is_unauthorized());
        assert!(transport.api().is_none());
    }
}
