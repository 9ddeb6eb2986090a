//! Error types for the `portal` binary.

use std::fmt::Write as _;

use thiserror::Error;

use crate::domain::{RequestError, SessionError, UserRole};

/// Errors surfaced by the command flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    /// Arguments parsed but their values are unusable.
    #[error("{message}")]
    InvalidInput {
        /// What was wrong.
        message: String,
    },
    /// The payload file or inline JSON could not be read.
    #[error("invalid payload: {message}")]
    InvalidPayload {
        /// Reader or parser message.
        message: String,
    },
    /// Configuration could not be loaded or is unusable.
    #[error("configuration error: {message}")]
    Config {
        /// Loader message.
        message: String,
    },
    /// Local state or output files could not be accessed.
    #[error("{context}: {message}")]
    Io {
        /// Operation that failed.
        context: String,
        /// Underlying I/O message.
        message: String,
    },
    /// The cached user does not have the required role.
    #[error("access denied: {required} session required")]
    AccessDenied {
        /// Role the command needed.
        required: UserRole,
    },
    /// A deletion was requested without confirmation.
    #[error("refusing to delete the account without --yes")]
    Unconfirmed,
    /// A backend or session operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl CliError {
    /// Build [`CliError::InvalidInput`].
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Build [`CliError::Io`] for a failed operation.
    #[must_use]
    pub fn io(context: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// Text shown on stderr: the message, then one line per field error.
    #[must_use]
    pub fn render(&self) -> String {
        let mut text = self.to_string();
        let fields = match self {
            Self::Session(SessionError::Request(RequestError::Api(api))) => api.field_errors(),
            _ => None,
        };
        for (field, message) in fields.into_iter().flatten() {
            if writeln!(text).is_err() || write!(text, "  {field}: {message}").is_err() {
                break;
            }
        }
        text
    }
}

impl From<RequestError> for CliError {
    fn from(err: RequestError) -> Self {
        Self::Session(SessionError::Request(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiError, FieldErrors};

    #[test]
    fn render_lists_field_errors() {
        let mut fields = FieldErrors::new();
        fields.insert("email".to_owned(), "already taken".to_owned());
        fields.insert("phone".to_owned(), "invalid".to_owned());
        let err = CliError::from(RequestError::from(ApiError::new(
            "Validation failed. Please check the fields.",
            400,
            Some(fields),
        )));
        assert_eq!(
            err.render(),
            "Validation failed. Please check the fields.\n  email: already taken\n  phone: invalid"
        );
    }

    #[test]
    fn render_is_message_for_other_errors() {
        let err = CliError::AccessDenied {
            required: UserRole::Admin,
        };
        assert_eq!(err.render(), "access denied: ADMIN session required");
    }
}
