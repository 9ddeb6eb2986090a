//! Authentication payloads: password login and email one-time passcodes.
//!
//! Constructors validate raw strings so that CLI or UI code never builds a
//! request the backend would reject for shape alone.

use std::fmt;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use zeroize::Zeroizing;

/// Domain error returned when login inputs are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Identifier was missing or blank once trimmed.
    EmptyIdentifier,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyIdentifier => write!(f, "email or phone must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// How the user identified themselves at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    /// Email address.
    Email(String),
    /// Phone number.
    Phone(String),
}

impl LoginIdentifier {
    /// Classify a raw identifier: anything containing `@` is an email.
    ///
    /// # Errors
    ///
    /// Returns [`LoginValidationError::EmptyIdentifier`] for blank input.
    pub fn parse(raw: &str) -> Result<Self, LoginValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LoginValidationError::EmptyIdentifier);
        }
        if trimmed.contains('@') {
            Ok(Self::Email(trimmed.to_owned()))
        } else {
            Ok(Self::Phone(trimmed.to_owned()))
        }
    }

    const fn field_name(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Phone(_) => "phone",
        }
    }

    /// Identifier text without its kind.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Email(value) | Self::Phone(value) => value.as_str(),
        }
    }
}

/// Validated password login request.
///
/// Serializes to `{"email": ..., "password": ...}` or
/// `{"phone": ..., "password": ...}` depending on the identifier.
///
/// ## Invariants
/// - The identifier is trimmed and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use portal_client::domain::{LoginCredentials, LoginIdentifier};
///
/// let creds = LoginCredentials::from_identifier("9876543210", "pw").expect("valid");
/// assert_eq!(creds.identifier(), &LoginIdentifier::Phone("9876543210".into()));
/// let body = serde_json::to_value(&creds).expect("serializable");
/// assert_eq!(body, serde_json::json!({"phone": "9876543210", "password": "pw"}));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    identifier: LoginIdentifier,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Build credentials from a free-form identifier and a password.
    ///
    /// # Errors
    ///
    /// Returns [`LoginValidationError`] when either input is blank.
    pub fn from_identifier(identifier: &str, password: &str) -> Result<Self, LoginValidationError> {
        let parsed = LoginIdentifier::parse(identifier)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            identifier: parsed,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Classified identifier.
    #[must_use]
    pub const fn identifier(&self) -> &LoginIdentifier {
        &self.identifier
    }
}

impl Serialize for LoginCredentials {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.identifier.field_name(), self.identifier.value())?;
        map.serialize_entry("password", self.password.as_str())?;
        map.end()
    }
}

/// Number of digits in a login passcode.
pub const OTP_LENGTH: usize = 6;

/// Error returned when a passcode is not six ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("passcode must be exactly {OTP_LENGTH} digits")]
pub struct OtpValidationError;

/// Six-digit one-time passcode sent to the user's email.
///
/// # Examples
/// ```
/// use portal_client::domain::OtpCode;
///
/// assert!(OtpCode::parse("12345").is_err());
/// let pasted = OtpCode::from_pasted("Your code: 123-456").expect("six digits");
/// assert_eq!(pasted.as_str(), "123456");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Accept exactly six ASCII digits, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`OtpValidationError`] for anything else.
    pub fn parse(raw: &str) -> Result<Self, OtpValidationError> {
        let trimmed = raw.trim();
        if trimmed.len() == OTP_LENGTH && trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(OtpValidationError)
        }
    }

    /// Sanitize pasted text: drop non-digits and keep the first six.
    ///
    /// # Errors
    ///
    /// Returns [`OtpValidationError`] when fewer than six digits remain.
    pub fn from_pasted(raw: &str) -> Result<Self, OtpValidationError> {
        let digits: String = raw
            .chars()
            .filter(char::is_ascii_digit)
            .take(OTP_LENGTH)
            .collect();
        Self::parse(&digits)
    }

    /// Digits as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Body of the passcode request endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpRequest {
    /// Address the passcode is sent to.
    pub email: String,
}

/// Body of the passcode validation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpValidation {
    /// Address the passcode was sent to.
    pub email: String,
    /// Passcode typed by the user.
    pub otp: OtpCode,
}
