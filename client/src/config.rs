//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `PORTAL_*` environment variables or a configuration
//! file. The origin always carries a default so an empty environment still
//! merges into a complete settings value.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

const DEFAULT_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_STATE_DIR: &str = ".portal";

/// Settings shared by every `portal` invocation.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// Prefix joined to every endpoint path. Empty means same-origin.
    pub api_base: Option<String>,
    /// Origin against which a relative base is resolved.
    #[ortho_config(default = DEFAULT_ORIGIN.to_owned())]
    pub origin: String,
    /// Directory holding the snapshot and cookie files.
    pub state_dir: Option<PathBuf>,
    /// Per-request timeout; unset leaves the transport default.
    pub request_timeout_secs: Option<u64>,
}

/// Raised when a configured value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid origin '{value}': {message}")]
pub struct InvalidOriginError {
    /// Configured text.
    pub value: String,
    /// Parser message.
    pub message: String,
}

impl PortalSettings {
    /// Configured base URL, or the empty string.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or_default()
    }

    /// Origin used to resolve relative request URLs.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidOriginError`] when the configured origin is not an
    /// absolute URL.
    pub fn origin(&self) -> Result<Url, InvalidOriginError> {
        Url::parse(&self.origin).map_err(|err| InvalidOriginError {
            value: self.origin.clone(),
            message: err.to_string(),
        })
    }

    /// State directory, falling back to `.portal`.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
    }

    /// Request timeout, when configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
