//! Pipeline configuration surface.
//!
//! [`AuthConfig`] carries the orchestrator-level policy flags plus a flat,
//! free-form settings map that is forwarded verbatim to every strategy
//! factory. Plugins pick out the keys they care about and ignore the rest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration consumed by the pipeline builder and forwarded to plugins.
///
/// The three policy flags belong to the orchestrator; everything else lives
/// in the flattened `settings` map under plugin-defined keys (header names,
/// file paths, callback names).
///
/// # Example
///
/// ```
/// use gatehouse_middleware::AuthConfig;
///
/// let config: AuthConfig = serde_json::from_str(
///     r#"{"delay_unauthorized": true, "htpasswd_path": "/etc/creds"}"#,
/// ).unwrap();
///
/// assert!(config.delay_unauthorized);
/// assert_eq!(config.str_setting("htpasswd_path"), Some("/etc/creds"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Suppress the 401-equivalent signal and let downstream code consult
    /// the outcome flags instead.
    #[serde(default)]
    pub delay_unauthorized: bool,

    /// Suppress the 403-equivalent signal the same way.
    #[serde(default)]
    pub delay_forbidden: bool,

    /// Decision to record when no authorizer is configured.
    #[serde(default)]
    pub default_authorize: bool,

    /// Free-form plugin settings, forwarded verbatim to strategy factories.
    #[serde(flatten)]
    pub settings: BTreeMap<String, serde_json::Value>,
}

impl AuthConfig {
    /// Creates a configuration with all policy flags unset and no settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this configuration with `delay_unauthorized` set.
    #[must_use]
    pub fn delay_unauthorized(mut self, delay: bool) -> Self {
        self.delay_unauthorized = delay;
        self
    }

    /// Returns this configuration with `delay_forbidden` set.
    #[must_use]
    pub fn delay_forbidden(mut self, delay: bool) -> Self {
        self.delay_forbidden = delay;
        self
    }

    /// Returns this configuration with `default_authorize` set.
    #[must_use]
    pub fn default_authorize(mut self, authorize: bool) -> Self {
        self.default_authorize = authorize;
        self
    }

    /// Returns this configuration with a plugin setting added.
    #[must_use]
    pub fn setting(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Looks up a plugin setting by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.settings.get(key)
    }

    /// Looks up a string-valued plugin setting by key.
    ///
    /// Returns `None` both when the key is absent and when the value is not
    /// a string.
    #[must_use]
    pub fn str_setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(serde_json::Value::as_str)
    }

    /// Looks up a boolean plugin setting, defaulting to false when absent.
    #[must_use]
    pub fn bool_setting(&self, key: &str) -> bool {
        self.settings
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// Looks up a required string-valued plugin setting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSetting`] when the key is absent and
    /// [`ConfigError::InvalidSetting`] when the value is not a string.
    pub fn require_str(&self, key: &str) -> Result<&str, ConfigError> {
        match self.settings.get(key) {
            None => Err(ConfigError::missing_setting(key)),
            Some(value) => value
                .as_str()
                .ok_or_else(|| ConfigError::invalid_setting(key, "expected a string value")),
        }
    }
}

/// Errors raised while constructing a pipeline or a strategy.
///
/// All of these are fatal to construction: a pipeline that would run with a
/// broken plugin is never built, so misconfiguration surfaces at startup
/// rather than on the first request.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required plugin setting is absent.
    #[error("missing required configuration setting: {key}")]
    MissingSetting {
        /// The missing setting key.
        key: String,
    },

    /// A plugin setting is present but unusable.
    #[error("invalid configuration setting {key}: {reason}")]
    InvalidSetting {
        /// The offending setting key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A strategy role has no usable entries.
    #[error("at least one {role} must be configured")]
    MissingStrategy {
        /// The strategy role ("identifier" or "authenticator").
        role: &'static str,
    },

    /// A file-backed plugin points at a file that does not exist.
    #[error("credential file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A file-backed plugin failed to read its backing file.
    #[error("failed to read credential file: {path}")]
    ReadError {
        /// Path to the unreadable file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A callback name does not resolve in the registry.
    #[error("no callback registered under name: {name}")]
    UnknownCallback {
        /// The unresolvable callback name.
        name: String,
    },

    /// A strategy factory failed for a plugin-specific reason.
    #[error("strategy construction failed: {message}")]
    Strategy {
        /// Description of the failure.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ConfigError {
    /// Creates a missing-setting error.
    pub fn missing_setting(key: impl Into<String>) -> Self {
        Self::MissingSetting { key: key.into() }
    }

    /// Creates an invalid-setting error.
    pub fn invalid_setting(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates a file-not-found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates a read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates an unknown-callback error.
    pub fn unknown_callback(name: impl Into<String>) -> Self {
        Self::UnknownCallback { name: name.into() }
    }

    /// Creates a plugin-specific strategy error.
    pub fn strategy(message: impl Into<String>) -> Self {
        Self::Strategy {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a plugin-specific strategy error with an underlying cause.
    pub fn strategy_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Strategy {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_all_false() {
        let config = AuthConfig::new();
        assert!(!config.delay_unauthorized);
        assert!(!config.delay_forbidden);
        assert!(!config.default_authorize);
        assert!(config.settings.is_empty());
    }

    #[test]
    fn test_builder_style_flags() {
        let config = AuthConfig::new().delay_unauthorized(true).default_authorize(true);
        assert!(config.delay_unauthorized);
        assert!(!config.delay_forbidden);
        assert!(config.default_authorize);
    }

    #[test]
    fn test_settings_round_trip() {
        let config = AuthConfig::new()
            .setting("header_user", "x-auth-user")
            .setting("external_sets_roles", true);

        assert_eq!(config.str_setting("header_user"), Some("x-auth-user"));
        assert!(config.bool_setting("external_sets_roles"));
        assert!(!config.bool_setting("absent"));
    }

    #[test]
    fn test_require_str_reports_missing_key() {
        let config = AuthConfig::new();
        let err = config.require_str("htpasswd_path").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting { .. }));
    }

    #[test]
    fn test_require_str_rejects_non_string() {
        let config = AuthConfig::new().setting("htpasswd_path", 42);
        let err = config.require_str("htpasswd_path").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { .. }));
    }

    #[test]
    fn test_strategy_error_carries_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked");
        let err = ConfigError::strategy_with_source("cannot open key store", io_err);
        assert!(err.to_string().contains("cannot open key store"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_deserializes_flags_and_flattened_settings() {
        let config: AuthConfig = serde_json::from_str(
            r#"{"delay_forbidden": true, "header_user": "x-user", "header_key": "x-key"}"#,
        )
        .expect("deserialization should work");

        assert!(config.delay_forbidden);
        assert!(!config.delay_unauthorized);
        assert_eq!(config.str_setting("header_user"), Some("x-user"));
        assert_eq!(config.str_setting("header_key"), Some("x-key"));
    }
}
