//! Pipeline-level terminal signals.
//!
//! [`AuthError`] covers the two ways a pipeline run can halt: no valid
//! identity ("401-equivalent") and denied authorization ("403-equivalent").
//! Strategy failures themselves are ordinary boolean outcomes, never
//! errors; these signals are raised only by the orchestrator, and only when
//! the corresponding delay policy is not set.

use http::StatusCode;
use thiserror::Error;

/// Terminal signal raised by the pipeline orchestrator.
///
/// The surrounding HTTP layer is expected to translate the signal into the
/// corresponding status-code response; both variants carry a short title
/// and a human-readable description for that purpose.
///
/// # Example
///
/// ```
/// use gatehouse_core::AuthError;
/// use http::StatusCode;
///
/// let err = AuthError::unauthorized("Authentication required", "No identity information found.");
/// assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No identity was found, or the identity failed authentication.
    #[error("{title}: {description}")]
    Unauthorized {
        /// Short human-readable title.
        title: String,
        /// Longer description of what failed.
        description: String,
    },

    /// The identity is valid but may not perform the attempted action.
    #[error("{title}: {description}")]
    Forbidden {
        /// Short human-readable title.
        title: String,
        /// Longer description of what was denied.
        description: String,
    },
}

impl AuthError {
    /// Creates an unauthorized signal.
    #[must_use]
    pub fn unauthorized(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Unauthorized {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Creates a forbidden signal.
    #[must_use]
    pub fn forbidden(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Forbidden {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Returns the signal's title.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Unauthorized { title, .. } | Self::Forbidden { title, .. } => title,
        }
    }

    /// Returns the signal's description.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Unauthorized { description, .. } | Self::Forbidden { description, .. } => {
                description
            }
        }
    }

    /// Returns the HTTP status code this signal maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    /// Returns a machine-readable error code for response envelopes.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "AUTHENTICATION_ERROR",
            Self::Forbidden { .. } => "AUTHORIZATION_DENIED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_401() {
        let err = AuthError::unauthorized("Authentication required", "Authentication failed.");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "AUTHENTICATION_ERROR");
        assert_eq!(err.title(), "Authentication required");
        assert_eq!(err.description(), "Authentication failed.");
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let err = AuthError::forbidden("Forbidden", "Not permitted.");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.code(), "AUTHORIZATION_DENIED");
    }

    #[test]
    fn test_display_joins_title_and_description() {
        let err = AuthError::unauthorized("Authentication required", "No identity.");
        assert_eq!(err.to_string(), "Authentication required: No identity.");
    }
}
