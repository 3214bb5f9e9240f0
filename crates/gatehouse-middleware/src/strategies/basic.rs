//! HTTP Basic Access authentication identifier.
//!
//! Reads the `Authorization` header, expecting the `Basic` scheme with a
//! base64-encoded `login:key` payload, and stores the decoded pair as the
//! request identity. Malformed headers are a normal "not identified"
//! outcome, never an error.
//!
//! See <https://en.wikipedia.org/wiki/Basic_access_authentication>.

use crate::config::{AuthConfig, ConfigError};
use crate::strategy::{Identifier, IdentifierSource};
use crate::types::Request;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use gatehouse_core::{AuthContext, Identity};
use std::sync::Arc;
use tracing::debug;

/// Identifier that parses HTTP Basic Access authentication headers.
///
/// # Example
///
/// ```
/// use gatehouse_middleware::{BasicAuthIdentifier, Identifier};
/// use gatehouse_core::AuthContext;
/// use bytes::Bytes;
/// use http_body_util::Full;
///
/// // "alice:s3cret" base64-encoded
/// let request = http::Request::builder()
///     .uri("/")
///     .header("authorization", "Basic YWxpY2U6czNjcmV0")
///     .body(Full::new(Bytes::new()))
///     .unwrap();
///
/// let identifier = BasicAuthIdentifier::new();
/// let mut ctx = AuthContext::new();
/// assert!(identifier.identify(&request, &mut ctx));
/// assert_eq!(ctx.identity().unwrap().login, "alice");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAuthIdentifier;

impl BasicAuthIdentifier {
    /// Creates a new Basic-Auth identifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns a strategy source for the pipeline builder.
    ///
    /// This identifier needs no configuration; the factory exists so it can
    /// be listed alongside configured strategies.
    #[must_use]
    pub fn source() -> IdentifierSource {
        IdentifierSource::factory(|config| {
            Ok(Arc::new(Self::from_config(config)?) as Arc<dyn Identifier>)
        })
    }

    /// Constructs the identifier from the shared configuration.
    ///
    /// # Errors
    ///
    /// Never fails; present for uniformity with configured strategies.
    pub fn from_config(_config: &AuthConfig) -> Result<Self, ConfigError> {
        Ok(Self::new())
    }

    /// Decodes a `Basic` authorization header value into login and key.
    fn parse(header: &str) -> Option<(String, String)> {
        let (scheme, payload) = header.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = match STANDARD.decode(payload.trim()) {
            Ok(decoded) => decoded,
            Err(err) => {
                debug!(error = %err, "basic auth payload is not valid base64");
                return None;
            }
        };
        let decoded = match String::from_utf8(decoded) {
            Ok(decoded) => decoded,
            Err(err) => {
                debug!(error = %err, "basic auth payload is not valid UTF-8");
                return None;
            }
        };

        let (login, key) = decoded.split_once(':')?;
        Some((login.to_string(), key.to_string()))
    }
}

impl Identifier for BasicAuthIdentifier {
    fn name(&self) -> &'static str {
        "basic_auth"
    }

    fn identify(&self, request: &Request, ctx: &mut AuthContext) -> bool {
        if ctx.identity().is_some() {
            return true;
        }

        let Some(header) = request
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
        else {
            return false;
        };

        match Self::parse(header) {
            Some((login, key)) => {
                ctx.set_identity(Identity::new(login).with_key(key));
                true
            }
            None => false,
        }
    }
}
