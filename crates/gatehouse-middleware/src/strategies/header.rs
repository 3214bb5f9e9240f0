//! Static HTTP header identifier.
//!
//! Reads the login and key from two configured request headers, with
//! optional comma-separated enrichment headers feeding the identity's role
//! and group sets. Useful behind a trusted proxy that has already
//! authenticated the caller and forwards who they are.

use crate::config::{AuthConfig, ConfigError};
use crate::strategy::{Identifier, IdentifierSource};
use crate::types::Request;
use gatehouse_core::{AuthContext, Identity};
use std::sync::Arc;
use tracing::error;

/// Identifier that reads identity information from configured HTTP headers.
///
/// # Configuration
///
/// | setting         | required | meaning                                     |
/// |-----------------|----------|---------------------------------------------|
/// | `header_user`   | yes      | header carrying the login name              |
/// | `header_key`    | yes      | header carrying the password/key            |
/// | `header_roles`  | no       | header carrying comma-separated role names  |
/// | `header_groups` | no       | header carrying comma-separated group names |
///
/// # Example
///
/// ```
/// use gatehouse_middleware::{AuthConfig, HeaderIdentifier};
///
/// let config = AuthConfig::new()
///     .setting("header_user", "x-auth-user")
///     .setting("header_key", "x-auth-key");
/// let identifier = HeaderIdentifier::from_config(&config).unwrap();
/// # drop(identifier);
/// ```
#[derive(Debug, Clone)]
pub struct HeaderIdentifier {
    user_header: String,
    key_header: String,
    roles_header: Option<String>,
    groups_header: Option<String>,
}

impl HeaderIdentifier {
    /// Returns a strategy source for the pipeline builder.
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
    /// Returns [`ConfigError::MissingSetting`] when `header_user` or
    /// `header_key` is absent.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let user_header = config.require_str("header_user").map_err(|err| {
            error!("missing required header_user configuration setting");
            err
        })?;
        let key_header = config.require_str("header_key").map_err(|err| {
            error!("missing required header_key configuration setting");
            err
        })?;

        Ok(Self {
            user_header: user_header.to_string(),
            key_header: key_header.to_string(),
            roles_header: config.str_setting("header_roles").map(ToString::to_string),
            groups_header: config.str_setting("header_groups").map(ToString::to_string),
        })
    }

    fn header_value<'r>(request: &'r Request, name: &str) -> Option<&'r str> {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
    }

    fn split_list(value: &str) -> impl Iterator<Item = &str> {
        value.split(',').map(str::trim).filter(|item| !item.is_empty())
    }
}

impl Identifier for HeaderIdentifier {
    fn name(&self) -> &'static str {
        "http_header"
    }

    fn identify(&self, request: &Request, ctx: &mut AuthContext) -> bool {
        if ctx.identity().is_some() {
            return true;
        }

        let Some(login) = Self::header_value(request, &self.user_header) else {
            return false;
        };
        let Some(key) = Self::header_value(request, &self.key_header) else {
            return false;
        };

        let mut identity = Identity::new(login).with_key(key);
        if let Some(header) = &self.roles_header {
            if let Some(value) = Self::header_value(request, header) {
                identity = identity.with_roles(Self::split_list(value));
            }
        }
        if let Some(header) = &self.groups_header {
            if let Some(value) = Self::header_value(request, header) {
                identity = identity.with_groups(Self::split_list(value));
            }
        }

        ctx.set_identity(identity);
        true
    }
}
