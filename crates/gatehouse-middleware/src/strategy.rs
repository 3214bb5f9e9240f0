//! Strategy capability traits and configuration sources.
//!
//! The three plugin roles of the pipeline are plain object-safe traits;
//! any struct or closure wrapper that matches the contract can take part,
//! there is no common base type. [`StrategySource`] is how strategies reach
//! the builder: either a ready instance or a factory that the builder
//! resolves eagerly with the shared [`AuthConfig`].

use crate::config::{AuthConfig, ConfigError};
use crate::types::Request;
use gatehouse_core::{AuthContext, Identity, ResourceAction};
use std::sync::Arc;

/// A strategy that extracts an identity from a request without verifying it.
///
/// # Contract
///
/// - Returns true and stores an [`Identity`] into the context on success;
///   returns false and leaves the context untouched otherwise.
/// - Idempotent: when the context already holds an identity (set by an
///   earlier strategy in the same run), implementations short-circuit and
///   return true without re-parsing.
/// - Never panics for malformed input: malformed credentials are a normal
///   "not identified" outcome, not an error.
pub trait Identifier: Send + Sync {
    /// Returns the strategy name used for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Inspects the request and stores an identity into the context.
    fn identify(&self, request: &Request, ctx: &mut AuthContext) -> bool;
}

/// A strategy that verifies an identity's credential.
///
/// # Contract
///
/// - Returns true iff the credential is valid per this strategy's backing
///   store or logic.
/// - May mutate the identity's role/group sets on success; must not mutate
///   the identity on failure.
pub trait Authenticator: Send + Sync {
    /// Returns the strategy name used for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Verifies the identity's credential, optionally enriching it.
    fn authenticate(&self, identity: &mut Identity) -> bool;

    /// Whether successful verification populates the identity's roles.
    ///
    /// Callers use this to decide whether role data is trustworthy.
    fn sets_roles(&self) -> bool {
        false
    }

    /// Whether successful verification populates the identity's groups.
    fn sets_groups(&self) -> bool {
        false
    }
}

/// A strategy that decides whether an identity may perform an action.
///
/// # Contract
///
/// Pure decision function: no side effects on the identity.
pub trait Authorizer: Send + Sync {
    /// Returns the strategy name used for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Decides whether the identity may perform the resource action.
    fn authorize(&self, identity: &Identity, action: &ResourceAction) -> bool;
}

/// A configuration value for one strategy slot: a pre-built strategy or a
/// factory resolved with the shared configuration at build time.
///
/// This is the tagged replacement for "class or instance" configuration
/// values: the builder never inspects arbitrary values at runtime, it just
/// matches on the variant.
///
/// # Example
///
/// ```
/// use gatehouse_middleware::{BasicAuthIdentifier, IdentifierSource};
///
/// // A ready instance...
/// let ready = IdentifierSource::instance(BasicAuthIdentifier::new());
/// // ...or a factory constructed with the shared configuration.
/// let lazy = BasicAuthIdentifier::source();
/// # drop((ready, lazy));
/// ```
pub enum StrategySource<S: ?Sized> {
    /// An already-constructed strategy.
    Instance(Arc<S>),
    /// A constructor invoked with the shared configuration at build time.
    Factory(Box<dyn FnOnce(&AuthConfig) -> Result<Arc<S>, ConfigError> + Send>),
}

impl<S: ?Sized> StrategySource<S> {
    /// Wraps a shared strategy handle.
    #[must_use]
    pub fn from_arc(strategy: Arc<S>) -> Self {
        Self::Instance(strategy)
    }

    /// Wraps a factory closure.
    #[must_use]
    pub fn factory<F>(factory: F) -> Self
    where
        F: FnOnce(&AuthConfig) -> Result<Arc<S>, ConfigError> + Send + 'static,
    {
        Self::Factory(Box::new(factory))
    }

    /// Resolves this source into a ready strategy.
    pub(crate) fn resolve(self, config: &AuthConfig) -> Result<Arc<S>, ConfigError> {
        match self {
            Self::Instance(strategy) => Ok(strategy),
            Self::Factory(factory) => factory(config),
        }
    }
}

impl<S: ?Sized> std::fmt::Debug for StrategySource<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instance(_) => f.write_str("StrategySource::Instance"),
            Self::Factory(_) => f.write_str("StrategySource::Factory"),
        }
    }
}

/// Source of an [`Identifier`] strategy.
pub type IdentifierSource = StrategySource<dyn Identifier>;

/// Source of an [`Authenticator`] strategy.
pub type AuthenticatorSource = StrategySource<dyn Authenticator>;

/// Source of an [`Authorizer`] strategy.
pub type AuthorizerSource = StrategySource<dyn Authorizer>;

impl StrategySource<dyn Identifier> {
    /// Wraps a concrete identifier instance.
    #[must_use]
    pub fn instance(identifier: impl Identifier + 'static) -> Self {
        Self::Instance(Arc::new(identifier))
    }
}

impl StrategySource<dyn Authenticator> {
    /// Wraps a concrete authenticator instance.
    #[must_use]
    pub fn instance(authenticator: impl Authenticator + 'static) -> Self {
        Self::Instance(Arc::new(authenticator))
    }
}

impl StrategySource<dyn Authorizer> {
    /// Wraps a concrete authorizer instance.
    #[must_use]
    pub fn instance(authorizer: impl Authorizer + 'static) -> Self {
        Self::Instance(Arc::new(authorizer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullIdentifier;

    impl Identifier for NullIdentifier {
        fn name(&self) -> &'static str {
            "null"
        }

        fn identify(&self, _request: &Request, _ctx: &mut AuthContext) -> bool {
            false
        }
    }

    #[test]
    fn test_instance_source_resolves_to_itself() {
        let source = IdentifierSource::instance(NullIdentifier);
        let resolved = source.resolve(&AuthConfig::new()).expect("instance resolves");
        assert_eq!(resolved.name(), "null");
    }

    #[test]
    fn test_factory_source_receives_config() {
        let source = IdentifierSource::factory(|config| {
            config.require_str("marker")?;
            Ok(Arc::new(NullIdentifier) as Arc<dyn Identifier>)
        });

        let config = AuthConfig::new().setting("marker", "present");
        assert!(source.resolve(&config).is_ok());
    }

    #[test]
    fn test_factory_failure_surfaces_config_error() {
        let source = IdentifierSource::factory(|config| {
            config.require_str("marker")?;
            Ok(Arc::new(NullIdentifier) as Arc<dyn Identifier>)
        });

        let Err(err) = source.resolve(&AuthConfig::new()) else {
            panic!("expected resolve to fail");
        };
        assert!(matches!(err, ConfigError::MissingSetting { .. }));
    }

    #[test]
    fn test_capability_queries_default_to_false() {
        struct PlainAuthenticator;

        impl Authenticator for PlainAuthenticator {
            fn name(&self) -> &'static str {
                "plain"
            }

            fn authenticate(&self, _identity: &mut Identity) -> bool {
                true
            }
        }

        let auth = PlainAuthenticator;
        assert!(!auth.sets_roles());
        assert!(!auth.sets_groups());
    }
}
