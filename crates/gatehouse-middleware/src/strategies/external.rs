//! Callback-backed authenticator and authorizer.
//!
//! These strategies delegate the decision to a host-supplied function. The
//! host populates a [`CallbackRegistry`] at startup; configuration then
//! names the function (`external_authfn` / `external_authzfn`), and the
//! name is resolved against the registry when the strategy is constructed.
//! An unknown name is a configuration error at build time, never a call
//! failure at request time.
//!
//! When the host holds a function handle directly, [`CallbackAuthenticator::from_fn`]
//! and [`CallbackAuthorizer::from_fn`] skip the registry entirely.

use crate::config::{AuthConfig, ConfigError};
use crate::strategy::{
    Authenticator, AuthenticatorSource, Authorizer, AuthorizerSource,
};
use gatehouse_core::{Identity, ResourceAction};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

/// Authentication callback: verifies (and may enrich) an identity.
pub type AuthenticateFn = Arc<dyn Fn(&mut Identity) -> bool + Send + Sync>;

/// Authorization callback: decides whether an identity may perform an action.
pub type AuthorizeFn = Arc<dyn Fn(&Identity, &ResourceAction) -> bool + Send + Sync>;

/// Startup-populated table of named host callbacks.
///
/// # Example
///
/// ```
/// use gatehouse_middleware::strategies::CallbackRegistry;
///
/// let mut registry = CallbackRegistry::new();
/// registry.register_authenticator("always", |_identity| true);
/// registry.register_authorizer("admins_only", |identity, _action| {
///     identity.has_role("admin")
/// });
/// ```
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    authenticators: HashMap<String, AuthenticateFn>,
    authorizers: HashMap<String, AuthorizeFn>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an authentication callback under a name.
    pub fn register_authenticator<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(&mut Identity) -> bool + Send + Sync + 'static,
    {
        self.authenticators.insert(name.into(), Arc::new(callback));
    }

    /// Registers an authorization callback under a name.
    pub fn register_authorizer<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(&Identity, &ResourceAction) -> bool + Send + Sync + 'static,
    {
        self.authorizers.insert(name.into(), Arc::new(callback));
    }

    /// Looks up an authentication callback by name.
    #[must_use]
    pub fn authenticator(&self, name: &str) -> Option<AuthenticateFn> {
        self.authenticators.get(name).cloned()
    }

    /// Looks up an authorization callback by name.
    #[must_use]
    pub fn authorizer(&self, name: &str) -> Option<AuthorizeFn> {
        self.authorizers.get(name).cloned()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("authenticators", &self.authenticators.keys())
            .field("authorizers", &self.authorizers.keys())
            .finish()
    }
}

/// Authenticator that delegates verification to a host callback.
///
/// # Configuration
///
/// | setting                | required | meaning                                  |
/// |------------------------|----------|------------------------------------------|
/// | `external_authfn`      | yes      | registry name of the callback            |
/// | `external_sets_roles`  | no       | whether the callback populates roles     |
/// | `external_sets_groups` | no       | whether the callback populates groups    |
#[derive(Clone)]
pub struct CallbackAuthenticator {
    callback: AuthenticateFn,
    sets_roles: bool,
    sets_groups: bool,
}

impl CallbackAuthenticator {
    /// Wraps a function handle directly, bypassing the registry.
    #[must_use]
    pub fn from_fn<F>(callback: F) -> AuthenticatorSource
    where
        F: Fn(&mut Identity) -> bool + Send + Sync + 'static,
    {
        AuthenticatorSource::instance(Self {
            callback: Arc::new(callback),
            sets_roles: false,
            sets_groups: false,
        })
    }

    /// Returns a strategy source resolving the callback name against the
    /// given registry at build time.
    #[must_use]
    pub fn source(registry: &CallbackRegistry) -> AuthenticatorSource {
        let registry = registry.clone();
        AuthenticatorSource::factory(move |config| {
            Ok(Arc::new(Self::from_registry(&registry, config)?) as Arc<dyn Authenticator>)
        })
    }

    /// Constructs the authenticator from the registry and configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSetting`] when `external_authfn` is
    /// absent and [`ConfigError::UnknownCallback`] when the name does not
    /// resolve.
    pub fn from_registry(
        registry: &CallbackRegistry,
        config: &AuthConfig,
    ) -> Result<Self, ConfigError> {
        let name = config.require_str("external_authfn").map_err(|err| {
            error!("missing required external_authfn configuration setting");
            err
        })?;
        let callback = registry.authenticator(name).ok_or_else(|| {
            error!(name, "external_authfn does not resolve to a registered callback");
            ConfigError::unknown_callback(name)
        })?;

        Ok(Self {
            callback,
            sets_roles: config.bool_setting("external_sets_roles"),
            sets_groups: config.bool_setting("external_sets_groups"),
        })
    }
}

impl Authenticator for CallbackAuthenticator {
    fn name(&self) -> &'static str {
        "external"
    }

    fn authenticate(&self, identity: &mut Identity) -> bool {
        (self.callback)(identity)
    }

    fn sets_roles(&self) -> bool {
        self.sets_roles
    }

    fn sets_groups(&self) -> bool {
        self.sets_groups
    }
}

impl std::fmt::Debug for CallbackAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackAuthenticator")
            .field("sets_roles", &self.sets_roles)
            .field("sets_groups", &self.sets_groups)
            .finish()
    }
}

/// Authorizer that delegates the decision to a host callback.
///
/// # Configuration
///
/// | setting             | required | meaning                       |
/// |---------------------|----------|-------------------------------|
/// | `external_authzfn`  | yes      | registry name of the callback |
#[derive(Clone)]
pub struct CallbackAuthorizer {
    callback: AuthorizeFn,
}

impl CallbackAuthorizer {
    /// Wraps a function handle directly, bypassing the registry.
    #[must_use]
    pub fn from_fn<F>(callback: F) -> AuthorizerSource
    where
        F: Fn(&Identity, &ResourceAction) -> bool + Send + Sync + 'static,
    {
        AuthorizerSource::instance(Self {
            callback: Arc::new(callback),
        })
    }

    /// Returns a strategy source resolving the callback name against the
    /// given registry at build time.
    #[must_use]
    pub fn source(registry: &CallbackRegistry) -> AuthorizerSource {
        let registry = registry.clone();
        AuthorizerSource::factory(move |config| {
            Ok(Arc::new(Self::from_registry(&registry, config)?) as Arc<dyn Authorizer>)
        })
    }

    /// Constructs the authorizer from the registry and configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSetting`] when `external_authzfn` is
    /// absent and [`ConfigError::UnknownCallback`] when the name does not
    /// resolve.
    pub fn from_registry(
        registry: &CallbackRegistry,
        config: &AuthConfig,
    ) -> Result<Self, ConfigError> {
        let name = config.require_str("external_authzfn").map_err(|err| {
            error!("missing required external_authzfn configuration setting");
            err
        })?;
        let callback = registry.authorizer(name).ok_or_else(|| {
            error!(name, "external_authzfn does not resolve to a registered callback");
            ConfigError::unknown_callback(name)
        })?;

        Ok(Self { callback })
    }
}

impl Authorizer for CallbackAuthorizer {
    fn name(&self) -> &'static str {
        "external"
    }

    fn authorize(&self, identity: &Identity, action: &ResourceAction) -> bool {
        (self.callback)(identity, action)
    }
}

impl std::fmt::Debug for CallbackAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CallbackAuthorizer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_unknown_authenticator_name_fails_construction() {
        let registry = CallbackRegistry::new();
        let config = AuthConfig::new().setting("external_authfn", "nope");

        let err = CallbackAuthenticator::from_registry(&registry, &config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCallback { .. }));
    }

    #[test]
    fn test_missing_name_setting_fails_construction() {
        let registry = CallbackRegistry::new();

        let err = CallbackAuthenticator::from_registry(&registry, &AuthConfig::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting { .. }));

        let err = CallbackAuthorizer::from_registry(&registry, &AuthConfig::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting { .. }));
    }

    #[test]
    fn test_registered_callback_receives_identity() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let mut registry = CallbackRegistry::new();
        registry.register_authenticator("check", move |identity: &mut Identity| {
            seen.fetch_add(1, Ordering::SeqCst);
            identity.key.as_deref() == Some("s3cret")
        });

        let config = AuthConfig::new().setting("external_authfn", "check");
        let auth = CallbackAuthenticator::from_registry(&registry, &config).unwrap();

        let mut good = Identity::new("alice").with_key("s3cret");
        assert!(auth.authenticate(&mut good));

        let mut bad = Identity::new("alice").with_key("wrong");
        assert!(!auth.authenticate(&mut bad));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_callback_may_enrich_identity() {
        let mut registry = CallbackRegistry::new();
        registry.register_authenticator("enrich", |identity: &mut Identity| {
            identity.add_role("admin");
            true
        });

        let config = AuthConfig::new()
            .setting("external_authfn", "enrich")
            .setting("external_sets_roles", true);
        let auth = CallbackAuthenticator::from_registry(&registry, &config).unwrap();

        assert!(auth.sets_roles());
        assert!(!auth.sets_groups());

        let mut identity = Identity::new("alice").with_key("pw");
        assert!(auth.authenticate(&mut identity));
        assert!(identity.has_role("admin"));
    }

    #[test]
    fn test_authorizer_sees_identity_and_action() {
        let mut registry = CallbackRegistry::new();
        registry.register_authorizer("admins_delete", |identity, action| {
            identity.has_role("admin") && action.as_str().ends_with(".delete")
        });

        let config = AuthConfig::new().setting("external_authzfn", "admins_delete");
        let authz = CallbackAuthorizer::from_registry(&registry, &config).unwrap();

        let admin = Identity::new("alice").with_roles(["admin"]);
        let delete = ResourceAction::new(&Method::DELETE, "/users/123");
        let get = ResourceAction::new(&Method::GET, "/users/123");

        assert!(authz.authorize(&admin, &delete));
        assert!(!authz.authorize(&admin, &get));

        let peon = Identity::new("bob");
        assert!(!authz.authorize(&peon, &delete));
    }

    #[test]
    fn test_from_fn_bypasses_registry() {
        let source = CallbackAuthenticator::from_fn(|identity| identity.login == "alice");
        let auth = source.resolve(&AuthConfig::new()).unwrap();

        let mut alice = Identity::new("alice");
        assert!(auth.authenticate(&mut alice));

        let mut bob = Identity::new("bob");
        assert!(!auth.authenticate(&mut bob));
    }
}
