//! The three-phase authentication pipeline.
//!
//! This module implements the immutable pipeline that every intercepted
//! request flows through. The phase order is fixed and cannot be modified:
//!
//! ```text
//! Request → Identify → Authenticate → Authorize → caller continues
//!               │            │             │
//!               └── 401 ─────┘             └── 403
//! ```
//!
//! Within each phase, strategies run strictly in the order supplied at
//! construction; the first strategy to return true wins and later ones are
//! never invoked for that request. The per-phase delay flags turn the 401
//! and 403 escapes into recorded outcomes that downstream code inspects
//! itself.

use crate::config::{AuthConfig, ConfigError};
use crate::strategy::{
    Authenticator, AuthenticatorSource, Authorizer, AuthorizerSource, Identifier,
    IdentifierSource,
};
use crate::types::Request;
use gatehouse_core::{AuthContext, AuthError, ResourceAction};
use std::sync::Arc;
use tracing::debug;

/// The immutable, shareable pipeline orchestrator.
///
/// Holds the ordered strategy lists plus the policy flags, and evaluates
/// the three-phase sequence for one request at a time. The pipeline itself
/// carries no per-request state, so one instance serves concurrent requests
/// without locking; everything mutable lives in the per-request
/// [`AuthContext`].
///
/// # Example
///
/// ```
/// use gatehouse_middleware::{AuthConfig, AuthPipeline, BasicAuthIdentifier};
/// use gatehouse_middleware::strategies::CallbackAuthenticator;
///
/// let pipeline = AuthPipeline::builder()
///     .identify_with(BasicAuthIdentifier::source())
///     .authenticate_with(CallbackAuthenticator::from_fn(|identity| {
///         identity.key.as_deref() == Some("s3cret")
///     }))
///     .config(AuthConfig::new().default_authorize(true))
///     .build()
///     .unwrap();
///
/// assert_eq!(pipeline.identifier_names(), vec!["basic_auth"]);
/// ```
pub struct AuthPipeline {
    /// Identification strategies, tried in order.
    identifiers: Vec<Arc<dyn Identifier>>,

    /// Authentication strategies, tried in order.
    authenticators: Vec<Arc<dyn Authenticator>>,

    /// The optional authorization strategy.
    authorizer: Option<Arc<dyn Authorizer>>,

    /// Suppress the 401 escape and keep going.
    delay_unauthorized: bool,

    /// Suppress the 403 escape and keep going.
    delay_forbidden: bool,

    /// Decision recorded when no authorizer is configured.
    default_authorize: bool,
}

impl AuthPipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> AuthPipelineBuilder {
        AuthPipelineBuilder::new()
    }

    /// Runs the three-phase sequence for one request.
    ///
    /// Outcome flags are written into `ctx` after each phase, regardless of
    /// whether the pipeline halts early. A halted run still leaves the
    /// flags it reached set, so a caller in delay mode can inspect how far
    /// the pipeline got.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] when no identity is found or the
    /// identity fails authentication (unless `delay_unauthorized` is set),
    /// and [`AuthError::Forbidden`] when authorization denies the action
    /// (unless `delay_forbidden` is set).
    pub fn apply(&self, ctx: &mut AuthContext, request: &Request) -> Result<(), AuthError> {
        self.identify(ctx, request)?;
        self.authenticate(ctx)?;
        self.authorize(ctx, request)
    }

    /// Phase 1: scan identifiers until one claims the request.
    fn identify(&self, ctx: &mut AuthContext, request: &Request) -> Result<(), AuthError> {
        let mut identified = false;
        for identifier in &self.identifiers {
            if identifier.identify(request, ctx) {
                debug!(
                    request_id = %ctx.request_id(),
                    strategy = identifier.name(),
                    "request identified"
                );
                identified = true;
                break;
            }
        }

        ctx.record_identified(identified);
        if !identified && !self.delay_unauthorized {
            return Err(AuthError::unauthorized(
                "Authentication required",
                "No identity information found.",
            ));
        }
        Ok(())
    }

    /// Phase 2: scan authenticators until one verifies the identity.
    ///
    /// A request that reached this phase without an identity (delayed miss
    /// in phase 1) is recorded as not authenticated without invoking any
    /// authenticator.
    fn authenticate(&self, ctx: &mut AuthContext) -> Result<(), AuthError> {
        let authenticated = match ctx.identity_mut() {
            None => false,
            Some(identity) => {
                let mut verified = false;
                for authenticator in &self.authenticators {
                    if authenticator.authenticate(identity) {
                        verified = true;
                        break;
                    }
                }
                verified
            }
        };

        ctx.record_authenticated(authenticated);
        if !authenticated && !self.delay_unauthorized {
            return Err(AuthError::unauthorized(
                "Authentication required",
                "Authentication failed.",
            ));
        }
        Ok(())
    }

    /// Phase 3: evaluate the authorizer, or fall back to the default.
    ///
    /// The [`ResourceAction`] is built only when a configured authorizer
    /// will actually see it. Without an identity (delayed miss upstream)
    /// a configured authorizer records a denial without being invoked.
    fn authorize(&self, ctx: &mut AuthContext, request: &Request) -> Result<(), AuthError> {
        let authorized = match (&self.authorizer, ctx.identity()) {
            (None, _) => self.default_authorize,
            (Some(_), None) => false,
            (Some(authorizer), Some(identity)) => {
                let action = ResourceAction::new(request.method(), request.uri().path());
                let allowed = authorizer.authorize(identity, &action);
                debug!(
                    request_id = %ctx.request_id(),
                    strategy = authorizer.name(),
                    action = %action,
                    allowed,
                    "authorization evaluated"
                );
                allowed
            }
        };

        ctx.record_authorized(authorized);
        if !authorized && !self.delay_forbidden {
            return Err(AuthError::forbidden(
                "Forbidden",
                "Not authorized to perform the requested action.",
            ));
        }
        Ok(())
    }

    /// Returns the names of the identification strategies in order.
    #[must_use]
    pub fn identifier_names(&self) -> Vec<&'static str> {
        self.identifiers.iter().map(|i| i.name()).collect()
    }

    /// Returns the names of the authentication strategies in order.
    #[must_use]
    pub fn authenticator_names(&self) -> Vec<&'static str> {
        self.authenticators.iter().map(|a| a.name()).collect()
    }

    /// Returns the authorizer name, if one is configured.
    #[must_use]
    pub fn authorizer_name(&self) -> Option<&'static str> {
        self.authorizer.as_ref().map(|a| a.name())
    }
}

impl std::fmt::Debug for AuthPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthPipeline")
            .field("identifiers", &self.identifier_names())
            .field("authenticators", &self.authenticator_names())
            .field("authorizer", &self.authorizer_name())
            .field("delay_unauthorized", &self.delay_unauthorized)
            .field("delay_forbidden", &self.delay_forbidden)
            .field("default_authorize", &self.default_authorize)
            .finish()
    }
}

/// Builder for constructing an [`AuthPipeline`].
///
/// Accepts, for each strategy role, any mix of pre-built instances and
/// factories (see [`IdentifierSource`] and friends); single values and
/// batches normalize into one ordered list per role. Every factory is
/// resolved eagerly with the shared [`AuthConfig`] at build time, so a
/// broken plugin fails construction instead of the first request.
#[derive(Debug, Default)]
pub struct AuthPipelineBuilder {
    identifiers: Vec<IdentifierSource>,
    authenticators: Vec<AuthenticatorSource>,
    authorizer: Option<AuthorizerSource>,
    config: AuthConfig,
}

impl AuthPipelineBuilder {
    /// Creates an empty builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one identification strategy.
    #[must_use]
    pub fn identify_with(mut self, source: IdentifierSource) -> Self {
        self.identifiers.push(source);
        self
    }

    /// Appends an ordered batch of identification strategies.
    #[must_use]
    pub fn identify_with_each(mut self, sources: impl IntoIterator<Item = IdentifierSource>) -> Self {
        self.identifiers.extend(sources);
        self
    }

    /// Appends one authentication strategy.
    #[must_use]
    pub fn authenticate_with(mut self, source: AuthenticatorSource) -> Self {
        self.authenticators.push(source);
        self
    }

    /// Appends an ordered batch of authentication strategies.
    #[must_use]
    pub fn authenticate_with_each(
        mut self,
        sources: impl IntoIterator<Item = AuthenticatorSource>,
    ) -> Self {
        self.authenticators.extend(sources);
        self
    }

    /// Sets the authorization strategy.
    ///
    /// At most one authorizer takes part in a pipeline; calling this twice
    /// replaces the earlier value.
    #[must_use]
    pub fn authorize_with(mut self, source: AuthorizerSource) -> Self {
        self.authorizer = Some(source);
        self
    }

    /// Sets the shared configuration: policy flags for the orchestrator
    /// plus the settings map forwarded to every strategy factory.
    #[must_use]
    pub fn config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolves all strategy sources and builds the immutable pipeline.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when any factory rejects the shared
    /// configuration, or when the identifier or authenticator list would
    /// end up empty.
    pub fn build(self) -> Result<AuthPipeline, ConfigError> {
        if self.identifiers.is_empty() {
            return Err(ConfigError::MissingStrategy { role: "identifier" });
        }
        if self.authenticators.is_empty() {
            return Err(ConfigError::MissingStrategy {
                role: "authenticator",
            });
        }

        let config = self.config;

        let identifiers = self
            .identifiers
            .into_iter()
            .map(|source| source.resolve(&config))
            .collect::<Result<Vec<_>, _>>()?;

        let authenticators = self
            .authenticators
            .into_iter()
            .map(|source| source.resolve(&config))
            .collect::<Result<Vec<_>, _>>()?;

        let authorizer = self
            .authorizer
            .map(|source| source.resolve(&config))
            .transpose()?;

        Ok(AuthPipeline {
            identifiers,
            authenticators,
            authorizer,
            delay_unauthorized: config.delay_unauthorized,
            delay_forbidden: config.delay_forbidden,
            default_authorize: config.default_authorize,
        })
    }
}
