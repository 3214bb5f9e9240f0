//! Request-scoped state types.
//!
//! The [`AuthContext`] carries the identity and the three phase-outcome
//! flags through the pipeline. It replaces the string-keyed per-request
//! environment of classic WSGI-style middleware with named, typed fields.

use crate::identity::Identity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it useful for log correlation
/// across the pipeline and the downstream application.
///
/// # Example
///
/// ```
/// use gatehouse_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    ///
    /// Useful when the ID was propagated by an upstream service.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request outcome state written by the pipeline.
///
/// Created fresh for every request and discarded when the request
/// completes. The pipeline records each phase outcome here as it runs, so
/// a caller operating in delay mode can always inspect how far the
/// pipeline got:
///
/// - `None`: the phase never ran (the pipeline halted earlier);
/// - `Some(false)`: the phase ran and failed;
/// - `Some(true)`: the phase ran and succeeded.
///
/// # Example
///
/// ```
/// use gatehouse_core::{AuthContext, Identity};
///
/// let mut ctx = AuthContext::new();
/// assert!(!ctx.is_identified());
///
/// ctx.set_identity(Identity::new("alice"));
/// ctx.record_identified(true);
/// assert!(ctx.is_identified());
/// ```
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// The identity produced by an identifier strategy, if any.
    identity: Option<Identity>,

    /// Outcome of the identification phase.
    identified: Option<bool>,

    /// Outcome of the authentication phase.
    authenticated: Option<bool>,

    /// Outcome of the authorization phase.
    authorized: Option<bool>,
}

impl AuthContext {
    /// Creates an empty context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates an empty context with the given request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            identity: None,
            identified: None,
            authenticated: None,
            authorized: None,
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the identity, if one was produced.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Returns a mutable reference to the identity, if one was produced.
    ///
    /// Authenticators use this to enrich role/group membership on success.
    pub fn identity_mut(&mut self) -> Option<&mut Identity> {
        self.identity.as_mut()
    }

    /// Stores the identity produced by an identifier strategy.
    ///
    /// Identifiers call this at most once per request; later strategies in
    /// the same phase short-circuit instead of overwriting.
    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// Records the outcome of the identification phase.
    pub fn record_identified(&mut self, identified: bool) {
        self.identified = Some(identified);
    }

    /// Records the outcome of the authentication phase.
    pub fn record_authenticated(&mut self, authenticated: bool) {
        self.authenticated = Some(authenticated);
    }

    /// Records the outcome of the authorization phase.
    pub fn record_authorized(&mut self, authorized: bool) {
        self.authorized = Some(authorized);
    }

    /// Raw outcome of the identification phase; `None` if it never ran.
    #[must_use]
    pub const fn identified(&self) -> Option<bool> {
        self.identified
    }

    /// Raw outcome of the authentication phase; `None` if it never ran.
    #[must_use]
    pub const fn authenticated(&self) -> Option<bool> {
        self.authenticated
    }

    /// Raw outcome of the authorization phase; `None` if it never ran.
    #[must_use]
    pub const fn authorized(&self) -> Option<bool> {
        self.authorized
    }

    /// Returns true iff some identifier produced an identity.
    #[must_use]
    pub fn is_identified(&self) -> bool {
        self.identified == Some(true)
    }

    /// Returns true iff some authenticator verified the identity.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated == Some(true)
    }

    /// Returns true iff the authorization phase approved the request.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.authorized == Some(true)
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_is_blank() {
        let ctx = AuthContext::new();
        assert!(ctx.identity().is_none());
        assert_eq!(ctx.identified(), None);
        assert_eq!(ctx.authenticated(), None);
        assert_eq!(ctx.authorized(), None);
        assert!(!ctx.is_identified());
        assert!(!ctx.is_authenticated());
        assert!(!ctx.is_authorized());
    }

    #[test]
    fn test_recorded_outcomes_are_observable() {
        let mut ctx = AuthContext::new();
        ctx.record_identified(true);
        ctx.record_authenticated(false);

        assert_eq!(ctx.identified(), Some(true));
        assert_eq!(ctx.authenticated(), Some(false));
        assert_eq!(ctx.authorized(), None);
        assert!(ctx.is_identified());
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn test_identity_can_be_enriched_in_place() {
        let mut ctx = AuthContext::new();
        ctx.set_identity(Identity::new("alice"));

        ctx.identity_mut()
            .expect("identity was just set")
            .add_role("admin");

        assert!(ctx.identity().expect("identity present").has_role("admin"));
    }

    #[test]
    fn test_with_request_id_preserves_id() {
        let id = RequestId::new();
        let ctx = AuthContext::with_request_id(id);
        assert_eq!(ctx.request_id(), id);
    }

    #[test]
    fn test_request_id_display_matches_uuid() {
        let id = RequestId::new();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }
}
