//! The authenticated-subject data entity.
//!
//! An [`Identity`] is produced exactly once per request by an identifier
//! strategy, may be enriched in place by authenticator strategies, and is
//! frozen once the authorization phase has completed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identity of the requesting principal.
///
/// Carries the stable login name, the opaque credential material presented
/// with the request, and the role/group memberships accumulated while the
/// request moves through the pipeline.
///
/// A `key` of `None` means "identified but not yet verified": an identifier
/// found out *who* the request claims to be without any credential to check.
///
/// # Example
///
/// ```
/// use gatehouse_core::Identity;
///
/// let mut identity = Identity::new("alice").with_key("s3cret");
/// identity.add_role("admin");
///
/// assert_eq!(identity.login, "alice");
/// assert!(identity.has_role("admin"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable identifier of the principal.
    pub login: String,

    /// Opaque credential value (password, token, hash).
    ///
    /// `None` until an identifier extracts one; authenticators validate it
    /// against their backing store.
    pub key: Option<String>,

    /// Role memberships, mutable by authenticators that enrich on success.
    pub roles: BTreeSet<String>,

    /// Group memberships, same mutability as `roles`.
    pub groups: BTreeSet<String>,
}

impl Identity {
    /// Creates an identity for the given login with no credential and empty
    /// role/group sets.
    #[must_use]
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            key: None,
            roles: BTreeSet::new(),
            groups: BTreeSet::new(),
        }
    }

    /// Returns this identity with the given credential attached.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Returns this identity with the given roles added.
    #[must_use]
    pub fn with_roles<I>(mut self, roles: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Returns this identity with the given groups added.
    #[must_use]
    pub fn with_groups<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    /// Adds a single role membership.
    pub fn add_role(&mut self, role: impl Into<String>) {
        self.roles.insert(role.into());
    }

    /// Adds a single group membership.
    pub fn add_group(&mut self, group: impl Into<String>) {
        self.groups.insert(group.into());
    }

    /// Returns true if the identity holds the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Returns true if the identity belongs to the given group.
    #[must_use]
    pub fn has_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}

// The credential never appears in logs; Debug prints only whether one is set.
impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("login", &self.login)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("roles", &self.roles)
            .field("groups", &self.groups)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_identity_has_no_credential() {
        let identity = Identity::new("alice");
        assert_eq!(identity.login, "alice");
        assert!(identity.key.is_none());
        assert!(identity.roles.is_empty());
        assert!(identity.groups.is_empty());
    }

    #[test]
    fn test_with_key_attaches_credential() {
        let identity = Identity::new("alice").with_key("s3cret");
        assert_eq!(identity.key.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_role_and_group_membership() {
        let mut identity = Identity::new("bob")
            .with_roles(["admin", "ops"])
            .with_groups(["staff"]);
        identity.add_role("auditor");
        identity.add_group("oncall");

        assert!(identity.has_role("admin"));
        assert!(identity.has_role("auditor"));
        assert!(!identity.has_role("root"));
        assert!(identity.has_group("staff"));
        assert!(identity.has_group("oncall"));
        assert!(!identity.has_group("board"));
    }

    #[test]
    fn test_duplicate_roles_collapse() {
        let identity = Identity::new("bob").with_roles(["admin", "admin"]);
        assert_eq!(identity.roles.len(), 1);
    }

    #[test]
    fn test_debug_redacts_credential() {
        let identity = Identity::new("alice").with_key("hunter2");
        let rendered = format!("{identity:?}");
        assert!(rendered.contains("alice"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_serialization_round_trip() {
        let identity = Identity::new("alice").with_key("k").with_roles(["r1"]);
        let json = serde_json::to_string(&identity).expect("serialization should work");
        let parsed: Identity = serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(identity, parsed);
    }
}
