//! The authorization subject derived from a request.
//!
//! A [`ResourceAction`] folds an HTTP method and URL path into a single
//! canonical dotted string, built once per request immediately before the
//! authorization phase and immutable thereafter.

use http::Method;
use serde::{Deserialize, Serialize};

/// Canonical dotted descriptor of "what is being attempted".
///
/// The URL path segments are joined by `.`, any query string is stripped,
/// and the lower-cased HTTP method is appended as the final segment:
///
/// ```text
/// GET /users/123/groups/ABC  →  users.123.groups.ABC.get
/// POST /orgs                 →  orgs.post
/// GET /                      →  get
/// ```
///
/// Empty path segments fold away, so the result never carries leading,
/// trailing, or duplicate dots.
///
/// # Example
///
/// ```
/// use gatehouse_core::ResourceAction;
/// use http::Method;
///
/// let action = ResourceAction::new(&Method::GET, "/users/123/groups/ABC");
/// assert_eq!(action.as_str(), "users.123.groups.ABC.get");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceAction {
    dotted: String,
}

impl ResourceAction {
    /// Derives the dotted descriptor from a method and a request path.
    ///
    /// The derivation is pure: the same method and path always produce the
    /// same descriptor, and the input is never modified.
    #[must_use]
    pub fn new(method: &Method, path: &str) -> Self {
        let path = path.split('?').next().unwrap_or_default();
        let mut dotted: String = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(".");
        if !dotted.is_empty() {
            dotted.push('.');
        }
        dotted.push_str(&method.as_str().to_ascii_lowercase());
        Self { dotted }
    }

    /// Returns the dotted descriptor.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.dotted
    }
}

impl std::fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.dotted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_dotted_notation() {
        let action = ResourceAction::new(&Method::GET, "/users/123/groups/ABC");
        assert_eq!(action.as_str(), "users.123.groups.ABC.get");
    }

    #[test]
    fn test_short_path() {
        let action = ResourceAction::new(&Method::POST, "/orgs");
        assert_eq!(action.as_str(), "orgs.post");
    }

    #[test]
    fn test_query_string_is_ignored() {
        let plain = ResourceAction::new(&Method::GET, "/users/123");
        let queried = ResourceAction::new(&Method::GET, "/users/123?q=23491");
        assert_eq!(plain, queried);
    }

    #[test]
    fn test_root_path_folds_to_method() {
        let action = ResourceAction::new(&Method::GET, "/");
        assert_eq!(action.as_str(), "get");
    }

    #[test]
    fn test_separator_runs_fold_away() {
        let action = ResourceAction::new(&Method::DELETE, "//users//123/");
        assert_eq!(action.as_str(), "users.123.delete");
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let first = ResourceAction::new(&Method::PUT, "/a/b/c");
        let second = ResourceAction::new(&Method::PUT, "/a/b/c");
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_canonical_form(segments in proptest::collection::vec("[a-zA-Z0-9_-]{1,8}", 0..6)) {
            let path = format!("/{}", segments.join("/"));
            let action = ResourceAction::new(&Method::GET, &path);
            let dotted = action.as_str();

            prop_assert!(!dotted.starts_with('.'));
            prop_assert!(!dotted.ends_with('.'));
            prop_assert!(!dotted.contains(".."));
            prop_assert!(dotted.ends_with("get"));
        }
    }
}
