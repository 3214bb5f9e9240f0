//! Concrete strategy plugins.
//!
//! Each plugin implements one of the capability traits and ships a
//! `from_config` constructor plus a `source()` helper for the pipeline
//! builder:
//!
//! - [`basic`] - Basic-Auth header identifier
//! - [`header`] - static HTTP header identifier
//! - [`htpasswd`] - htpasswd credential-file authenticator
//! - [`external`] - callback-registry authenticator and authorizer

pub mod basic;
pub mod external;
pub mod header;
pub mod htpasswd;

pub use basic::BasicAuthIdentifier;
pub use external::{
    AuthenticateFn, AuthorizeFn, CallbackAuthenticator, CallbackAuthorizer, CallbackRegistry,
};
pub use header::HeaderIdentifier;
pub use htpasswd::HtpasswdAuthenticator;
