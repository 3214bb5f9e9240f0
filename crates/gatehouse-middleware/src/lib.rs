//! # Gatehouse Middleware
//!
//! Pluggable authentication/authorization middleware pipeline.
//!
//! Gatehouse intercepts an inbound HTTP request before it reaches
//! application logic and runs it through three ordered phases, each backed
//! by interchangeable strategies:
//!
//! ```text
//! Request → Identify → Authenticate → Authorize → handler
//!               │            │             │
//!               └── 401 ─────┘             └── 403
//! ```
//!
//! | Phase        | Strategy trait    | Outcome flag    |
//! |--------------|-------------------|-----------------|
//! | Identify     | [`Identifier`]    | `identified`    |
//! | Authenticate | [`Authenticator`] | `authenticated` |
//! | Authorize    | [`Authorizer`]    | `authorized`    |
//!
//! Within each phase, strategies run strictly in configured order and the
//! first success wins. The per-phase delay flags
//! ([`AuthConfig::delay_unauthorized`], [`AuthConfig::delay_forbidden`])
//! suppress the 401/403 escapes and leave the decision to downstream code,
//! which inspects the recorded outcome flags on the request's
//! [`AuthContext`](gatehouse_core::AuthContext).
//!
//! ## Example
//!
//! ```
//! use gatehouse_middleware::{AuthConfig, AuthPipeline, BasicAuthIdentifier};
//! use gatehouse_middleware::strategies::CallbackAuthenticator;
//!
//! let pipeline = AuthPipeline::builder()
//!     .identify_with(BasicAuthIdentifier::source())
//!     .authenticate_with(CallbackAuthenticator::from_fn(|identity| {
//!         identity.key.as_deref() == Some("s3cret")
//!     }))
//!     .config(AuthConfig::new().default_authorize(true))
//!     .build()
//!     .unwrap();
//! # drop(pipeline);
//! ```

#![doc(html_root_url = "https://docs.rs/gatehouse-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod middleware;
pub mod pipeline;
pub mod strategies;
pub mod strategy;
pub mod types;

// Re-export main types at crate root
pub use config::{AuthConfig, ConfigError};
pub use middleware::{AuthMiddleware, BoxFuture, Middleware, Next};
pub use pipeline::{AuthPipeline, AuthPipelineBuilder};
pub use strategies::{BasicAuthIdentifier, HeaderIdentifier, HtpasswdAuthenticator};
pub use strategy::{
    Authenticator, AuthenticatorSource, Authorizer, AuthorizerSource, Identifier,
    IdentifierSource, StrategySource,
};
pub use types::{Request, Response, ResponseExt};
