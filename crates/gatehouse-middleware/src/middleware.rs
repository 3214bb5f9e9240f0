//! Middleware chain integration.
//!
//! This module defines the [`Middleware`] trait that hosts use to splice
//! the pipeline into their request handling, together with the [`Next`]
//! continuation and [`AuthMiddleware`], the pipeline packaged as a chain
//! stage.
//!
//! The pipeline itself ([`AuthPipeline`]) is synchronous; the chain surface
//! is async so the stage composes with an async host server. A request that
//! passes the pipeline continues to the next stage with its [`AuthContext`]
//! populated; a request that trips a terminal signal is answered with the
//! corresponding 401/403 JSON envelope without reaching the handler.

use crate::pipeline::AuthPipeline;
use crate::types::{Request, Response, ResponseExt};
use gatehouse_core::AuthContext;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

/// A boxed future returning a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single stage in the request-processing chain.
///
/// Stages receive the mutable per-request [`AuthContext`], the incoming
/// request, and a [`Next`] continuation. A stage either calls
/// `next.run()` exactly once to continue, or short-circuits by returning
/// its own response.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this stage, used for logging.
    fn name(&self) -> &'static str;

    /// Processes the request through this stage.
    fn process<'a>(
        &'a self,
        ctx: &'a mut AuthContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// Continuation invoking the rest of the chain.
///
/// Consumed by `run`, so a stage can only continue once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Stage {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(Box<dyn FnOnce(&mut AuthContext, Request) -> BoxFuture<'static, Response> + Send + 'a>),
}

impl<'a> Next<'a> {
    /// Creates a continuation that will invoke the given stage.
    #[must_use]
    pub fn stage(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Stage {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal continuation that invokes the handler.
    #[must_use]
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut AuthContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next stage or the handler.
    pub async fn run(self, ctx: &mut AuthContext, request: Request) -> Response {
        match self.inner {
            NextInner::Stage { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

/// The authentication pipeline packaged as a chain stage.
///
/// Runs the three-phase sequence against the request and either continues
/// the chain or answers with the JSON envelope for the terminal signal.
///
/// # Example
///
/// ```no_run
/// use gatehouse_middleware::{AuthConfig, AuthMiddleware, AuthPipeline, BasicAuthIdentifier};
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
/// let stage = AuthMiddleware::new(pipeline);
/// // splice `stage` into the host's chain...
/// # drop(stage);
/// ```
#[derive(Debug, Clone)]
pub struct AuthMiddleware {
    pipeline: Arc<AuthPipeline>,
}

impl AuthMiddleware {
    /// Wraps a pipeline for use as a chain stage.
    #[must_use]
    pub fn new(pipeline: AuthPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Returns the wrapped pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &AuthPipeline {
        &self.pipeline
    }
}

impl Middleware for AuthMiddleware {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut AuthContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            match self.pipeline.apply(ctx, &request) {
                Ok(()) => next.run(ctx, request).await,
                Err(err) => {
                    debug!(
                        request_id = %ctx.request_id(),
                        status = %err.status_code(),
                        "pipeline halted request"
                    );
                    Response::auth_error(&err)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::strategy::{Authenticator, AuthenticatorSource, Identifier, IdentifierSource};
    use bytes::Bytes;
    use gatehouse_core::Identity;
    use http::StatusCode;
    use http_body_util::Full;

    struct FixedIdentifier(bool);

    impl Identifier for FixedIdentifier {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn identify(&self, _request: &Request, ctx: &mut AuthContext) -> bool {
            if self.0 {
                ctx.set_identity(Identity::new("alice").with_key("pw"));
            }
            self.0
        }
    }

    struct FixedAuthenticator(bool);

    impl Authenticator for FixedAuthenticator {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn authenticate(&self, _identity: &mut Identity) -> bool {
            self.0
        }
    }

    fn make_request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn ok_handler() -> Next<'static> {
        Next::handler(|_ctx, _req| {
            Box::pin(async {
                http::Response::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(Bytes::from("OK")))
                    .unwrap()
            })
        })
    }

    fn make_stage(identify: bool, authenticate: bool, config: AuthConfig) -> AuthMiddleware {
        let pipeline = AuthPipeline::builder()
            .identify_with(IdentifierSource::instance(FixedIdentifier(identify)))
            .authenticate_with(AuthenticatorSource::instance(FixedAuthenticator(authenticate)))
            .config(config)
            .build()
            .unwrap();
        AuthMiddleware::new(pipeline)
    }

    #[tokio::test]
    async fn test_passing_request_reaches_handler() {
        let stage = make_stage(true, true, AuthConfig::new().default_authorize(true));
        let mut ctx = AuthContext::new();

        let response = stage.process(&mut ctx, make_request(), ok_handler()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(ctx.is_identified());
        assert!(ctx.is_authenticated());
        assert!(ctx.is_authorized());
    }

    #[tokio::test]
    async fn test_unidentified_request_gets_401() {
        let stage = make_stage(false, true, AuthConfig::new().default_authorize(true));
        let mut ctx = AuthContext::new();

        let response = stage.process(&mut ctx, make_request(), ok_handler()).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(http::header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn test_denied_request_gets_403() {
        let stage = make_stage(true, true, AuthConfig::new());
        let mut ctx = AuthContext::new();

        let response = stage.process(&mut ctx, make_request(), ok_handler()).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_delay_mode_reaches_handler_with_flags() {
        let stage = make_stage(
            false,
            true,
            AuthConfig::new()
                .delay_unauthorized(true)
                .delay_forbidden(true),
        );
        let mut ctx = AuthContext::new();

        let response = stage.process(&mut ctx, make_request(), ok_handler()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ctx.identified(), Some(false));
        assert_eq!(ctx.authenticated(), Some(false));
    }

    #[test]
    fn test_stage_name() {
        let stage = make_stage(true, true, AuthConfig::new());
        assert_eq!(stage.name(), "auth");
    }
}
