//! Common HTTP types used throughout the pipeline.

use bytes::Bytes;
use gatehouse_core::AuthError;
use http_body_util::Full;

/// The HTTP request type inspected by identifier strategies.
///
/// A standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced when the pipeline halts a request.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building error responses.
pub trait ResponseExt {
    /// Creates a JSON error response with the given status code.
    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response;

    /// Translates a pipeline terminal signal into its HTTP response.
    ///
    /// Unauthorized signals additionally carry a `WWW-Authenticate`
    /// challenge so clients know credentials are expected.
    fn auth_error(err: &AuthError) -> Response;
}

impl ResponseExt for Response {
    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });

        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("failed to build JSON error response")
    }

    fn auth_error(err: &AuthError) -> Response {
        let mut response = Self::json_error(err.status_code(), err.code(), &err.to_string());
        if matches!(err, AuthError::Unauthorized { .. }) {
            response.headers_mut().insert(
                http::header::WWW_AUTHENTICATE,
                http::HeaderValue::from_static("Basic"),
            );
        }
        response
    }
}
