use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::error::WebError;

/// Rejects requests whose `Authorization` header does not carry a configured API key.
///
/// The key may be sent raw or as `Bearer <key>`. With no keys configured every
/// request is rejected.
pub async fn require_auth(
    State(api_keys): State<ApiKeys>,
    request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(bearer_token);
    let presented = token.is_some();
    let authorized = token.is_some_and(|token| api_keys.is_valid(token));

    if authorized {
        return Ok(next.run(request).await);
    }

    if presented {
        tracing::warn!(path = %request.uri().path(), "Invalid API key attempt");
    } else {
        tracing::warn!(path = %request.uri().path(), "Missing API key");
    }

    Err(WebError::Unauthorized)
}

/// Configured API keys, held as SHA-256 digests
#[derive(Clone, Default)]
pub struct ApiKeys {
    digests: Arc<Vec<[u8; 32]>>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let digests = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(digest)
            .collect();

        Self {
            digests: Arc::new(digests),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Compares against every key without short-circuiting
    pub fn is_valid(&self, key: &str) -> bool {
        let candidate = digest(key);
        self.digests
            .iter()
            .fold(false, |found, known| found | constant_time_eq(known, &candidate))
    }
}

fn bearer_token(header: &str) -> &str {
    header.strip_prefix("Bearer ").unwrap_or(header).trim()
}

fn digest(key: &str) -> [u8; 32] {
    Sha256::digest(key.as_bytes()).into()
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::post,
    };
    use tower::ServiceExt;

    use super::*;

    fn protected_app(keys: &str) -> Router {
        Router::new()
            .route("/admin", post(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(
                ApiKeys::from_comma_separated(keys),
                require_auth,
            ))
    }

    async fn status_with_header(keys: &str, header: Option<&str>) -> StatusCode {
        let mut request = HttpRequest::builder().method("POST").uri("/admin");
        if let Some(header) = header {
            request = request.header(AUTHORIZATION, header);
        }

        protected_app(keys)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_keys_are_parsed_and_trimmed() {
        let keys = ApiKeys::from_comma_separated(" alpha , beta,,");
        assert_eq!(keys.len(), 2);
        assert!(keys.is_valid("alpha"));
        assert!(keys.is_valid("beta"));
        assert!(!keys.is_valid("gamma"));
        assert!(!keys.is_valid(""));
    }

    #[test]
    fn test_no_configured_keys_rejects_everything() {
        let keys = ApiKeys::from_comma_separated("");
        assert!(keys.is_empty());
        assert!(!keys.is_valid(""));
        assert!(!keys.is_valid("anything"));
    }

    #[test]
    fn test_bearer_prefix_is_optional() {
        assert_eq!(bearer_token("Bearer s3cret"), "s3cret");
        assert_eq!(bearer_token("s3cret"), "s3cret");
    }

    #[tokio::test]
    async fn test_accepts_raw_and_bearer_keys() {
        assert_eq!(status_with_header("s3cret", Some("s3cret")).await, StatusCode::OK);
        assert_eq!(
            status_with_header("s3cret", Some("Bearer s3cret")).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_rejects_missing_or_wrong_key() {
        assert_eq!(status_with_header("s3cret", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_with_header("s3cret", Some("guess")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_fails_closed_without_configured_keys() {
        assert_eq!(status_with_header("", Some("")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_with_header("", Some("Bearer anything")).await,
            StatusCode::UNAUTHORIZED
        );
    }
}
