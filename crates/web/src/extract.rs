use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::WebError;

/// `Json` whose rejections are reported as JSON `WebError` bodies
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(WebError))]
pub struct ApiJson<T>(pub T);

/// JSON body that may be left out entirely.
///
/// An empty (or whitespace-only) body yields `None`. Anything else must parse,
/// otherwise the request is rejected.
#[derive(Debug)]
pub struct OptionalJson<T>(pub Option<T>);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| WebError::BadRequest(rejection.body_text()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }

        serde_json::from_slice(&body)
            .map(|value| Self(Some(value)))
            .map_err(|e| WebError::BadRequest(format!("Failed to parse the request body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use storage::dto::rating::ApplyRatingsRequest;

    use super::*;

    async fn extract(body: &'static str) -> Result<Option<ApplyRatingsRequest>, WebError> {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap();

        OptionalJson::<ApplyRatingsRequest>::from_request(request, &())
            .await
            .map(|OptionalJson(value)| value)
    }

    #[tokio::test]
    async fn test_empty_body_is_none() {
        assert!(extract("").await.unwrap().is_none());
        assert!(extract("  \n").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_body_is_parsed_when_present() {
        let request = extract(r#"{"special_runner_id": 4}"#).await.unwrap().unwrap();
        assert_eq!(request.special_runner(), Some(4));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_rejected() {
        assert!(matches!(
            extract(r#"{"special_runner_id":"#).await,
            Err(WebError::BadRequest(_))
        ));
        assert!(matches!(
            extract(r#"{"special_runner_id": "4"}"#).await,
            Err(WebError::BadRequest(_))
        ));
    }
}
