//! Validated JSON and query extractors
//!
//! Deserialize the request input and run its `validator` rules before the
//! handler sees it.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::response::ApiError;

/// JSON body that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| match e {
                JsonRejection::JsonDataError(e) => ApiError::invalid_body(e.body_text()),
                JsonRejection::JsonSyntaxError(e) => ApiError::invalid_body(e.body_text()),
                JsonRejection::MissingJsonContentType(e) => ApiError::invalid_body(e.body_text()),
                JsonRejection::BytesRejection(e) => ApiError::invalid_body(e.body_text()),
                _ => ApiError::invalid_body("Invalid JSON body"),
            })?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Query string that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        value.validate()?;

        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{self, header::CONTENT_TYPE};
    use ride_service::dto::{JoinCircleRequest, ListCirclesQuery};

    fn json_request(body: &str) -> Request {
        http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let ValidatedJson(request) = ValidatedJson::<JoinCircleRequest>::from_request(
            json_request(r#"{"invitation_code": "ABCDEF1234"}"#),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(request.invitation_code, "ABCDEF1234");
    }

    #[tokio::test]
    async fn test_rules_are_enforced() {
        let err = ValidatedJson::<JoinCircleRequest>::from_request(
            json_request(r#"{"invitation_code": "much-too-long-code"}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let err = ValidatedJson::<JoinCircleRequest>::from_request(json_request("{"), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_query_limit_is_validated() {
        let (mut parts, ()) = http::Request::builder()
            .uri("/circles?limit=500")
            .body(())
            .unwrap()
            .into_parts();

        let err = ValidatedQuery::<ListCirclesQuery>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
