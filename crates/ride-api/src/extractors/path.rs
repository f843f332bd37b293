//! Path parameter extractors
//!
//! Route parameters are deserialized into these structs through
//! [`ApiPath`], so a malformed path yields the API error body rather than
//! axum's plain-text rejection.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use ride_core::Snowflake;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::response::ApiError;

/// `Path` with an [`ApiError`] rejection
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        Ok(ApiPath(inner))
    }
}

/// `/users/:username`
#[derive(Debug, Deserialize)]
pub struct UsernamePath {
    pub username: String,
}

/// `/circles/:slug_name`
#[derive(Debug, Deserialize)]
pub struct CirclePath {
    pub slug_name: String,
}

/// `/circles/:slug_name/members/:username`
#[derive(Debug, Deserialize)]
pub struct MemberPath {
    pub slug_name: String,
    pub username: String,
}

/// `/circles/:slug_name/rides/:ride_id`
#[derive(Debug, Deserialize)]
pub struct CircleRidePath {
    pub slug_name: String,
    pub ride_id: String,
}

impl CircleRidePath {
    pub fn ride_id(&self) -> Result<Snowflake, ApiError> {
        self.ride_id
            .parse()
            .map_err(|_| ApiError::invalid_path("Invalid ride_id format"))
    }
}
