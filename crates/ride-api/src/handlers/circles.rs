//! Circle handlers

use axum::{extract::State, Json};
use ride_service::dto::{
    CircleResponse, CreateCircleRequest, ListCirclesQuery, PageResponse, UpdateCircleRequest,
};
use ride_service::CircleService;

use crate::extractors::{ApiPath, AuthUser, CirclePath, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Public circles, filtered and ordered by the query string
///
/// GET /circles
pub async fn list_circles(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<ListCirclesQuery>,
) -> ApiResult<Json<PageResponse<CircleResponse>>> {
    let service = CircleService::new(state.service_context());
    let response = service.list(query.into_query()?).await?;
    Ok(Json(response))
}

/// Create a circle; the caller becomes its admin
///
/// POST /circles
pub async fn create_circle(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateCircleRequest>,
) -> ApiResult<Created<Json<CircleResponse>>> {
    let service = CircleService::new(state.service_context());
    let response = service.create(auth.user_id, request).await?;
    Ok(Created(Json(response)))
}

/// GET /circles/{slug_name}
pub async fn get_circle(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(path): ApiPath<CirclePath>,
) -> ApiResult<Json<CircleResponse>> {
    let service = CircleService::new(state.service_context());
    let response = service.get(&path.slug_name).await?;
    Ok(Json(response))
}

/// PATCH /circles/{slug_name}
pub async fn update_circle(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<CirclePath>,
    ValidatedJson(request): ValidatedJson<UpdateCircleRequest>,
) -> ApiResult<Json<CircleResponse>> {
    let service = CircleService::new(state.service_context());
    let response = service
        .update(auth.user_id, &path.slug_name, request)
        .await?;
    Ok(Json(response))
}
