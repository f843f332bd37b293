//! Ride handlers

use axum::{extract::State, Json};
use ride_service::dto::{
    CreateRideRequest, RateRideRequest, RatingResponse, RideDetailResponse, RideResponse,
    UpdateRideRequest,
};
use ride_service::RideService;

use crate::extractors::{ApiPath, AuthUser, CirclePath, CircleRidePath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Rides with free seats departing after the join window
///
/// GET /circles/{slug_name}/rides
pub async fn list_rides(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<CirclePath>,
) -> ApiResult<Json<Vec<RideResponse>>> {
    let service = RideService::new(state.service_context());
    let rides = service.list(auth.user_id, &path.slug_name).await?;
    Ok(Json(rides))
}

/// POST /circles/{slug_name}/rides
pub async fn create_ride(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<CirclePath>,
    ValidatedJson(request): ValidatedJson<CreateRideRequest>,
) -> ApiResult<Created<Json<RideResponse>>> {
    let service = RideService::new(state.service_context());
    let ride = service
        .create(auth.user_id, &path.slug_name, request)
        .await?;
    Ok(Created(Json(ride)))
}

/// Ride with its passengers
///
/// GET /circles/{slug_name}/rides/{ride_id}
pub async fn get_ride(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<CircleRidePath>,
) -> ApiResult<Json<RideDetailResponse>> {
    let ride_id = path.ride_id()?;

    let service = RideService::new(state.service_context());
    let ride = service.get(auth.user_id, &path.slug_name, ride_id).await?;
    Ok(Json(ride))
}

/// PATCH /circles/{slug_name}/rides/{ride_id}
pub async fn update_ride(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<CircleRidePath>,
    ValidatedJson(request): ValidatedJson<UpdateRideRequest>,
) -> ApiResult<Json<RideResponse>> {
    let ride_id = path.ride_id()?;

    let service = RideService::new(state.service_context());
    let ride = service
        .update(auth.user_id, &path.slug_name, ride_id, request)
        .await?;
    Ok(Json(ride))
}

/// POST /circles/{slug_name}/rides/{ride_id}/join
pub async fn join_ride(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<CircleRidePath>,
) -> ApiResult<Json<RideResponse>> {
    let ride_id = path.ride_id()?;

    let service = RideService::new(state.service_context());
    let ride = service.join(auth.user_id, &path.slug_name, ride_id).await?;
    Ok(Json(ride))
}

/// POST /circles/{slug_name}/rides/{ride_id}/finish
pub async fn finish_ride(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<CircleRidePath>,
) -> ApiResult<Json<RideResponse>> {
    let ride_id = path.ride_id()?;

    let service = RideService::new(state.service_context());
    let ride = service.finish(auth.user_id, &path.slug_name, ride_id).await?;
    Ok(Json(ride))
}

/// Rate a finished ride as a passenger
///
/// POST /circles/{slug_name}/rides/{ride_id}/rate
pub async fn rate_ride(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<CircleRidePath>,
    ValidatedJson(request): ValidatedJson<RateRideRequest>,
) -> ApiResult<Created<Json<RatingResponse>>> {
    let ride_id = path.ride_id()?;

    let service = RideService::new(state.service_context());
    let rating = service
        .rate(auth.user_id, &path.slug_name, ride_id, request)
        .await?;
    Ok(Created(Json(rating)))
}
