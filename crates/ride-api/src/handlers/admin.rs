//! Staff-only endpoints
//!
//! Bulk circle verification and the daily rides CSV export.

use axum::{
    extract::{Query, State},
    Json,
};
use ride_service::dto::{CircleSlugsRequest, ExportRidesQuery, VerifiedCirclesResponse};
use ride_service::{AdminService, CircleService};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{ApiError, ApiResult, CsvAttachment};
use crate::state::AppState;

/// POST /admin/circles/verify
pub async fn verify_circles(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CircleSlugsRequest>,
) -> ApiResult<Json<VerifiedCirclesResponse>> {
    let service = CircleService::new(state.service_context());
    let response = service
        .set_verified(auth.user_id, &request.slugs, true)
        .await?;
    Ok(Json(response))
}

/// POST /admin/circles/unverify
pub async fn unverify_circles(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CircleSlugsRequest>,
) -> ApiResult<Json<VerifiedCirclesResponse>> {
    let service = CircleService::new(state.service_context());
    let response = service
        .set_verified(auth.user_id, &request.slugs, false)
        .await?;
    Ok(Json(response))
}

/// Rides departing on the given UTC day as a CSV download
///
/// GET /admin/rides/export?date=YYYY-MM-DD
pub async fn export_rides(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ExportRidesQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<CsvAttachment> {
    let Query(query) = query.map_err(|e| ApiError::invalid_query(e.body_text()))?;

    let service = AdminService::new(state.service_context());
    let body = service.export_rides_csv(auth.user_id, query.date).await?;

    Ok(CsvAttachment {
        filename: format!("rides-{}.csv", query.date.format("%Y-%m-%d")),
        body,
    })
}
