//! Membership handlers
//!
//! Membership listing, invitations, joining with a code and leaving.

use axum::{extract::State, Json};
use ride_service::dto::{InvitationsResponse, JoinCircleRequest, MembershipResponse};
use ride_service::MembershipService;

use crate::extractors::{ApiPath, AuthUser, CirclePath, MemberPath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /circles/{slug_name}/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<CirclePath>,
) -> ApiResult<Json<Vec<MembershipResponse>>> {
    let service = MembershipService::new(state.service_context());
    let members = service.list(auth.user_id, &path.slug_name).await?;
    Ok(Json(members))
}

/// Redeem an invitation code
///
/// POST /circles/{slug_name}/members
pub async fn join_circle(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<CirclePath>,
    ValidatedJson(request): ValidatedJson<JoinCircleRequest>,
) -> ApiResult<Created<Json<MembershipResponse>>> {
    let service = MembershipService::new(state.service_context());
    let member = service.join(auth.user_id, &path.slug_name, request).await?;
    Ok(Created(Json(member)))
}

/// GET /circles/{slug_name}/members/{username}
pub async fn get_member(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<MemberPath>,
) -> ApiResult<Json<MembershipResponse>> {
    let service = MembershipService::new(state.service_context());
    let member = service
        .get(auth.user_id, &path.slug_name, &path.username)
        .await?;
    Ok(Json(member))
}

/// Leave a circle, or remove a member as circle admin
///
/// DELETE /circles/{slug_name}/members/{username}
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<MemberPath>,
) -> ApiResult<NoContent> {
    let service = MembershipService::new(state.service_context());
    service
        .remove(auth.user_id, &path.slug_name, &path.username)
        .await?;
    Ok(NoContent)
}

/// The caller's unused invitation codes and who joined with the used ones
///
/// GET /circles/{slug_name}/members/{username}/invitations
pub async fn get_invitations(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<MemberPath>,
) -> ApiResult<Json<InvitationsResponse>> {
    let service = MembershipService::new(state.service_context());
    let response = service
        .invitations(auth.user_id, &path.slug_name, &path.username)
        .await?;
    Ok(Json(response))
}
