//! User handlers
//!
//! Signup, login and email verification are public; the rest need a bearer
//! token.

use axum::{extract::State, Json};
use ride_service::dto::{
    LoginRequest, LoginResponse, MessageResponse, SignupRequest, UpdateProfileRequest,
    UpdateUserRequest, UserDetailResponse, UserResponse, UserWithProfileResponse,
    VerifyAccountRequest,
};
use ride_service::UserService;

use crate::extractors::{ApiPath, AuthUser, UsernamePath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Create an account and queue its confirmation email
///
/// POST /users/signup
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> ApiResult<Created<Json<UserResponse>>> {
    let service = UserService::new(state.service_context());
    let response = service.signup(request).await?;
    Ok(Created(Json(response)))
}

/// Exchange credentials for an access token
///
/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Created<Json<LoginResponse>>> {
    let service = UserService::new(state.service_context());
    let response = service.login(request).await?;
    Ok(Created(Json(response)))
}

/// Activate an account with the emailed token
///
/// POST /users/verify
pub async fn verify(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<VerifyAccountRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.verify(request).await?;
    Ok(Json(response))
}

/// GET /users/{username}
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(path): ApiPath<UsernamePath>,
) -> ApiResult<Json<UserDetailResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.get_user(&path.username).await?;
    Ok(Json(response))
}

/// PATCH /users/{username}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<UsernamePath>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<UserWithProfileResponse>> {
    let service = UserService::new(state.service_context());
    let response = service
        .update_user(auth.user_id, &path.username, request)
        .await?;
    Ok(Json(response))
}

/// PATCH /users/{username}/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<UsernamePath>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserWithProfileResponse>> {
    let service = UserService::new(state.service_context());
    let response = service
        .update_profile(auth.user_id, &path.username, request)
        .await?;
    Ok(Json(response))
}
