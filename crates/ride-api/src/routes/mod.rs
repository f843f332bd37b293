//! Route definitions
//!
//! API routes are mounted under `/api/v1`; health probes are kept apart so
//! they skip the rate limiter.

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{admin, circles, health, members, rides, users};
use crate::state::AppState;

/// Versioned API router
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(circle_routes())
        .merge(ride_routes())
        .merge(admin_routes())
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(users::signup))
        .route("/users/login", post(users::login))
        .route("/users/verify", post(users::verify))
        .route(
            "/users/:username",
            get(users::get_user).patch(users::update_user),
        )
        .route("/users/:username/profile", patch(users::update_profile))
}

fn circle_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/circles",
            get(circles::list_circles).post(circles::create_circle),
        )
        .route(
            "/circles/:slug_name",
            get(circles::get_circle).patch(circles::update_circle),
        )
        // Memberships
        .route(
            "/circles/:slug_name/members",
            get(members::list_members).post(members::join_circle),
        )
        .route(
            "/circles/:slug_name/members/:username",
            get(members::get_member).delete(members::remove_member),
        )
        .route(
            "/circles/:slug_name/members/:username/invitations",
            get(members::get_invitations),
        )
}

fn ride_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/circles/:slug_name/rides",
            get(rides::list_rides).post(rides::create_ride),
        )
        .route(
            "/circles/:slug_name/rides/:ride_id",
            get(rides::get_ride).patch(rides::update_ride),
        )
        .route("/circles/:slug_name/rides/:ride_id/join", post(rides::join_ride))
        .route(
            "/circles/:slug_name/rides/:ride_id/finish",
            post(rides::finish_ride),
        )
        .route("/circles/:slug_name/rides/:ride_id/rate", post(rides::rate_ride))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/circles/verify", post(admin::verify_circles))
        .route("/admin/circles/unverify", post(admin::unverify_circles))
        .route("/admin/rides/export", get(admin::export_rides))
}
