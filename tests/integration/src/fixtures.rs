//! Test fixtures and data generators

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::helpers::{assert_json, assert_status, TestServer};

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Suffix unique across runs against the same database
pub fn unique_suffix() -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let stamp = Utc::now().timestamp_millis() % 1_000_000_000;
    format!("{stamp}{n}")
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub phone_number: String,
    pub password: String,
    pub password_confirmation: String,
    pub first_name: String,
    pub last_name: String,
}

impl SignupRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            email: format!("rider{suffix}@example.com"),
            username: format!("r{suffix}"),
            phone_number: "+5215512345678".to_string(),
            password: "Carpool-Pass-2024".to_string(),
            password_confirmation: "Carpool-Pass-2024".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Perez".to_string(),
        }
    }

    pub fn login(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct CircleResponse {
    pub id: String,
    pub slug_name: String,
    pub verified: bool,
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct CirclePage {
    pub results: Vec<CircleResponse>,
}

#[derive(Debug, Deserialize)]
pub struct MemberUser {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct MembershipResponse {
    pub user: MemberUser,
    pub is_admin: bool,
    pub remaining_invitations: i32,
    pub used_invitations: i32,
    pub invited_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InvitationsResponse {
    pub used_invitations: Vec<MembershipResponse>,
    pub invitations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RideResponse {
    pub id: String,
    pub offered_by: String,
    pub available_seats: i32,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct RideDetailResponse {
    pub id: String,
    pub passengers: Vec<UserResponse>,
}

/// A verified, logged-in account
#[derive(Debug)]
pub struct Rider {
    pub id: String,
    pub username: String,
    pub token: String,
}

/// Sign up, verify and log in a fresh account
pub async fn register_rider(server: &TestServer) -> Result<Rider> {
    let signup = SignupRequest::unique();
    let response = server.post("/users/signup", &signup).await?;
    assert_status(response, StatusCode::CREATED).await?;

    let token = server.verification_token(&signup.username)?;
    let response = server.post("/users/verify", &json!({ "token": token })).await?;
    assert_status(response, StatusCode::OK).await?;

    let response = server.post("/users/login", &signup.login()).await?;
    let login: LoginResponse = assert_json(response, StatusCode::CREATED).await?;

    Ok(Rider {
        id: login.user.id,
        username: login.user.username,
        token: login.access_token,
    })
}

pub fn circle_request(slug: &str) -> serde_json::Value {
    json!({
        "name": format!("Circle {slug}"),
        "slug_name": slug,
        "about": "Rides between campus and downtown",
    })
}

/// Create a public circle owned by `owner`; returns its slug
pub async fn create_circle(server: &TestServer, owner: &Rider) -> Result<String> {
    let slug = format!("circle-{}", unique_suffix());
    let response = server
        .post_auth("/circles", &owner.token, &circle_request(&slug))
        .await?;
    assert_status(response, StatusCode::CREATED).await?;
    Ok(slug)
}

/// Have `rider` join `slug` with one of `admin`'s invitation codes
pub async fn invite_into(
    server: &TestServer,
    slug: &str,
    admin: &Rider,
    rider: &Rider,
) -> Result<MembershipResponse> {
    let response = server
        .get_auth(
            &format!("/circles/{slug}/members/{}/invitations", admin.username),
            &admin.token,
        )
        .await?;
    let invitations: InvitationsResponse = assert_json(response, StatusCode::OK).await?;
    let code = invitations
        .invitations
        .first()
        .ok_or_else(|| anyhow::anyhow!("no invitation codes left"))?;

    let response = server
        .post_auth(
            &format!("/circles/{slug}/members"),
            &rider.token,
            &json!({ "invitation_code": code }),
        )
        .await?;
    assert_json(response, StatusCode::CREATED).await
}

pub fn ride_request(departure: DateTime<Utc>, seats: i32) -> serde_json::Value {
    json!({
        "available_seats": seats,
        "comments": "Leaving from the main gate",
        "departure_location": "Ciudad Universitaria",
        "departure_date": departure,
        "arrival_location": "Polanco",
        "arrival_date": departure + Duration::hours(1),
    })
}
