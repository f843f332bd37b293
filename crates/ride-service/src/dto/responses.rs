//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Offset-paginated list
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub results: Vec<T>,
    pub limit: i64,
    pub offset: i64,
}

// ============================================================================
// User Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub is_verified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub picture: Option<String>,
    pub biography: String,
    pub rides_taken: i32,
    pub rides_offered: i32,
    pub reputation: f64,
}

/// User fields plus the nested profile
#[derive(Debug, Clone, Serialize)]
pub struct UserWithProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub profile: ProfileResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetailResponse {
    pub user: UserWithProfileResponse,
    pub circles: Vec<CircleResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

// ============================================================================
// Circle Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CircleResponse {
    pub id: String,
    pub name: String,
    pub slug_name: String,
    pub about: String,
    pub picture: Option<String>,
    pub rides_offered: i32,
    pub rides_taken: i32,
    pub verified: bool,
    pub is_public: bool,
    pub is_limited: bool,
    pub members_limit: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MembershipResponse {
    pub user: UserWithProfileResponse,
    pub is_admin: bool,
    pub is_active: bool,
    pub used_invitations: i32,
    pub remaining_invitations: i32,
    /// Id of the member whose code was redeemed
    pub invited_by: Option<String>,
    pub rides_taken: i32,
    pub rides_offered: i32,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvitationsResponse {
    pub used_invitations: Vec<MembershipResponse>,
    pub invitations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifiedCirclesResponse {
    pub updated: u64,
    pub is_verified: bool,
}

// ============================================================================
// Ride Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RideResponse {
    pub id: String,
    pub offered_by: String,
    pub offered_in: String,
    pub available_seats: i32,
    pub comments: String,
    pub departure_location: String,
    pub departure_date: DateTime<Utc>,
    pub arrival_location: String,
    pub arrival_date: DateTime<Utc>,
    pub rating: Option<f64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RideDetailResponse {
    #[serde(flatten)]
    pub ride: RideResponse,
    pub passengers: Vec<UserResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingResponse {
    pub id: String,
    pub ride: String,
    pub rated_user: String,
    pub rating: i32,
    pub comments: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Health Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: bool,
    pub redis: bool,
}

impl ReadinessResponse {
    pub fn new(database: bool, redis: bool) -> Self {
        let status = if database && redis { "ready" } else { "degraded" };
        Self {
            status: status.to_string(),
            checks: HealthChecks { database, redis },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.checks.database && self.checks.redis
    }
}
