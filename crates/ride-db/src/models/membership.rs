//! Membership database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct MembershipModel {
    pub id: i64,
    pub user_id: i64,
    pub circle_id: i64,
    pub is_admin: bool,
    pub used_invitations: i32,
    pub remaining_invitations: i32,
    pub invited_by: Option<i64>,
    pub rides_taken: i32,
    pub rides_offered: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership joined with its user and profile.
///
/// User and profile columns are prefixed (`u_`, `p_`) to keep names unique.
#[derive(Debug, Clone, FromRow)]
pub struct CircleMemberModel {
    #[sqlx(flatten)]
    pub membership: MembershipModel,
    pub u_email: String,
    pub u_username: String,
    pub u_first_name: String,
    pub u_last_name: String,
    pub u_phone_number: Option<String>,
    pub u_is_client: bool,
    pub u_is_verified: bool,
    pub u_is_staff: bool,
    pub u_created_at: DateTime<Utc>,
    pub u_updated_at: DateTime<Utc>,
    pub p_picture: Option<String>,
    pub p_biography: String,
    pub p_rides_taken: i32,
    pub p_rides_offered: i32,
    pub p_reputation: f64,
    pub p_updated_at: DateTime<Utc>,
}
