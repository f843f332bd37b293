//! Circle and invitation database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct CircleModel {
    pub id: i64,
    pub name: String,
    pub slug_name: String,
    pub about: String,
    pub picture: Option<String>,
    pub rides_offered: i32,
    pub rides_taken: i32,
    pub is_verified: bool,
    pub is_public: bool,
    pub is_limited: bool,
    pub members_limit: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct InvitationModel {
    pub id: i64,
    pub code: String,
    pub issued_by: i64,
    pub used_by: Option<i64>,
    pub circle_id: i64,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
