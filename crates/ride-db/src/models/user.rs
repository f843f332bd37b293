//! User and profile database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub is_client: bool,
    pub is_verified: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `profiles` table
#[derive(Debug, Clone, FromRow)]
pub struct ProfileModel {
    pub user_id: i64,
    pub picture: Option<String>,
    pub biography: String,
    pub rides_taken: i32,
    pub rides_offered: i32,
    pub reputation: f64,
    pub updated_at: DateTime<Utc>,
}
