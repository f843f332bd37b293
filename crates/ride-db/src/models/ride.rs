//! Ride database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct RideModel {
    pub id: i64,
    pub offered_by: i64,
    pub offered_in: i64,
    pub available_seats: i32,
    pub comments: String,
    pub departure_location: String,
    pub departure_date: DateTime<Utc>,
    pub arrival_location: String,
    pub arrival_date: DateTime<Utc>,
    pub rating: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
