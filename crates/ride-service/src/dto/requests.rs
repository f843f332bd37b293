//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! Cross-field and storage-dependent checks live in the services.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use ride_core::entities::{is_valid_phone_number, is_valid_slug, is_valid_username, PHONE_NUMBER_MESSAGE};
use ride_core::traits::{CircleOrdering, CircleQuery};
use ride_core::Snowflake;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::services::{ServiceError, ServiceResult};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

fn validate_username(value: &str) -> Result<(), ValidationError> {
    if is_valid_username(value) {
        Ok(())
    } else {
        Err(ValidationError::new("username").with_message(Cow::Borrowed(
            "Username must be 4-20 characters: letters, digits and . _ - only.",
        )))
    }
}

fn validate_phone_number(value: &str) -> Result<(), ValidationError> {
    if is_valid_phone_number(value) {
        Ok(())
    } else {
        Err(ValidationError::new("phone_number").with_message(Cow::Borrowed(PHONE_NUMBER_MESSAGE)))
    }
}

fn validate_slug(value: &str) -> Result<(), ValidationError> {
    if is_valid_slug(value) {
        Ok(())
    } else {
        Err(ValidationError::new("slug_name").with_message(Cow::Borrowed(
            "Slug name may only contain lowercase letters, digits, '-' and '_' (max 40)",
        )))
    }
}

// ============================================================================
// User Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: String,

    #[validate(length(min = 6, max = 64, message = "Password must be 6-64 characters"))]
    pub password: String,

    #[validate(length(min = 6, max = 64, message = "Password must be 6-64 characters"))]
    pub password_confirmation: String,

    #[validate(length(min = 2, max = 30, message = "First name must be 2-30 characters"))]
    pub first_name: String,

    #[validate(length(min = 2, max = 30, message = "Last name must be 2-30 characters"))]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(length(min = 6, max = 64, message = "Password must be 6-64 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyAccountRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub token: String,
}

/// Partial update of the account fields; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 30, message = "First name must be 2-30 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 2, max = 30, message = "Last name must be 2-30 characters"))]
    pub last_name: Option<String>,

    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(url(message = "Enter a valid URL."))]
    pub picture: Option<String>,

    #[validate(length(max = 500, message = "Biography must be at most 500 characters"))]
    pub biography: Option<String>,
}

// ============================================================================
// Circle Requests
// ============================================================================

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCircleRequest {
    #[validate(length(min = 1, max = 140, message = "Name must be 1-140 characters"))]
    pub name: String,

    #[validate(custom(function = "validate_slug"))]
    pub slug_name: String,

    #[validate(length(max = 255, message = "About must be at most 255 characters"))]
    #[serde(default)]
    pub about: String,

    #[validate(url(message = "Enter a valid URL."))]
    pub picture: Option<String>,

    #[serde(default = "default_true")]
    pub is_public: bool,

    #[serde(default)]
    pub is_limited: bool,

    #[validate(range(min = 0, message = "Member limit cannot be negative"))]
    #[serde(default)]
    pub members_limit: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCircleRequest {
    #[validate(length(min = 1, max = 140, message = "Name must be 1-140 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 255, message = "About must be at most 255 characters"))]
    pub about: Option<String>,

    #[validate(url(message = "Enter a valid URL."))]
    pub picture: Option<String>,

    pub is_public: Option<bool>,

    pub is_limited: Option<bool>,

    #[validate(range(min = 0, message = "Member limit cannot be negative"))]
    pub members_limit: Option<i32>,
}

/// Query string accepted by the circle listing
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListCirclesQuery {
    pub search: Option<String>,
    pub is_verified: Option<bool>,
    pub is_limited: Option<bool>,
    /// `rides_offered`, `rides_taken`, `name`, `created` or `members_limit`, optionally `-` prefixed
    pub ordering: Option<String>,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "Offset cannot be negative"))]
    pub offset: Option<i64>,
}

impl ListCirclesQuery {
    pub fn into_query(self) -> ServiceResult<CircleQuery> {
        let ordering = match self.ordering.as_deref().map(str::trim) {
            None | Some("") => CircleOrdering::default(),
            Some(raw) => CircleOrdering::parse(raw)
                .ok_or_else(|| ServiceError::validation(format!("Unknown ordering field: {raw}")))?,
        };

        Ok(CircleQuery {
            search: self.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            is_verified: self.is_verified,
            is_limited: self.is_limited,
            ordering,
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.unwrap_or(0).max(0),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JoinCircleRequest {
    #[validate(length(min = 1, max = 10, message = "Invitation code must be at most 10 characters"))]
    pub invitation_code: String,
}

// ============================================================================
// Ride Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRideRequest {
    /// Must match the caller when present
    pub offered_by: Option<Snowflake>,

    #[validate(range(min = 1, max = 15, message = "Available seats must be between 1 and 15."))]
    pub available_seats: i32,

    #[validate(length(max = 255, message = "Comments must be at most 255 characters"))]
    #[serde(default)]
    pub comments: String,

    #[validate(length(min = 1, max = 255, message = "Location must be 1-255 characters"))]
    pub departure_location: String,

    pub departure_date: DateTime<Utc>,

    #[validate(length(min = 1, max = 255, message = "Location must be 1-255 characters"))]
    pub arrival_location: String,

    pub arrival_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRideRequest {
    #[validate(range(min = 1, max = 15, message = "Available seats must be between 1 and 15."))]
    pub available_seats: Option<i32>,

    #[validate(length(max = 255, message = "Comments must be at most 255 characters"))]
    pub comments: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Location must be 1-255 characters"))]
    pub departure_location: Option<String>,

    pub departure_date: Option<DateTime<Utc>>,

    #[validate(length(min = 1, max = 255, message = "Location must be 1-255 characters"))]
    pub arrival_location: Option<String>,

    pub arrival_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateRideRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i32,

    #[validate(length(max = 255, message = "Comments must be at most 255 characters"))]
    #[serde(default)]
    pub comments: String,
}

// ============================================================================
// Admin Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CircleSlugsRequest {
    #[validate(length(min = 1, max = 100, message = "Provide between 1 and 100 slugs"))]
    pub slugs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportRidesQuery {
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupRequest {
        SignupRequest {
            email: "rider@example.com".to_string(),
            username: "rider_01".to_string(),
            phone_number: "+5215512345678".to_string(),
            password: "long-enough".to_string(),
            password_confirmation: "long-enough".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Perez".to_string(),
        }
    }

    #[test]
    fn test_signup_request_validation() {
        assert!(signup().validate().is_ok());

        let bad_email = SignupRequest {
            email: "not-an-email".to_string(),
            ..signup()
        };
        assert!(bad_email.validate().is_err());

        let short_username = SignupRequest {
            username: "abc".to_string(),
            ..signup()
        };
        assert!(short_username.validate().is_err());

        let bad_phone = SignupRequest {
            phone_number: "12ab".to_string(),
            ..signup()
        };
        let errors = bad_phone.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone_number"));
    }

    #[test]
    fn test_update_user_allows_empty_body() {
        assert!(UpdateUserRequest::default().validate().is_ok());

        let bad = UpdateUserRequest {
            first_name: Some("A".to_string()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_create_circle_defaults() {
        let request: CreateCircleRequest =
            serde_json::from_str(r#"{"name": "Campus", "slug_name": "campus"}"#).unwrap();
        assert!(request.is_public);
        assert!(!request.is_limited);
        assert_eq!(request.members_limit, 0);
        assert!(request.validate().is_ok());

        let upper: CreateCircleRequest =
            serde_json::from_str(r#"{"name": "Campus", "slug_name": "Campus"}"#).unwrap();
        assert!(upper.validate().is_err());
    }

    #[test]
    fn test_list_query_ordering() {
        let query = ListCirclesQuery {
            ordering: Some("-rides_taken".to_string()),
            limit: Some(500),
            ..Default::default()
        }
        .into_query()
        .unwrap();
        assert_eq!(query.limit, MAX_PAGE_SIZE);
        assert!(matches!(query.ordering, CircleOrdering::By { descending: true, .. }));

        let unknown = ListCirclesQuery {
            ordering: Some("password".to_string()),
            ..Default::default()
        };
        assert!(unknown.into_query().is_err());

        let defaults = ListCirclesQuery::default().into_query().unwrap();
        assert_eq!(defaults.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(defaults.ordering, CircleOrdering::Popularity);
    }

    #[test]
    fn test_ride_request_bounds() {
        let request: CreateRideRequest = serde_json::from_str(
            r#"{
                "available_seats": 16,
                "departure_location": "Campus",
                "departure_date": "2030-01-01T10:00:00Z",
                "arrival_location": "Downtown",
                "arrival_date": "2030-01-01T11:00:00Z"
            }"#,
        )
        .unwrap();
        assert!(request.offered_by.is_none());
        assert!(request.validate().is_err());

        let rating = RateRideRequest {
            rating: 0,
            comments: String::new(),
        };
        assert!(rating.validate().is_err());
    }

    #[test]
    fn test_export_query_parses_date() {
        let query: ExportRidesQuery = serde_json::from_str(r#"{"date": "2024-06-01"}"#).unwrap();
        assert_eq!(query.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }
}
