//! Circle entity - a group of users sharing rides

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_\-]{1,40}$").expect("slug pattern is valid"));

/// Bounds on `members_limit` for limited circles
pub const MIN_MEMBERS_LIMIT: i32 = 10;
pub const MAX_MEMBERS_LIMIT: i32 = 32_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circle {
    pub id: Snowflake,
    pub name: String,
    pub slug_name: String,
    pub about: String,
    pub picture: Option<String>,
    pub rides_offered: i32,
    pub rides_taken: i32,
    /// Official communities are verified by staff
    pub is_verified: bool,
    /// Public circles are listed to every user
    pub is_public: bool,
    pub is_limited: bool,
    /// Zero unless `is_limited`
    pub members_limit: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Circle {
    pub fn new(id: Snowflake, name: String, slug_name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            slug_name,
            about: String::new(),
            picture: None,
            rides_offered: 0,
            rides_taken: 0,
            is_verified: false,
            is_public: true,
            is_limited: false,
            members_limit: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_about(mut self, about: String) -> Self {
        self.about = about;
        self
    }

    pub fn with_limit(mut self, is_limited: bool, members_limit: i32) -> Self {
        self.is_limited = is_limited;
        self.members_limit = members_limit;
        self
    }

    /// Check the cross-field constraints a circle must satisfy before it is stored
    pub fn validate(&self) -> Result<(), DomainError> {
        if !is_valid_slug(&self.slug_name) {
            return Err(DomainError::Validation(
                "Slug name may only contain lowercase letters, digits, '-' and '_' (max 40)"
                    .to_string(),
            ));
        }
        validate_limits(self.is_limited, self.members_limit)
    }

    /// Whether `active_members` already fills a limited circle
    pub fn is_full(&self, active_members: i64) -> bool {
        self.is_limited && active_members >= i64::from(self.members_limit)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

pub fn is_valid_slug(value: &str) -> bool {
    SLUG_RE.is_match(value)
}

/// `is_limited` and `members_limit` must be set together
pub fn validate_limits(is_limited: bool, members_limit: i32) -> Result<(), DomainError> {
    if is_limited != (members_limit > 0) {
        return Err(DomainError::Validation(
            "If circle is limited, a member limit must be provided".to_string(),
        ));
    }
    if is_limited && !(MIN_MEMBERS_LIMIT..=MAX_MEMBERS_LIMIT).contains(&members_limit) {
        return Err(DomainError::Validation(format!(
            "Member limit must be between {MIN_MEMBERS_LIMIT} and {MAX_MEMBERS_LIMIT}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle() -> Circle {
        Circle::new(Snowflake::new(1), "Universidad".to_string(), "unam-fi".to_string())
    }

    #[test]
    fn test_defaults() {
        let c = circle();
        assert!(c.is_public);
        assert!(!c.is_verified);
        assert!(!c.is_limited);
        assert_eq!(c.members_limit, 0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_limit_requires_both_fields() {
        assert!(circle().with_limit(true, 0).validate().is_err());
        assert!(circle().with_limit(false, 50).validate().is_err());
        assert!(circle().with_limit(true, 50).validate().is_ok());
    }

    #[test]
    fn test_limit_range() {
        assert!(validate_limits(true, 9).is_err());
        assert!(validate_limits(true, 10).is_ok());
        assert!(validate_limits(true, 32_000).is_ok());
        assert!(validate_limits(true, 32_001).is_err());
    }

    #[test]
    fn test_slug_shape() {
        assert!(is_valid_slug("platzi_devs-2"));
        assert!(!is_valid_slug("Platzi"));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_is_full() {
        let open = circle();
        assert!(!open.is_full(1_000));

        let limited = circle().with_limit(true, 10);
        assert!(!limited.is_full(9));
        assert!(limited.is_full(10));
    }
}
