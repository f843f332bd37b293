//! User and Profile entities

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::value_objects::Snowflake;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?1?\d{9,15}$").expect("phone pattern is valid"));

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{4,20}$").expect("username pattern is valid"));

pub const PHONE_NUMBER_MESSAGE: &str =
    "Phone number must be entered in the format: +999999999. Up to 15 digits allowed.";

/// Default reputation for a fresh profile
pub const DEFAULT_REPUTATION: f64 = 5.0;

/// Registered account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    /// Clients are the default account type; drivers are the rest
    pub is_client: bool,
    /// Set once the emailed confirmation link is followed
    pub is_verified: bool,
    /// Staff may run the admin bulk actions
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: Snowflake,
        email: String,
        username: String,
        first_name: String,
        last_name: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            username,
            first_name,
            last_name,
            phone_number: None,
            is_client: true,
            is_verified: false,
            is_staff: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_phone_number(mut self, phone_number: Option<String>) -> Self {
        self.phone_number = phone_number;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Apply a partial update of the editable fields
    pub fn apply_update(
        &mut self,
        first_name: Option<String>,
        last_name: Option<String>,
        phone_number: Option<String>,
    ) {
        if let Some(first_name) = first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            self.last_name = last_name;
        }
        if phone_number.is_some() {
            self.phone_number = phone_number;
        }
        self.updated_at = Utc::now();
    }
}

pub fn is_valid_phone_number(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

pub fn is_valid_username(value: &str) -> bool {
    USERNAME_RE.is_match(value)
}

/// Public profile and ride statistics, one per user
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: Snowflake,
    pub picture: Option<String>,
    pub biography: String,
    pub rides_taken: i32,
    pub rides_offered: i32,
    pub reputation: f64,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(user_id: Snowflake) -> Self {
        Self {
            user_id,
            picture: None,
            biography: String::new(),
            rides_taken: 0,
            rides_offered: 0,
            reputation: DEFAULT_REPUTATION,
            updated_at: Utc::now(),
        }
    }
}
