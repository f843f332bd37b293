//! Membership entity - a user's relationship to a circle

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Invitations granted to the creator of a circle
pub const CREATOR_INVITATIONS: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub circle_id: Snowflake,
    pub is_admin: bool,
    pub used_invitations: i32,
    pub remaining_invitations: i32,
    /// Member whose invitation code admitted this user
    pub invited_by: Option<Snowflake>,
    pub rides_taken: i32,
    pub rides_offered: i32,
    /// Soft-delete flag; rows are never removed
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(id: Snowflake, user_id: Snowflake, circle_id: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            circle_id,
            is_admin: false,
            used_invitations: 0,
            remaining_invitations: 0,
            invited_by: None,
            rides_taken: 0,
            rides_offered: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Admin membership handed to whoever creates the circle
    pub fn founder(id: Snowflake, user_id: Snowflake, circle_id: Snowflake) -> Self {
        Self {
            is_admin: true,
            remaining_invitations: CREATOR_INVITATIONS,
            ..Self::new(id, user_id, circle_id)
        }
    }

    pub fn invited(
        id: Snowflake,
        user_id: Snowflake,
        circle_id: Snowflake,
        invited_by: Snowflake,
    ) -> Self {
        Self {
            invited_by: Some(invited_by),
            ..Self::new(id, user_id, circle_id)
        }
    }

    /// Revive an inactive row for a member coming back through `invitation`.
    ///
    /// Ride counters and past invitation usage carry over; admin rights and the
    /// remaining quota come from the fresh invited row. The SQL upsert in
    /// `PgMembershipRepository::redeem_invitation` sets the same columns.
    pub fn rejoin(&mut self, invitation: &Membership) {
        self.is_active = true;
        self.is_admin = invitation.is_admin;
        self.remaining_invitations = invitation.remaining_invitations;
        self.invited_by = invitation.invited_by;
        self.updated_at = Utc::now();
    }

    #[inline]
    pub fn is_active_admin(&self) -> bool {
        self.is_active && self.is_admin
    }
}
