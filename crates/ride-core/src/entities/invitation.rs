//! Invitation entity

use chrono::{DateTime, Utc};

use crate::value_objects::{InvitationCode, Snowflake};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub id: Snowflake,
    pub code: String,
    pub issued_by: Snowflake,
    pub used_by: Option<Snowflake>,
    pub circle_id: Snowflake,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    /// Issue a new invitation with a random code
    pub fn issue(id: Snowflake, issued_by: Snowflake, circle_id: Snowflake) -> Self {
        Self {
            id,
            code: InvitationCode::generate().into_string(),
            issued_by,
            used_by: None,
            circle_id,
            used: false,
            used_at: None,
            created_at: Utc::now(),
        }
    }

    /// Can `circle_id` still be entered with this code
    pub fn is_redeemable_in(&self, circle_id: Snowflake) -> bool {
        !self.used && self.circle_id == circle_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::CODE_LENGTH;

    #[test]
    fn test_issue() {
        let inv = Invitation::issue(Snowflake::new(1), Snowflake::new(2), Snowflake::new(3));
        assert_eq!(inv.code.len(), CODE_LENGTH);
        assert!(!inv.used);
        assert!(inv.used_by.is_none());
        assert!(inv.is_redeemable_in(Snowflake::new(3)));
    }

    #[test]
    fn test_not_redeemable_elsewhere_or_twice() {
        let mut inv = Invitation::issue(Snowflake::new(1), Snowflake::new(2), Snowflake::new(3));
        assert!(!inv.is_redeemable_in(Snowflake::new(4)));

        inv.used = true;
        assert!(!inv.is_redeemable_in(Snowflake::new(3)));
    }
}
