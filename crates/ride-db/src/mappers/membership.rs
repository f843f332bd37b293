//! Membership <- model mappers

use ride_core::entities::{Membership, Profile, User};
use ride_core::traits::CircleMember;
use ride_core::value_objects::Snowflake;

use crate::models::{CircleMemberModel, MembershipModel};

impl From<MembershipModel> for Membership {
    fn from(model: MembershipModel) -> Self {
        Membership {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            circle_id: Snowflake::new(model.circle_id),
            is_admin: model.is_admin,
            used_invitations: model.used_invitations,
            remaining_invitations: model.remaining_invitations,
            invited_by: model.invited_by.map(Snowflake::new),
            rides_taken: model.rides_taken,
            rides_offered: model.rides_offered,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<CircleMemberModel> for CircleMember {
    fn from(model: CircleMemberModel) -> Self {
        let user_id = Snowflake::new(model.membership.user_id);
        CircleMember {
            user: User {
                id: user_id,
                email: model.u_email,
                username: model.u_username,
                first_name: model.u_first_name,
                last_name: model.u_last_name,
                phone_number: model.u_phone_number,
                is_client: model.u_is_client,
                is_verified: model.u_is_verified,
                is_staff: model.u_is_staff,
                created_at: model.u_created_at,
                updated_at: model.u_updated_at,
            },
            profile: Profile {
                user_id,
                picture: model.p_picture,
                biography: model.p_biography,
                rides_taken: model.p_rides_taken,
                rides_offered: model.p_rides_offered,
                reputation: model.p_reputation,
                updated_at: model.p_updated_at,
            },
            membership: model.membership.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn membership_model() -> MembershipModel {
        MembershipModel {
            id: 10,
            user_id: 20,
            circle_id: 30,
            is_admin: true,
            used_invitations: 2,
            remaining_invitations: 8,
            invited_by: None,
            rides_taken: 1,
            rides_offered: 3,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_membership_from_model() {
        let m = Membership::from(membership_model());
        assert_eq!(m.id, Snowflake::new(10));
        assert_eq!(m.user_id, Snowflake::new(20));
        assert_eq!(m.remaining_invitations, 8);
        assert!(m.is_active_admin());
    }

    #[test]
    fn test_circle_member_from_model() {
        let now = Utc::now();
        let member = CircleMember::from(CircleMemberModel {
            membership: membership_model(),
            u_email: "ana@example.com".to_string(),
            u_username: "ana.rides".to_string(),
            u_first_name: "Ana".to_string(),
            u_last_name: "Lopez".to_string(),
            u_phone_number: None,
            u_is_client: true,
            u_is_verified: true,
            u_is_staff: false,
            u_created_at: now,
            u_updated_at: now,
            p_picture: None,
            p_biography: String::new(),
            p_rides_taken: 4,
            p_rides_offered: 5,
            p_reputation: 4.5,
            p_updated_at: now,
        });
        assert_eq!(member.user.id, Snowflake::new(20));
        assert_eq!(member.profile.user_id, member.user.id);
        assert_eq!(member.user.username, "ana.rides");
        assert_eq!(member.profile.rides_offered, 5);
    }
}
