//! Circle / Invitation <- model mappers

use ride_core::entities::{Circle, Invitation};
use ride_core::value_objects::Snowflake;

use crate::models::{CircleModel, InvitationModel};

impl From<CircleModel> for Circle {
    fn from(model: CircleModel) -> Self {
        Circle {
            id: Snowflake::new(model.id),
            name: model.name,
            slug_name: model.slug_name,
            about: model.about,
            picture: model.picture,
            rides_offered: model.rides_offered,
            rides_taken: model.rides_taken,
            is_verified: model.is_verified,
            is_public: model.is_public,
            is_limited: model.is_limited,
            members_limit: model.members_limit,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<InvitationModel> for Invitation {
    fn from(model: InvitationModel) -> Self {
        Invitation {
            id: Snowflake::new(model.id),
            code: model.code,
            issued_by: Snowflake::new(model.issued_by),
            used_by: model.used_by.map(Snowflake::new),
            circle_id: Snowflake::new(model.circle_id),
            used: model.used,
            used_at: model.used_at,
            created_at: model.created_at,
        }
    }
}
