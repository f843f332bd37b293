//! User / Profile <- model mappers

use ride_core::entities::{Profile, User};
use ride_core::value_objects::Snowflake;

use crate::models::{ProfileModel, UserModel};

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            email: model.email,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            phone_number: model.phone_number,
            is_client: model.is_client,
            is_verified: model.is_verified,
            is_staff: model.is_staff,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<ProfileModel> for Profile {
    fn from(model: ProfileModel) -> Self {
        Profile {
            user_id: Snowflake::new(model.user_id),
            picture: model.picture,
            biography: model.biography,
            rides_taken: model.rides_taken,
            rides_offered: model.rides_offered,
            reputation: model.reputation,
            updated_at: model.updated_at,
        }
    }
}
