//! Domain entities - core business objects

mod circle;
mod invitation;
mod membership;
mod ride;
mod user;

pub use circle::{
    is_valid_slug, validate_limits, Circle, MAX_MEMBERS_LIMIT, MIN_MEMBERS_LIMIT,
};
pub use invitation::Invitation;
pub use membership::{Membership, CREATOR_INVITATIONS};
pub use ride::{NewRide, Rating, Ride};
pub use user::{
    is_valid_phone_number, is_valid_username, Profile, User, DEFAULT_REPUTATION,
    PHONE_NUMBER_MESSAGE,
};
