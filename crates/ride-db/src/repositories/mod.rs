//! PostgreSQL repository implementations

mod circle;
mod error;
mod invitation;
mod membership;
mod ride;
mod user;

pub use circle::PgCircleRepository;
pub use invitation::PgInvitationRepository;
pub use membership::PgMembershipRepository;
pub use ride::{PgRatingRepository, PgRideRepository};
pub use user::PgUserRepository;
