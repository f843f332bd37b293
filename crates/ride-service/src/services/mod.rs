//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] for the duration of a
//! request and orchestrates domain rules over the repositories.

pub mod access;
pub mod admin;
pub mod circle;
pub mod context;
pub mod email;
pub mod error;
pub mod housekeeping;
pub mod membership;
pub mod ride;
pub mod user;

/// In-memory repositories for tests, here and in downstream crates
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use access::AccessService;
pub use admin::{AdminService, RIDES_CSV_HEADER};
pub use circle::CircleService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use email::{confirmation_email, OutgoingEmail};
pub use error::{ServiceError, ServiceResult};
pub use housekeeping::disable_finished_rides;
pub use membership::MembershipService;
pub use ride::RideService;
pub use user::UserService;
