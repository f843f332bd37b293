//! # ride-core
//!
//! Domain layer for the ride-sharing backend: users, circles, memberships,
//! invitations and rides, the rules that govern them, and the repository
//! traits the infrastructure crates implement.
//! This crate has no dependency on the database or the web framework.

pub mod entities;
pub mod error;
pub mod rules;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Circle, Invitation, Membership, NewRide, Profile, Rating, Ride, User};
pub use error::DomainError;
pub use traits::{
    CircleMember, CircleOrdering, CircleQuery, CircleRepository, CircleSortField,
    InvitationRedemption, InvitationRepository, MembershipRepository, RatingRepository,
    RepoResult, RideRepository, UserRepository,
};
pub use value_objects::{InvitationCode, Snowflake, SnowflakeGenerator, SnowflakeParseError};
