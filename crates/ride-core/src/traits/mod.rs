//! Ports implemented by the infrastructure crates

mod repositories;

pub use repositories::{
    CircleMember, CircleOrdering, CircleQuery, CircleRepository, CircleSortField,
    InvitationRedemption, InvitationRepository, MembershipRepository, RatingRepository,
    RepoResult, RideRepository, UserRepository,
};
