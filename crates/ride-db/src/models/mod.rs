//! Database models - one struct per row shape returned by queries

mod circle;
mod membership;
mod ride;
mod user;

pub use circle::{CircleModel, InvitationModel};
pub use membership::{CircleMemberModel, MembershipModel};
pub use ride::RideModel;
pub use user::{ProfileModel, UserModel};
