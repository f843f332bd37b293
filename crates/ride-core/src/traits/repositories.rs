//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer declares what it needs; `ride-db` implements these on
//! PostgreSQL. Operations that touch several counters at once (offering a
//! ride, joining a ride, redeeming an invitation, rating) are single
//! repository calls so implementations can run them in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Circle, Invitation, Membership, Profile, Rating, Ride, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn username_exists(&self, username: &str) -> RepoResult<bool>;

    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Insert the user together with its profile
    async fn create(&self, user: &User, profile: &Profile, password_hash: &str) -> RepoResult<()>;

    async fn update(&self, user: &User) -> RepoResult<()>;

    /// Mark the account as verified
    async fn set_verified(&self, username: &str) -> RepoResult<()>;

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;

    async fn find_profile(&self, user_id: Snowflake) -> RepoResult<Option<Profile>>;

    /// Update picture and biography (counters are owned by the ride operations)
    async fn update_profile(&self, profile: &Profile) -> RepoResult<()>;
}

// ============================================================================
// Circle Repository
// ============================================================================

/// Sortable circle columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleSortField {
    RidesOffered,
    RidesTaken,
    Name,
    Created,
    MembersLimit,
}

impl CircleSortField {
    pub fn parse(field: &str) -> Option<Self> {
        match field {
            "rides_offered" => Some(Self::RidesOffered),
            "rides_taken" => Some(Self::RidesTaken),
            "name" => Some(Self::Name),
            "created" => Some(Self::Created),
            "members_limit" => Some(Self::MembersLimit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CircleOrdering {
    /// Member count, then rides offered, then rides taken (all descending)
    #[default]
    Popularity,
    By {
        field: CircleSortField,
        descending: bool,
    },
}

impl CircleOrdering {
    /// Parse `name` / `-rides_offered` style ordering parameters
    pub fn parse(raw: &str) -> Option<Self> {
        let (descending, field) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        CircleSortField::parse(field).map(|field| Self::By { field, descending })
    }
}

/// Query parameters for listing public circles
#[derive(Debug, Clone, Default)]
pub struct CircleQuery {
    /// Case-insensitive match against slug_name or name
    pub search: Option<String>,
    pub is_verified: Option<bool>,
    pub is_limited: Option<bool>,
    pub ordering: CircleOrdering,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait CircleRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Circle>>;

    async fn find_by_slug(&self, slug_name: &str) -> RepoResult<Option<Circle>>;

    async fn slug_exists(&self, slug_name: &str) -> RepoResult<bool>;

    /// List public circles only
    async fn list_public(&self, query: &CircleQuery) -> RepoResult<Vec<Circle>>;

    /// Circles where the user holds an active membership
    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Circle>>;

    /// Insert the circle and its founding admin membership
    async fn create_with_founder(&self, circle: &Circle, founder: &Membership) -> RepoResult<()>;

    async fn update(&self, circle: &Circle) -> RepoResult<()>;

    /// Bulk verify/unverify; returns the number of circles changed
    async fn set_verified(&self, slug_names: &[String], verified: bool) -> RepoResult<u64>;
}

// ============================================================================
// Membership Repository
// ============================================================================

/// A membership together with the member's account and profile
#[derive(Debug, Clone)]
pub struct CircleMember {
    pub membership: Membership,
    pub user: User,
    pub profile: Profile,
}

/// Everything needed to admit a user through an invitation
#[derive(Debug, Clone)]
pub struct InvitationRedemption {
    /// New membership, or the user's previous inactive one to reactivate
    pub membership: Membership,
    pub invitation_id: Snowflake,
    pub issuer_membership_id: Snowflake,
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Any membership (active or not) of the user in the circle
    async fn find(&self, circle_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<Membership>>;

    async fn find_active_member(
        &self,
        circle_id: Snowflake,
        username: &str,
    ) -> RepoResult<Option<CircleMember>>;

    async fn list_active_members(&self, circle_id: Snowflake) -> RepoResult<Vec<CircleMember>>;

    /// Active members admitted with codes issued by `inviter`
    async fn list_invited_by(
        &self,
        circle_id: Snowflake,
        inviter: Snowflake,
    ) -> RepoResult<Vec<CircleMember>>;

    async fn count_active(&self, circle_id: Snowflake) -> RepoResult<i64>;

    /// Store the membership, consume the invitation and charge the issuer's quota.
    ///
    /// Fails with `InvalidInvitation` if the code was consumed concurrently.
    async fn redeem_invitation(&self, redemption: &InvitationRedemption) -> RepoResult<()>;

    /// Soft delete
    async fn deactivate(&self, membership_id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Invitation Repository
// ============================================================================

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Invitation>>;

    async fn list_unused(&self, circle_id: Snowflake, issued_by: Snowflake)
        -> RepoResult<Vec<Invitation>>;

    async fn create_many(&self, invitations: &[Invitation]) -> RepoResult<()>;
}

// ============================================================================
// Ride Repository
// ============================================================================

#[async_trait]
pub trait RideRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Ride>>;

    /// Active rides with free seats departing after `departs_after`, soonest first
    async fn list_available(
        &self,
        circle_id: Snowflake,
        departs_after: DateTime<Utc>,
    ) -> RepoResult<Vec<Ride>>;

    async fn list_passengers(&self, ride_id: Snowflake) -> RepoResult<Vec<User>>;

    async fn is_passenger(&self, ride_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// Insert the ride and bump rides_offered on circle, membership and profile
    async fn create_offer(&self, ride: &Ride, membership_id: Snowflake) -> RepoResult<()>;

    async fn update(&self, ride: &Ride) -> RepoResult<()>;

    /// Seat the passenger and bump rides_taken on profile, membership and circle.
    ///
    /// Fails with `RideFull` if the last seat was taken concurrently.
    async fn add_passenger(
        &self,
        ride: &Ride,
        user_id: Snowflake,
        membership_id: Snowflake,
    ) -> RepoResult<()>;

    async fn finish(&self, ride_id: Snowflake) -> RepoResult<()>;

    /// Deactivate every active ride whose arrival is at or before `now`
    async fn disable_finished(&self, now: DateTime<Utc>) -> RepoResult<u64>;

    /// Rides departing in `[from, to)`, oldest first
    async fn list_departing_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<Ride>>;
}

// ============================================================================
// Rating Repository
// ============================================================================

#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn exists(&self, ride_id: Snowflake, rating_user: Snowflake) -> RepoResult<bool>;

    /// Store the rating and recompute the ride rating and the offerer's reputation
    async fn create_and_refresh(&self, rating: &Rating) -> RepoResult<()>;
}
