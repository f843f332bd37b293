//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use ride_core::entities::{Circle, Profile, Rating, Ride, User};
use ride_core::traits::CircleMember;

use super::responses::{
    CircleResponse, MembershipResponse, ProfileResponse, RatingResponse, RideDetailResponse,
    RideResponse, UserResponse, UserWithProfileResponse,
};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            is_verified: user.is_verified,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            picture: profile.picture.clone(),
            biography: profile.biography.clone(),
            rides_taken: profile.rides_taken,
            rides_offered: profile.rides_offered,
            reputation: profile.reputation,
        }
    }
}

impl UserWithProfileResponse {
    pub fn new(user: &User, profile: &Profile) -> Self {
        Self {
            user: UserResponse::from(user),
            profile: ProfileResponse::from(profile),
        }
    }
}

// ============================================================================
// Circle Mappers
// ============================================================================

impl From<&Circle> for CircleResponse {
    fn from(circle: &Circle) -> Self {
        Self {
            id: circle.id.to_string(),
            name: circle.name.clone(),
            slug_name: circle.slug_name.clone(),
            about: circle.about.clone(),
            picture: circle.picture.clone(),
            rides_offered: circle.rides_offered,
            rides_taken: circle.rides_taken,
            verified: circle.is_verified,
            is_public: circle.is_public,
            is_limited: circle.is_limited,
            members_limit: circle.members_limit,
            created_at: circle.created_at,
        }
    }
}

impl From<Circle> for CircleResponse {
    fn from(circle: Circle) -> Self {
        Self::from(&circle)
    }
}

impl From<CircleMember> for MembershipResponse {
    fn from(member: CircleMember) -> Self {
        let membership = member.membership;
        Self {
            user: UserWithProfileResponse::new(&member.user, &member.profile),
            is_admin: membership.is_admin,
            is_active: membership.is_active,
            used_invitations: membership.used_invitations,
            remaining_invitations: membership.remaining_invitations,
            invited_by: membership.invited_by.map(|id| id.to_string()),
            rides_taken: membership.rides_taken,
            rides_offered: membership.rides_offered,
            joined_at: membership.created_at,
        }
    }
}

// ============================================================================
// Ride Mappers
// ============================================================================

impl From<&Ride> for RideResponse {
    fn from(ride: &Ride) -> Self {
        Self {
            id: ride.id.to_string(),
            offered_by: ride.offered_by.to_string(),
            offered_in: ride.offered_in.to_string(),
            available_seats: ride.available_seats,
            comments: ride.comments.clone(),
            departure_location: ride.departure_location.clone(),
            departure_date: ride.departure_date,
            arrival_location: ride.arrival_location.clone(),
            arrival_date: ride.arrival_date,
            rating: ride.rating,
            is_active: ride.is_active,
        }
    }
}

impl From<Ride> for RideResponse {
    fn from(ride: Ride) -> Self {
        Self::from(&ride)
    }
}

impl RideDetailResponse {
    pub fn new(ride: &Ride, passengers: &[User]) -> Self {
        Self {
            ride: RideResponse::from(ride),
            passengers: passengers.iter().map(UserResponse::from).collect(),
        }
    }
}

impl From<&Rating> for RatingResponse {
    fn from(rating: &Rating) -> Self {
        Self {
            id: rating.id.to_string(),
            ride: rating.ride_id.to_string(),
            rated_user: rating.rated_user.to_string(),
            rating: rating.rating,
            comments: rating.comments.clone(),
            created_at: rating.created_at,
        }
    }
}
