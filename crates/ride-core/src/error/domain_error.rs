//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
///
/// Display strings are user-facing: the API forwards them as the error message.
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Circle not found: {0}")]
    CircleNotFound(String),

    #[error("Membership not found")]
    MembershipNotFound,

    #[error("Invitation not found")]
    InvitationNotFound,

    #[error("Ride not found: {0}")]
    RideNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("{0}")]
    Validation(String),

    #[error("Invalid invitation code.")]
    InvalidInvitation,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Ride is already full!")]
    RideFull,

    #[error("You can't join this ride now")]
    RideDeparted,

    #[error("Passenger is already in this trip")]
    AlreadyPassenger,

    #[error("Rating have already been emitted!")]
    AlreadyRated,

    #[error("Trip is still in progress")]
    RideInProgress,

    #[error("Ride has not started yet")]
    RideNotStarted,

    #[error("Ongoing rides cannot be modified.")]
    RideNotEditable,

    #[error("User is already member of this circle")]
    AlreadyMember,

    #[error("Circle has reached its member limit :(")]
    CircleFull,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("User is not an active member of the circle.")]
    NotActiveMember,

    #[error("You must be an admin of this circle")]
    NotCircleAdmin,

    #[error("{0}")]
    Forbidden(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("A user with that username already exists.")]
    UsernameAlreadyExists,

    #[error("A user with that email already exists.")]
    EmailAlreadyExists,

    #[error("A circle with that slug name already exists.")]
    SlugAlreadyExists,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::CircleNotFound(_) => "UNKNOWN_CIRCLE",
            Self::MembershipNotFound => "UNKNOWN_MEMBERSHIP",
            Self::InvitationNotFound => "UNKNOWN_INVITATION",
            Self::RideNotFound(_) => "UNKNOWN_RIDE",

            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidInvitation => "INVALID_INVITATION",

            Self::RideFull => "RIDE_FULL",
            Self::RideDeparted => "RIDE_DEPARTED",
            Self::AlreadyPassenger => "ALREADY_PASSENGER",
            Self::AlreadyRated => "ALREADY_RATED",
            Self::RideInProgress => "RIDE_IN_PROGRESS",
            Self::RideNotStarted => "RIDE_NOT_STARTED",
            Self::RideNotEditable => "RIDE_NOT_EDITABLE",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::CircleFull => "CIRCLE_FULL",

            Self::NotActiveMember => "NOT_ACTIVE_MEMBER",
            Self::NotCircleAdmin => "NOT_CIRCLE_ADMIN",
            Self::Forbidden(_) => "FORBIDDEN",

            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::SlugAlreadyExists => "SLUG_ALREADY_EXISTS",

            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::CircleNotFound(_)
                | Self::MembershipNotFound
                | Self::InvitationNotFound
                | Self::RideNotFound(_)
        )
    }

    /// Check if this is a validation error (including ride/circle rule violations)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidInvitation
                | Self::RideFull
                | Self::RideDeparted
                | Self::AlreadyPassenger
                | Self::AlreadyRated
                | Self::RideInProgress
                | Self::RideNotStarted
                | Self::RideNotEditable
                | Self::AlreadyMember
                | Self::CircleFull
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotActiveMember | Self::NotCircleAdmin | Self::Forbidden(_)
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::UsernameAlreadyExists | Self::EmailAlreadyExists | Self::SlugAlreadyExists
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::CircleNotFound("x".into()).code(), "UNKNOWN_CIRCLE");
        assert_eq!(DomainError::RideFull.code(), "RIDE_FULL");
        assert_eq!(DomainError::NotActiveMember.code(), "NOT_ACTIVE_MEMBER");
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::RideNotFound(Snowflake::new(1)).is_not_found());
        assert!(DomainError::RideFull.is_validation());
        assert!(DomainError::CircleFull.is_validation());
        assert!(DomainError::NotCircleAdmin.is_authorization());
        assert!(DomainError::SlugAlreadyExists.is_conflict());
        assert!(!DomainError::Database("boom".into()).is_validation());
    }

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(DomainError::RideFull.to_string(), "Ride is already full!");
        assert_eq!(DomainError::InvalidInvitation.to_string(), "Invalid invitation code.");
        assert_eq!(
            DomainError::CircleFull.to_string(),
            "Circle has reached its member limit :("
        );
        assert_eq!(
            DomainError::Validation("Passwords dont match.".into()).to_string(),
            "Passwords dont match."
        );
    }
}
