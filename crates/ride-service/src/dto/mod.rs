//! Data transfer objects for API requests and responses
//!
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    CircleSlugsRequest, CreateCircleRequest, CreateRideRequest, ExportRidesQuery,
    JoinCircleRequest, ListCirclesQuery, LoginRequest, RateRideRequest, SignupRequest,
    UpdateCircleRequest, UpdateProfileRequest, UpdateRideRequest, UpdateUserRequest,
    VerifyAccountRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

pub use responses::{
    CircleResponse, HealthChecks, HealthResponse, InvitationsResponse, LoginResponse,
    MembershipResponse, MessageResponse, PageResponse, ProfileResponse, RatingResponse,
    ReadinessResponse, RideDetailResponse, RideResponse, UserDetailResponse, UserResponse,
    UserWithProfileResponse, VerifiedCirclesResponse,
};
