//! # ride-service
//!
//! Application layer: request/response DTOs and the services that apply the
//! domain rules for users, circles, memberships and rides.

pub mod dto;
pub mod services;

pub use services::{
    disable_finished_rides, AccessService, AdminService, CircleService, MembershipService,
    OutgoingEmail, RideService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, UserService,
};
