//! Integration test utilities for the ride-sharing API
//!
//! Spawns the real router against PostgreSQL and Redis and drives it over
//! HTTP.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
