//! # ride-db
//!
//! PostgreSQL persistence for the ride-sharing domain, built on SQLx.
//!
//! Every repository trait from `ride-core` has a `Pg*` implementation here.
//! Operations that touch several counters (offering a ride, joining one,
//! redeeming an invitation, rating) run inside a single transaction.
//!
//! ```rust,ignore
//! use ride_db::{create_pool, run_migrations, DatabaseConfig, PgRideRepository};
//!
//! let pool = create_pool(&DatabaseConfig::from_env()).await?;
//! run_migrations(&pool).await?;
//! let rides = PgRideRepository::new(pool);
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_pool_from_env, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgCircleRepository, PgInvitationRepository, PgMembershipRepository, PgRatingRepository,
    PgRideRepository, PgUserRepository,
};
