//! Worker setup and lifecycle
//!
//! Builds the same service context as the API server, then runs the email
//! consumer and the ride sweeper until ctrl-c.

use std::sync::Arc;

use ride_common::{AppConfig, AppError, JwtService};
use ride_core::SnowflakeGenerator;
use ride_db::{
    create_pool, run_migrations, PgCircleRepository, PgInvitationRepository,
    PgMembershipRepository, PgRatingRepository, PgRideRepository, PgUserRepository,
};
use ride_queue::{RedisPool, TaskQueue};
use ride_service::{ServiceContext, ServiceContextBuilder};
use tokio::sync::watch;
use tracing::{error, info};

use crate::jobs::{EmailConsumer, RideSweeper};
use crate::mailer::{mailer_from_config, Mailer};

/// Everything the worker loops share
pub struct WorkerState {
    pub ctx: Arc<ServiceContext>,
    pub queue: TaskQueue,
    pub mailer: Arc<dyn Mailer>,
    pub config: AppConfig,
}

pub async fn create_worker_state(config: AppConfig) -> Result<WorkerState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = ride_db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..Default::default()
    };
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    info!("Connecting to Redis...");
    let redis_pool =
        RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    redis_pool
        .health_check()
        .await
        .map_err(|e| AppError::Cache(e.to_string()))?;
    let queue = TaskQueue::from_config(redis_pool, &config.worker);

    let mailer =
        mailer_from_config(&config.email).map_err(|e| AppError::ExternalService(e.to_string()))?;

    let ctx = ServiceContextBuilder::new()
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .circle_repo(Arc::new(PgCircleRepository::new(pool.clone())))
        .membership_repo(Arc::new(PgMembershipRepository::new(pool.clone())))
        .invitation_repo(Arc::new(PgInvitationRepository::new(pool.clone())))
        .ride_repo(Arc::new(PgRideRepository::new(pool.clone())))
        .rating_repo(Arc::new(PgRatingRepository::new(pool)))
        .dispatcher(Arc::new(queue.clone()))
        .jwt_service(Arc::new(JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry,
            config.jwt.verification_token_expiry,
        )))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(WorkerState {
        ctx: Arc::new(ctx),
        queue,
        mailer,
        config,
    })
}

/// Run both loops until ctrl-c, then wait for them to wind down
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let state = create_worker_state(config).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let consumer = EmailConsumer::new(
        state.ctx.clone(),
        state.queue.clone(),
        state.mailer.clone(),
        state.config.email.verify_base_url.clone(),
    );
    let sweeper = RideSweeper::new(state.ctx.clone(), state.config.worker.ride_sweep_interval());

    let consumer = tokio::spawn(consumer.run(shutdown_rx.clone()));
    let sweeper = tokio::spawn(sweeper.run(shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    info!("Shutdown signal received, waiting for jobs in flight");

    // Receivers live in the spawned tasks; a send error means they already exited
    let _ = shutdown_tx.send(true);

    let (consumer, sweeper) = tokio::join!(consumer, sweeper);
    for (name, result) in [("email consumer", consumer), ("ride sweeper", sweeper)] {
        if let Err(e) = result {
            error!(task = name, error = %e, "Worker task panicked");
        }
    }

    info!("Worker stopped");
    Ok(())
}
