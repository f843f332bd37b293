//! Server setup and initialization
//!
//! Wires configuration into pools, repositories and the service context,
//! then serves the router until ctrl-c.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use ride_common::{AppConfig, AppError, JwtService};
use ride_core::SnowflakeGenerator;
use ride_db::{
    create_pool, run_migrations, PgCircleRepository, PgInvitationRepository,
    PgMembershipRepository, PgRatingRepository, PgRideRepository, PgUserRepository,
};
use ride_queue::{RedisPool, TaskQueue};
use ride_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware_with_config;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the application: API routes behind the middleware stack, health
/// probes outside it
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;

    Ok(health_routes().merge(api).with_state(state))
}

/// Connect to PostgreSQL and Redis and assemble the service context
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
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
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool =
        RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    let dispatcher = Arc::new(TaskQueue::from_config(redis_pool.clone(), &config.worker));
    info!(queue = %dispatcher.name(), "Redis task queue ready");

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
        config.jwt.verification_token_expiry,
    ));

    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let service_context = ServiceContextBuilder::new()
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .circle_repo(Arc::new(PgCircleRepository::new(pool.clone())))
        .membership_repo(Arc::new(PgMembershipRepository::new(pool.clone())))
        .invitation_repo(Arc::new(PgInvitationRepository::new(pool.clone())))
        .ride_repo(Arc::new(PgRideRepository::new(pool.clone())))
        .rating_repo(Arc::new(PgRatingRepository::new(pool.clone())))
        .dispatcher(dispatcher)
        .jwt_service(jwt_service)
        .snowflake_generator(snowflake_generator)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(
        Arc::new(service_context),
        config,
        pool,
        Arc::new(redis_pool),
    ))
}

/// Serve `app` on `addr` until ctrl-c
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
        return;
    }
    info!("Shutdown signal received");
}

/// Run the API server with the given configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid API address: {e}")))?;

    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    run_server(app, addr).await
}
