//! Application state
//!
//! Holds the service context, configuration and the connection pools the
//! readiness probe needs.

use std::sync::Arc;

use ride_common::{AppConfig, JwtService};
use ride_db::PgPool;
use ride_queue::SharedRedisPool;
use ride_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    db_pool: PgPool,
    redis_pool: SharedRedisPool,
}

impl AppState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        config: AppConfig,
        db_pool: PgPool,
        redis_pool: SharedRedisPool,
    ) -> Self {
        Self {
            service_context,
            config: Arc::new(config),
            db_pool,
            redis_pool,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// JWT service used by the auth extractor
    pub fn jwt_service(&self) -> &JwtService {
        self.service_context.jwt_service()
    }

    pub fn db_pool(&self) -> &PgPool {
        &self.db_pool
    }

    pub fn redis_pool(&self) -> &SharedRedisPool {
        &self.redis_pool
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .finish_non_exhaustive()
    }
}
