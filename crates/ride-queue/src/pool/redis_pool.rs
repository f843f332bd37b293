//! deadpool-redis pool shared by the task queue and the readiness probe

use std::sync::Arc;
use std::time::Duration;

use deadpool_redis::{Config, Connection, Pool, Runtime, Status};

/// Longest a caller waits for a free connection before giving up
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// `redis://[user:password@]host:port[/db]`
    pub url: String,
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 10,
        }
    }
}

impl From<&ride_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &ride_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.pool_size.max(1) as usize,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("No Redis connection available: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Cloneable handle; clones share the same connections
#[derive(Clone)]
pub struct RedisPool {
    inner: Pool,
}

impl RedisPool {
    /// Build the pool. No connection is opened until the first `get`.
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let create_err = |e: &dyn std::fmt::Display| RedisPoolError::CreatePool(e.to_string());

        let inner = Config::from_url(config.url.as_str())
            .builder()
            .map_err(|e| create_err(&e))?
            .max_size(config.max_connections)
            .wait_timeout(Some(DEFAULT_WAIT_TIMEOUT))
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| create_err(&e))?;

        tracing::info!(
            url = %redacted_url(&config.url),
            max_connections = config.max_connections,
            "Redis pool ready"
        );
        Ok(Self { inner })
    }

    pub fn from_config(config: &ride_common::RedisConfig) -> RedisResult<Self> {
        Self::new(config.into())
    }

    pub async fn get(&self) -> RedisResult<Connection> {
        Ok(self.inner.get().await?)
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.inner.status()
    }

    /// PING through a pooled connection
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

pub type SharedRedisPool = Arc<RedisPool>;

pub fn create_shared_pool(config: RedisPoolConfig) -> RedisResult<SharedRedisPool> {
    RedisPool::new(config).map(Arc::new)
}

/// Host part of a connection URL, without credentials
fn redacted_url(url: &str) -> &str {
    url.rsplit_once('@').map_or(url, |(_, host)| host)
}
