//! Application configuration
//!
//! Everything is read from environment variables (a `.env` file is loaded
//! first when present). Both binaries share this struct; each reads the
//! sections it needs.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Minimum length of the HMAC secret used for access and verification tokens
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub email: EmailConfig,
    pub worker: WorkerConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: u32,
}

/// Token lifetimes are in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    #[serde(default = "default_verification_token_expiry")]
    pub verification_token_expiry: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default = "default_worker_id")]
    pub worker_id: u16,
}

/// Outbound email settings
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_email_from")]
    pub from: String,
    /// HTTP endpoint of the delivery provider; unset means emails are only logged
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    /// Public base URL used to build verification links
    #[serde(default = "default_verify_base_url")]
    pub verify_base_url: String,
}

/// Background worker settings
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_queue_name")]
    pub queue_name: String,
    #[serde(default = "default_ride_sweep_interval_secs")]
    pub ride_sweep_interval_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl WorkerConfig {
    pub fn ride_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.ride_sweep_interval_secs.max(1))
    }
}

// Default value functions
fn default_app_name() -> String {
    "ride-server".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_redis_pool_size() -> u32 {
    10
}

fn default_access_token_expiry() -> i64 {
    86_400 // 1 day
}

fn default_verification_token_expiry() -> i64 {
    259_200 // 3 days
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_worker_id() -> u16 {
    1
}

fn default_email_from() -> String {
    "Comparte Ride <noreply@comparteride.com>".to_string()
}

fn default_verify_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_queue_name() -> String {
    "ride:tasks".to_string()
}

fn default_ride_sweep_interval_secs() -> u64 {
    1200 // 20 minutes
}

fn default_max_retries() -> u32 {
    3
}

/// Read an optional variable, failing only when it is present but unparsable
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        _ => Ok(None),
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

fn optional_string(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let app_env = match optional_string("APP_ENV") {
            Some(name) => Environment::from_name(&name)
                .ok_or(ConfigError::InvalidValue("APP_ENV", name))?,
            None => Environment::default(),
        };

        let jwt_secret = required_var("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET",
                format!("must be at least {MIN_JWT_SECRET_LEN} characters"),
            ));
        }

        let worker_id = parse_var("SNOWFLAKE_WORKER_ID")?.unwrap_or_else(default_worker_id);
        if worker_id >= 1024 {
            return Err(ConfigError::InvalidValue(
                "SNOWFLAKE_WORKER_ID",
                worker_id.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: optional_string("APP_NAME").unwrap_or_else(default_app_name),
                env: app_env,
            },
            api: ServerConfig {
                host: optional_string("API_HOST").unwrap_or_else(default_host),
                port: parse_var("API_PORT")?.unwrap_or_else(default_port),
            },
            database: DatabaseConfig {
                url: required_var("DATABASE_URL")?,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            },
            redis: RedisConfig {
                url: required_var("REDIS_URL")?,
                pool_size: parse_var("REDIS_POOL_SIZE")?.unwrap_or_else(default_redis_pool_size),
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_token_expiry: parse_var("JWT_ACCESS_TOKEN_EXPIRY")?
                    .unwrap_or_else(default_access_token_expiry),
                verification_token_expiry: parse_var("JWT_VERIFICATION_TOKEN_EXPIRY")?
                    .unwrap_or_else(default_verification_token_expiry),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parse_var("RATE_LIMIT_REQUESTS_PER_SECOND")?
                    .unwrap_or_else(default_requests_per_second),
                burst: parse_var("RATE_LIMIT_BURST")?.unwrap_or_else(default_burst),
            },
            cors: CorsConfig {
                allowed_origins: optional_string("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_else(|| vec!["http://localhost:3000".to_string()]),
            },
            snowflake: SnowflakeConfig { worker_id },
            email: EmailConfig {
                from: optional_string("EMAIL_FROM").unwrap_or_else(default_email_from),
                api_url: optional_string("EMAIL_API_URL"),
                api_key: optional_string("EMAIL_API_KEY"),
                verify_base_url: optional_string("EMAIL_VERIFY_BASE_URL")
                    .unwrap_or_else(default_verify_base_url),
            },
            worker: WorkerConfig {
                queue_name: optional_string("WORKER_QUEUE_NAME").unwrap_or_else(default_queue_name),
                ride_sweep_interval_secs: parse_var("WORKER_RIDE_SWEEP_INTERVAL_SECS")?
                    .unwrap_or_else(default_ride_sweep_interval_secs),
                max_retries: parse_var("WORKER_MAX_RETRIES")?.unwrap_or_else(default_max_retries),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
