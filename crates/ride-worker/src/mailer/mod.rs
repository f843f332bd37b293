//! Outgoing mail delivery
//!
//! [`HttpMailer`] posts to a transactional email API; [`LogMailer`] only
//! logs, for environments without `EMAIL_API_URL`.

mod http;
mod logging;

use std::sync::Arc;

use async_trait::async_trait;
use ride_common::EmailConfig;
use ride_service::OutgoingEmail;
use thiserror::Error;

pub use http::HttpMailer;
pub use logging::LogMailer;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Email API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Email API rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// `HttpMailer` when an API URL is configured, `LogMailer` otherwise
pub fn mailer_from_config(config: &EmailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match config.api_url.as_deref() {
        Some(url) if !url.trim().is_empty() => {
            tracing::info!(api_url = %url, "Sending email through HTTP API");
            Ok(Arc::new(HttpMailer::new(
                url,
                config.api_key.clone(),
                &config.from,
            )?))
        }
        _ => {
            tracing::warn!("EMAIL_API_URL not set, emails will only be logged");
            Ok(Arc::new(LogMailer::new(&config.from)))
        }
    }
}
