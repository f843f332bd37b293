use async_trait::async_trait;
use ride_service::OutgoingEmail;
use tracing::info;

use super::{MailError, Mailer};

/// Logs the message instead of delivering it
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: &str) -> Self {
        Self {
            from: from.to_string(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        info!(
            from = %self.from,
            to = %email.to,
            subject = %email.subject,
            bytes = email.html.len(),
            "Email logged, not delivered"
        );
        Ok(())
    }
}
