//! JSON email API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use ride_service::OutgoingEmail;
use serde::Serialize;
use tracing::debug;

use super::{MailError, Mailer};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body accepted by the email API
#[derive(Debug, Serialize)]
struct SendEmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Delivers mail with `POST {api_url}` and bearer auth
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: &str, api_key: Option<String>, from: &str) -> Result<Self, MailError> {
        let client = Client::builder()
            .user_agent(concat!("ride-worker/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MailError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key,
            from: from.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let payload = SendEmailPayload {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
        };

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to = %email.to, status = status.as_u16(), "Email accepted by API");
        Ok(())
    }
}
