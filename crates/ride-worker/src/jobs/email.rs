//! Confirmation email consumer

use std::sync::Arc;
use std::time::Duration;

use ride_core::Snowflake;
use ride_queue::{Delivery, Task, TaskQueue};
use ride_service::{ServiceContext, UserService};
use tracing::{debug, error, info, instrument, warn};

use super::{JobError, Shutdown};
use crate::mailer::Mailer;

/// How long a single dequeue blocks; also bounds shutdown latency
pub const DEQUEUE_TIMEOUT: Duration = Duration::from_secs(5);

const QUEUE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Render and send the verification email for `user_id`.
///
/// Returns `Ok(false)` when there is nothing to send: the account is gone or
/// already verified.
#[instrument(skip(ctx, mailer, verify_base_url))]
pub async fn send_confirmation(
    ctx: &ServiceContext,
    mailer: &dyn Mailer,
    verify_base_url: &str,
    user_id: Snowflake,
) -> Result<bool, JobError> {
    let email = UserService::new(ctx)
        .build_confirmation_email(user_id, verify_base_url)
        .await?;

    let Some(email) = email else {
        return Ok(false);
    };

    mailer.send(&email).await?;
    info!(to = %email.to, "Confirmation email sent");
    Ok(true)
}

pub struct EmailConsumer {
    ctx: Arc<ServiceContext>,
    queue: TaskQueue,
    mailer: Arc<dyn Mailer>,
    verify_base_url: String,
}

impl EmailConsumer {
    pub fn new(
        ctx: Arc<ServiceContext>,
        queue: TaskQueue,
        mailer: Arc<dyn Mailer>,
        verify_base_url: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            queue,
            mailer,
            verify_base_url: verify_base_url.into(),
        }
    }

    /// Pull jobs until shutdown. A job in flight is finished first.
    ///
    /// Jobs left unacknowledged by a previous run are requeued before the
    /// first dequeue.
    pub async fn run(self, shutdown: Shutdown) {
        info!(queue = %self.queue.name(), "Email consumer started");

        if let Err(e) = self.queue.requeue_in_flight().await {
            warn!(error = %e, "Failed to requeue unacknowledged jobs");
        }

        while !*shutdown.borrow() {
            match self.queue.dequeue(DEQUEUE_TIMEOUT).await {
                Ok(Some(delivery)) => self.process(delivery).await,
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "Failed to read from task queue");
                    tokio::time::sleep(QUEUE_ERROR_BACKOFF).await;
                }
            }
        }

        info!("Email consumer stopped");
    }

    async fn process(&self, delivery: Delivery) {
        let job = &delivery.job;
        let result = match &job.task {
            Task::SendConfirmationEmail { user_id } => {
                send_confirmation(
                    &self.ctx,
                    self.mailer.as_ref(),
                    &self.verify_base_url,
                    *user_id,
                )
                .await
            }
        };

        let err = match result {
            Ok(sent) => {
                if !sent {
                    debug!(job_id = %job.id, task = job.task.name(), "Nothing to send, job dropped");
                }
                if let Err(e) = self.queue.ack(&delivery).await {
                    warn!(job_id = %job.id, error = %e, "Failed to acknowledge job, it may run again");
                }
                return;
            }
            Err(e) => e,
        };

        let job_id = job.id;
        let attempt = job.attempts + 1;
        warn!(job_id = %job_id, attempt, error = %err, "Job failed");

        match self.queue.retry(delivery).await {
            Ok(true) => debug!(job_id = %job_id, "Job requeued"),
            Ok(false) => error!(
                job_id = %job_id,
                attempts = attempt,
                "Job exhausted its retries, moved to dead letter list"
            ),
            Err(e) => error!(
                job_id = %job_id,
                error = %e,
                "Failed to requeue job, left in flight until the next start"
            ),
        }
    }
}
