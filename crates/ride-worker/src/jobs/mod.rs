//! Background loops run by the worker
//!
//! Both loops watch a shared shutdown flag and return once it flips.

mod email;
mod sweeper;

use ride_service::ServiceError;
use thiserror::Error;

use crate::mailer::MailError;

pub use email::{send_confirmation, EmailConsumer, DEQUEUE_TIMEOUT};
pub use sweeper::RideSweeper;

/// Shutdown signal shared by the worker loops
pub type Shutdown = tokio::sync::watch::Receiver<bool>;

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Mail(#[from] MailError),
}
