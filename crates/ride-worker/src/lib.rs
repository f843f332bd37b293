//! # ride-worker
//!
//! Background worker: consumes the task queue to send confirmation emails
//! and periodically deactivates rides that have arrived.

pub mod jobs;
pub mod mailer;
pub mod worker;

pub use worker::run;
