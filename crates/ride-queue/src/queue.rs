//! Redis list used as a FIFO job queue.
//!
//! Producers `LPUSH` onto the list. The worker `BRPOPLPUSH`es from the other
//! end into `<name>:processing`, where the payload stays until it is
//! acknowledged, retried or dead-lettered. Anything still in that list after a
//! crash is put back by [`TaskQueue::requeue_in_flight`], so a job may run more
//! than once but is never lost. Jobs that keep failing, or payloads that cannot
//! be decoded, land on a `<name>:dead` list for inspection.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::pool::{RedisPool, RedisPoolError};
use crate::task::{Job, Task};

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error(transparent)]
    Pool(#[from] RedisPoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type QueueResult<T> = Result<T, QueueError>;

/// Hands tasks to whatever runs them out of band
#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    async fn dispatch(&self, task: Task) -> QueueResult<Uuid>;
}

/// A job taken off the queue and parked in the processing list.
///
/// Must be handed back through [`TaskQueue::ack`] or [`TaskQueue::retry`].
#[derive(Debug, Clone)]
pub struct Delivery {
    pub job: Job,
    /// Exact bytes in the processing list; `LREM` matches on them
    payload: String,
}

#[derive(Clone, Debug)]
pub struct TaskQueue {
    pool: RedisPool,
    name: String,
    processing: String,
    dead_letter: String,
    max_retries: u32,
}

impl TaskQueue {
    pub fn new(pool: RedisPool, name: impl Into<String>, max_retries: u32) -> Self {
        let name = name.into();
        Self {
            processing: format!("{name}:processing"),
            dead_letter: format!("{name}:dead"),
            pool,
            name,
            max_retries,
        }
    }

    pub fn from_config(pool: RedisPool, config: &ride_common::WorkerConfig) -> Self {
        Self::new(pool, config.queue_name.clone(), config.max_retries)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub async fn enqueue(&self, task: Task) -> QueueResult<Uuid> {
        let job = Job::new(task);
        self.push(&self.name, &job).await?;
        debug!(job_id = %job.id, task = job.task.name(), queue = %self.name, "Enqueued job");
        Ok(job.id)
    }

    /// Block for up to `timeout` waiting for the next job.
    ///
    /// Undecodable payloads are moved to the dead-letter list and reported as `None`.
    pub async fn dequeue(&self, timeout: Duration) -> QueueResult<Option<Delivery>> {
        let mut conn = self.pool.get().await?;
        let popped: Option<String> = conn
            .brpoplpush(&self.name, &self.processing, timeout.as_secs_f64())
            .await?;

        let Some(payload) = popped else {
            return Ok(None);
        };

        match Job::from_json(&payload) {
            Ok(job) => Ok(Some(Delivery { job, payload })),
            Err(e) => {
                warn!(error = %e, queue = %self.name, "Discarding malformed job payload");
                let _: () = redis::pipe()
                    .atomic()
                    .lpush(&self.dead_letter, &payload)
                    .ignore()
                    .lrem(&self.processing, 1, &payload)
                    .ignore()
                    .query_async(&mut conn)
                    .await?;
                Ok(None)
            }
        }
    }

    /// Drop a finished job from the processing list
    pub async fn ack(&self, delivery: &Delivery) -> QueueResult<()> {
        let mut conn = self.pool.get().await?;
        conn.lrem::<_, _, ()>(&self.processing, 1, &delivery.payload).await?;
        Ok(())
    }

    /// Record a failed attempt and requeue the job.
    ///
    /// A job is retried at most `max_retries` times. Once a failure would
    /// exceed that it returns `false` and the job is parked on the dead-letter
    /// list instead. Either way the delivery leaves the processing list in the
    /// same transaction.
    pub async fn retry(&self, delivery: Delivery) -> QueueResult<bool> {
        let Delivery { mut job, payload } = delivery;
        job.attempts += 1;
        let requeue = !self.exhausted(job.attempts);
        let target = if requeue { &self.name } else { &self.dead_letter };

        let mut conn = self.pool.get().await?;
        let _: () = redis::pipe()
            .atomic()
            .lpush(target, job.to_json()?)
            .ignore()
            .lrem(&self.processing, 1, &payload)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(requeue)
    }

    /// Put every unacknowledged job back on the queue. Run before consuming.
    pub async fn requeue_in_flight(&self) -> QueueResult<u64> {
        let mut conn = self.pool.get().await?;
        let mut moved = 0;
        loop {
            let payload: Option<String> = conn.rpoplpush(&self.processing, &self.name).await?;
            if payload.is_none() {
                break;
            }
            moved += 1;
        }
        if moved > 0 {
            warn!(count = moved, queue = %self.name, "Requeued unacknowledged jobs");
        }
        Ok(moved)
    }

    /// Whether a job with `attempts` failures has used up its retries
    fn exhausted(&self, attempts: u32) -> bool {
        attempts > self.max_retries
    }

    pub async fn len(&self) -> QueueResult<u64> {
        let mut conn = self.pool.get().await?;
        Ok(conn.llen(&self.name).await?)
    }

    pub async fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.len().await? == 0)
    }

    pub async fn in_flight_len(&self) -> QueueResult<u64> {
        let mut conn = self.pool.get().await?;
        Ok(conn.llen(&self.processing).await?)
    }

    pub async fn dead_len(&self) -> QueueResult<u64> {
        let mut conn = self.pool.get().await?;
        Ok(conn.llen(&self.dead_letter).await?)
    }

    async fn push(&self, list: &str, job: &Job) -> QueueResult<()> {
        let payload = job.to_json()?;
        let mut conn = self.pool.get().await?;
        conn.lpush::<_, _, ()>(list, payload).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskDispatcher for TaskQueue {
    async fn dispatch(&self, task: Task) -> QueueResult<Uuid> {
        self.enqueue(task).await
    }
}
