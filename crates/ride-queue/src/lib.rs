//! # ride-queue
//!
//! Redis-backed background work for the ride-sharing backend.
//!
//! - **Connection Pool**: managed Redis connections via deadpool
//! - **Task Queue**: a Redis list used as a FIFO of JSON-encoded [`Job`]s,
//!   consumed by the worker with at-least-once semantics
//!
//! ```ignore
//! use ride_queue::{RedisPool, RedisPoolConfig, Task, TaskQueue};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let queue = TaskQueue::new(pool, "ride:tasks", 3);
//! queue.enqueue(Task::SendConfirmationEmail { user_id }).await?;
//! ```

pub mod pool;
pub mod queue;
pub mod task;

pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};
pub use queue::{Delivery, QueueError, QueueResult, TaskDispatcher, TaskQueue};
pub use task::{Job, Task};
