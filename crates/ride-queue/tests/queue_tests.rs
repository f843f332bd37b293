//! Integration tests for the Redis task queue
//!
//! These tests require a running Redis server:
//!
//! ```bash
//! export REDIS_URL="redis://127.0.0.1:6379"
//! cargo test -p ride-queue --test queue_tests
//! ```

use std::time::Duration;

use ride_core::Snowflake;
use ride_queue::{RedisPool, RedisPoolConfig, Task, TaskQueue};

fn test_queue(max_retries: u32) -> Option<TaskQueue> {
    let url = std::env::var("REDIS_URL").ok()?;
    let pool = RedisPool::new(RedisPoolConfig {
        url,
        max_connections: 4,
    })
    .ok()?;
    let name = format!("ride:test:{}", uuid_suffix());
    Some(TaskQueue::new(pool, name, max_retries))
}

fn uuid_suffix() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!(
        "{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

fn email_task(id: i64) -> Task {
    Task::SendConfirmationEmail {
        user_id: Snowflake::new(id),
    }
}

#[tokio::test]
async fn test_queue_is_fifo() {
    let Some(queue) = test_queue(3) else {
        eprintln!("Skipping test: REDIS_URL not set");
        return;
    };

    queue.enqueue(email_task(1)).await.unwrap();
    queue.enqueue(email_task(2)).await.unwrap();
    assert_eq!(queue.len().await.unwrap(), 2);

    let first = queue.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();
    let second = queue.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();
    assert_eq!(first.job.task, email_task(1));
    assert_eq!(second.job.task, email_task(2));
    assert!(queue.is_empty().await.unwrap());

    queue.ack(&first).await.unwrap();
    queue.ack(&second).await.unwrap();
    assert_eq!(queue.in_flight_len().await.unwrap(), 0);
}

#[tokio::test]
async fn test_dequeue_times_out_on_empty_queue() {
    let Some(queue) = test_queue(3) else {
        eprintln!("Skipping test: REDIS_URL not set");
        return;
    };

    let job = queue.dequeue(Duration::from_secs(1)).await.unwrap();
    assert!(job.is_none());
}

#[tokio::test]
async fn test_retry_until_exhausted() {
    let Some(queue) = test_queue(1) else {
        eprintln!("Skipping test: REDIS_URL not set");
        return;
    };

    queue.enqueue(email_task(9)).await.unwrap();
    let delivery = queue.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();

    assert!(queue.retry(delivery).await.unwrap());
    assert_eq!(queue.in_flight_len().await.unwrap(), 0);
    let delivery = queue.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();
    assert_eq!(delivery.job.attempts, 1);

    assert!(!queue.retry(delivery).await.unwrap());
    assert!(queue.is_empty().await.unwrap());
    assert_eq!(queue.in_flight_len().await.unwrap(), 0);
    assert_eq!(queue.dead_len().await.unwrap(), 1);
}

#[tokio::test]
async fn test_unacknowledged_job_survives_a_crash() {
    let Some(queue) = test_queue(3) else {
        eprintln!("Skipping test: REDIS_URL not set");
        return;
    };

    let job_id = queue.enqueue(email_task(5)).await.unwrap();
    let taken = queue.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();
    assert_eq!(taken.job.id, job_id);
    assert!(queue.is_empty().await.unwrap());
    assert_eq!(queue.in_flight_len().await.unwrap(), 1);

    // The consumer died before acknowledging; a restart puts the job back
    drop(taken);
    assert_eq!(queue.requeue_in_flight().await.unwrap(), 1);
    assert_eq!(queue.in_flight_len().await.unwrap(), 0);

    let again = queue.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();
    assert_eq!(again.job.id, job_id);
    assert_eq!(again.job.attempts, 0);

    queue.ack(&again).await.unwrap();
    assert_eq!(queue.in_flight_len().await.unwrap(), 0);
    assert_eq!(queue.requeue_in_flight().await.unwrap(), 0);
}
