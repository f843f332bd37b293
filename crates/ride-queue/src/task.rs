//! Task payloads carried on the queue

use chrono::{DateTime, Utc};
use ride_core::Snowflake;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Work the background worker knows how to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    /// Email the verification link to a freshly registered user
    SendConfirmationEmail { user_id: Snowflake },
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SendConfirmationEmail { .. } => "send_confirmation_email",
        }
    }
}

/// A task plus its delivery bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub task: Task,
    /// Failed executions so far
    #[serde(default)]
    pub attempts: u32,
    pub enqueued_at: DateTime<Utc>,
}

impl Job {
    #[must_use]
    pub fn new(task: Task) -> Self {
        Self {
            id: Uuid::new_v4(),
            task,
            attempts: 0,
            enqueued_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_is_tagged() {
        let task = Task::SendConfirmationEmail {
            user_id: Snowflake::new(42),
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["type"], "send_confirmation_email");
        assert_eq!(value["user_id"], "42");
        assert_eq!(task.name(), "send_confirmation_email");
    }

    #[test]
    fn test_job_parses_numeric_user_id() {
        let payload = r#"{
            "id": "4f1c3e2a-9a7b-4a53-9a51-0a3e5c1d2b3f",
            "task": {"type": "send_confirmation_email", "user_id": 7},
            "enqueued_at": "2024-05-01T10:00:00Z"
        }"#;
        let job = Job::from_json(payload).unwrap();
        assert_eq!(job.attempts, 0);
        assert_eq!(
            job.task,
            Task::SendConfirmationEmail {
                user_id: Snowflake::new(7)
            }
        );
    }

    #[test]
    fn test_unknown_task_is_rejected() {
        let payload = r#"{
            "id": "4f1c3e2a-9a7b-4a53-9a51-0a3e5c1d2b3f",
            "task": {"type": "launch_rocket"},
            "enqueued_at": "2024-05-01T10:00:00Z"
        }"#;
        assert!(Job::from_json(payload).is_err());
    }
}
