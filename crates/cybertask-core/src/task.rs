use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for TaskId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub completed: bool,

    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        id: impl Into<TaskId>,
        name: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            completed: false,
            created_at,
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        validate_name(&self.name)
    }
}

fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::EmptyName);
    }
    Ok(())
}

/// Raw user input for a new task, validated before it reaches the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl TaskDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        validate_name(&self.name)
    }

    pub fn into_task(self, now: DateTime<Utc>) -> Result<Task, StoreError> {
        self.validate()?;
        Ok(Task::new(TaskId::generate(), self.name, self.description, now))
    }
}

/// Persisted shape of the task store: `{ "tasks": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskState {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Example tasks offered to a first-time user, newest first.
pub fn demo_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let samples = [
        ("Defeat the inbox boss", "Archive or answer every unread message"),
        ("Calibrate the neon workspace", "Pick a mood theme that keeps you focused"),
        ("Complete your first task", "Tick this one off to unlock a trophy"),
    ];

    samples
        .iter()
        .enumerate()
        .map(|(idx, (name, description))| {
            Task::new(
                TaskId::generate(),
                *name,
                *description,
                now - Duration::minutes(idx as i64),
            )
        })
        .collect()
}
