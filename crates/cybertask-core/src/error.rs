use thiserror::Error;

use crate::task::TaskId;

/// Failures reading or writing a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Rejected store input. Persistence failures never surface here: the stores
/// log them and keep their in-memory state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a task with id {0} already exists")]
    DuplicateId(TaskId),

    #[error("task name cannot be empty")]
    EmptyName,
}
