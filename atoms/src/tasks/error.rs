use super::model::TaskId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TaskError {
    #[error("{0}")]
    Validation(String),

    #[error("Task {0} not found")]
    NotFound(TaskId),

    /// Backend failure (DynamoDB call, unparseable item, ...)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TaskError {
    /// Short machine-readable name, used as the `error` field of JSON bodies
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::Validation(_) => "Validation",
            TaskError::NotFound(_) => "NotFound",
            TaskError::Storage(_) => "Storage",
        }
    }
}
