use std::str::FromStr;
use taskboard_atoms::tasks::{TaskError, TaskId};
use thiserror::Error;

/// Outcome of a failed board mutation, whichever path applied it
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MutationError {
    #[error("{0}")]
    Validation(String),

    #[error("Task {0} not found")]
    NotFound(TaskId),

    /// Non-2xx answer or transport failure from the internal REST API
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<TaskError> for MutationError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(msg) => MutationError::Validation(msg),
            TaskError::NotFound(id) => MutationError::NotFound(id),
            TaskError::Storage(msg) => MutationError::Storage(msg),
        }
    }
}

impl MutationError {
    /// Text shown to the user when the policy is `Surface`
    pub fn notice(&self) -> String {
        match self {
            MutationError::Validation(_) => "A task needs a title.".to_string(),
            MutationError::NotFound(id) => format!("Task #{} no longer exists.", id),
            MutationError::Upstream(_) | MutationError::Storage(_) => {
                "The change could not be saved. Please try again.".to_string()
            }
        }
    }
}

/// What the adapter does with a failed mutation.
///
/// Either way the board fragment is rendered from current state and the
/// failure is logged; `Surface` additionally puts a notice in the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    Swallow,
    Surface,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "swallow" => Ok(FailurePolicy::Swallow),
            "surface" => Ok(FailurePolicy::Surface),
            other => Err(format!("unknown failure policy '{}'", other)),
        }
    }
}
