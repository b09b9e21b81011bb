use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TaskId = i64;

/// Task domain model - the only entity of the board
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub completed: bool,

    /// Soft-delete flag. Rows are never physically removed by the board.
    pub deleted: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Bucket this task is displayed in. `deleted` dominates `completed`.
    pub fn bucket(&self) -> Bucket {
        if self.deleted {
            Bucket::Deleted
        } else if self.completed {
            Bucket::Completed
        } else {
            Bucket::Pending
        }
    }
}

/// Derived visibility grouping, computed from the two flags at read time.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Pending,
    Completed,
    Deleted,
}

/// Filter accepted by the listing query
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BucketFilter {
    Pending,
    Completed,
    Deleted,
    #[default]
    All,
}

impl BucketFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            BucketFilter::All => true,
            BucketFilter::Pending => task.bucket() == Bucket::Pending,
            BucketFilter::Completed => task.bucket() == Bucket::Completed,
            BucketFilter::Deleted => task.bucket() == Bucket::Deleted,
        }
    }
}

impl From<Bucket> for BucketFilter {
    fn from(bucket: Bucket) -> Self {
        match bucket {
            Bucket::Pending => BucketFilter::Pending,
            Bucket::Completed => BucketFilter::Completed,
            Bucket::Deleted => BucketFilter::Deleted,
        }
    }
}

/// Ordering by `created_at`, ties broken by `id` in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending, the REST listing default
    #[default]
    Oldest,
    /// Descending, used by the HTML views
    Newest,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "oldest" => Ok(SortOrder::Oldest),
            "desc" | "newest" => Ok(SortOrder::Newest),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bucket::Pending => "pending",
            Bucket::Completed => "completed",
            Bucket::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// Number of tasks per bucket
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketCounts {
    pub pending: usize,
    pub completed: usize,
    pub deleted: usize,
}

impl BucketCounts {
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut counts = BucketCounts::default();
        for task in tasks {
            match task.bucket() {
                Bucket::Pending => counts.pending += 1,
                Bucket::Completed => counts.completed += 1,
                Bucket::Deleted => counts.deleted += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.pending + self.completed + self.deleted
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CreateTaskPayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// PUT body. Omitted fields fall back to defaults, not to stored values.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReplaceTaskPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub deleted: bool,
}

/// PATCH body. Omitted fields keep their stored values.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PatchTaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub deleted: Option<bool>,
}
