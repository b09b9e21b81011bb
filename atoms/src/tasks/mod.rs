
// Re-export model types and service functions
pub mod model;
pub mod error;
pub mod status;
pub mod dynamo;
pub mod store;
pub mod service;
pub mod http;

pub use error::TaskError;
pub use model::{
    Bucket, BucketCounts, BucketFilter, CreateTaskPayload, PatchTaskPayload, ReplaceTaskPayload,
    SortOrder, Task, TaskId,
};
pub use service::*;
pub use store::{MemoryTaskStore, TaskStore};
