use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::dynamo::DynamoTaskStore;
use super::error::TaskError;
use super::model::{Task, TaskId};

/// Row-level persistence for tasks.
///
/// Only raw reads and writes live here; state transitions are applied by
/// `service` on top of `fetch` + `save`.
#[derive(Clone, Debug)]
pub enum TaskStore {
    Dynamo(DynamoTaskStore),
    Memory(MemoryTaskStore),
}

impl TaskStore {
    pub fn dynamo(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        TaskStore::Dynamo(DynamoTaskStore::new(client, table_name))
    }

    pub fn memory() -> Self {
        TaskStore::Memory(MemoryTaskStore::default())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            TaskStore::Dynamo(_) => "dynamodb",
            TaskStore::Memory(_) => "memory",
        }
    }

    pub async fn allocate_id(&self) -> Result<TaskId, TaskError> {
        match self {
            TaskStore::Dynamo(store) => store.allocate_id().await,
            TaskStore::Memory(store) => Ok(store.allocate_id().await),
        }
    }

    pub async fn insert(&self, task: &Task) -> Result<(), TaskError> {
        match self {
            TaskStore::Dynamo(store) => store.insert(task).await,
            TaskStore::Memory(store) => store.insert(task).await,
        }
    }

    pub async fn fetch(&self, id: TaskId) -> Result<Task, TaskError> {
        match self {
            TaskStore::Dynamo(store) => store.fetch(id).await,
            TaskStore::Memory(store) => store.fetch(id).await,
        }
    }

    pub async fn save(&self, task: &Task) -> Result<(), TaskError> {
        match self {
            TaskStore::Dynamo(store) => store.save(task).await,
            TaskStore::Memory(store) => store.save(task).await,
        }
    }

    pub async fn remove(&self, id: TaskId) -> Result<(), TaskError> {
        match self {
            TaskStore::Dynamo(store) => store.remove(id).await,
            TaskStore::Memory(store) => store.remove(id).await,
        }
    }

    pub async fn scan_all(&self) -> Result<Vec<Task>, TaskError> {
        match self {
            TaskStore::Dynamo(store) => store.scan_all().await,
            TaskStore::Memory(store) => Ok(store.scan_all().await),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryRows {
    last_id: TaskId,
    rows: BTreeMap<TaskId, Task>,
}

/// In-process rows for tests and local runs. Cloning shares the rows.
#[derive(Clone, Debug, Default)]
pub struct MemoryTaskStore {
    inner: Arc<RwLock<MemoryRows>>,
}

impl MemoryTaskStore {
    async fn allocate_id(&self) -> TaskId {
        let mut guard = self.inner.write().await;
        guard.last_id += 1;
        guard.last_id
    }

    async fn insert(&self, task: &Task) -> Result<(), TaskError> {
        let mut guard = self.inner.write().await;
        if guard.rows.contains_key(&task.id) {
            return Err(TaskError::Storage(format!("task {} already exists", task.id)));
        }
        guard.rows.insert(task.id, task.clone());
        Ok(())
    }

    async fn fetch(&self, id: TaskId) -> Result<Task, TaskError> {
        self.inner
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(TaskError::NotFound(id))
    }

    async fn save(&self, task: &Task) -> Result<(), TaskError> {
        let mut guard = self.inner.write().await;
        match guard.rows.get_mut(&task.id) {
            Some(row) => {
                *row = task.clone();
                Ok(())
            }
            None => Err(TaskError::NotFound(task.id)),
        }
    }

    async fn remove(&self, id: TaskId) -> Result<(), TaskError> {
        self.inner
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskError::NotFound(id))
    }

    async fn scan_all(&self) -> Vec<Task> {
        self.inner.read().await.rows.values().cloned().collect()
    }
}
