//! Where board mutations are applied.
//!
//! `Direct` runs the task service against the store in-process. `Proxied`
//! sends the same operations through the REST API over loopback HTTP. Both
//! end in identical stored state: the REST delete is a soft delete, and the
//! proxied update reads the current flags first so the PUT keeps them.

use std::str::FromStr;

use taskboard_atoms::tasks::{self, status, ReplaceTaskPayload, Task, TaskId, TaskStore};

use crate::api_client::TaskApiClient;
use crate::error::MutationError;
use crate::forms::TaskForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdapterMode {
    #[default]
    Direct,
    Proxied,
}

impl FromStr for AdapterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(AdapterMode::Direct),
            "proxied" | "proxy" => Ok(AdapterMode::Proxied),
            other => Err(format!("unknown adapter mode '{}'", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub enum MutationGateway {
    Direct(TaskStore),
    Proxied {
        /// Read side for fetch-then-put
        store: TaskStore,
        api: TaskApiClient,
    },
}

impl MutationGateway {
    pub fn mode(&self) -> AdapterMode {
        match self {
            MutationGateway::Direct(_) => AdapterMode::Direct,
            MutationGateway::Proxied { .. } => AdapterMode::Proxied,
        }
    }

    pub async fn create(&self, form: &TaskForm) -> Result<Task, MutationError> {
        // Blank titles never leave the adapter, whichever path is configured
        status::normalize_title(&form.title)?;

        match self {
            MutationGateway::Direct(store) => {
                Ok(tasks::create_task(store, &form.title, Some(&form.description)).await?)
            }
            MutationGateway::Proxied { api, .. } => api.create(&form.title, &form.description).await,
        }
    }

    /// Title and description only; `completed`/`deleted` are kept
    pub async fn update(&self, task_id: TaskId, form: &TaskForm) -> Result<Task, MutationError> {
        status::normalize_title(&form.title)?;

        match self {
            MutationGateway::Direct(store) => {
                Ok(tasks::update_task(store, task_id, &form.title, &form.description).await?)
            }
            MutationGateway::Proxied { store, api } => {
                let current = tasks::get_task(store, task_id).await?;
                let payload = ReplaceTaskPayload {
                    title: form.title.clone(),
                    description: form.description.clone(),
                    completed: current.completed,
                    deleted: current.deleted,
                };
                api.replace(task_id, &payload).await
            }
        }
    }

    pub async fn toggle(&self, task_id: TaskId) -> Result<Task, MutationError> {
        match self {
            MutationGateway::Direct(store) => Ok(tasks::toggle_task(store, task_id).await?),
            MutationGateway::Proxied { api, .. } => api.toggle(task_id).await,
        }
    }

    pub async fn soft_delete(&self, task_id: TaskId) -> Result<Task, MutationError> {
        match self {
            MutationGateway::Direct(store) => Ok(tasks::delete_task(store, task_id).await?),
            MutationGateway::Proxied { api, .. } => api.delete(task_id).await,
        }
    }
}
