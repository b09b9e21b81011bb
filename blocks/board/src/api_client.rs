use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use taskboard_atoms::tasks::{CreateTaskPayload, ReplaceTaskPayload, Task, TaskId};

use crate::error::MutationError;

/// Loopback client for the board's own REST API (`/api/tasks/`).
///
/// Used by the proxied adapter. Without a configured timeout a stalled call
/// waits as long as the connection does.
#[derive(Clone, Debug)]
pub struct TaskApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl TaskApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// POST /api/tasks/
    pub async fn create(&self, title: &str, description: &str) -> Result<Task, MutationError> {
        let payload = CreateTaskPayload {
            title: title.to_string(),
            description: Some(description.to_string()),
        };
        let request = self.http.post(self.url("/api/tasks/")).json(&payload);
        self.send(request, None).await
    }

    /// PUT /api/tasks/{id}/ - caller supplies every field
    pub async fn replace(
        &self,
        task_id: TaskId,
        payload: &ReplaceTaskPayload,
    ) -> Result<Task, MutationError> {
        let request = self
            .http
            .put(self.url(&format!("/api/tasks/{}/", task_id)))
            .json(payload);
        self.send(request, Some(task_id)).await
    }

    /// POST /api/tasks/{id}/toggle/
    pub async fn toggle(&self, task_id: TaskId) -> Result<Task, MutationError> {
        let request = self
            .http
            .post(self.url(&format!("/api/tasks/{}/toggle/", task_id)));
        self.send(request, Some(task_id)).await
    }

    /// DELETE /api/tasks/{id}/ (soft delete)
    pub async fn delete(&self, task_id: TaskId) -> Result<Task, MutationError> {
        let request = self
            .http
            .delete(self.url(&format!("/api/tasks/{}/", task_id)));
        self.send(request, Some(task_id)).await
    }

    async fn send(
        &self,
        request: RequestBuilder,
        task_id: Option<TaskId>,
    ) -> Result<Task, MutationError> {
        let response = request
            .send()
            .await
            .map_err(|e| MutationError::Upstream(format!("internal API unreachable: {}", e)))?;

        let status = response.status();
        match (status, task_id) {
            (StatusCode::NOT_FOUND, Some(id)) => return Err(MutationError::NotFound(id)),
            (s, _) if !s.is_success() => {
                let url = response.url().to_string();
                return Err(MutationError::Upstream(format!("{} answered {}", url, s)));
            }
            _ => {}
        }

        response
            .json::<Task>()
            .await
            .map_err(|e| MutationError::Upstream(format!("unreadable task in response: {}", e)))
    }
}
