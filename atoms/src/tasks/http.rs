use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::{Deserialize, Serialize};

use super::error::TaskError;
use super::model::{
    BucketFilter, CreateTaskPayload, PatchTaskPayload, ReplaceTaskPayload, SortOrder, TaskId,
};
use super::service;
use super::store::TaskStore;

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(value)?.into())
        .map_err(Box::new)?)
}

/// JSON error body: `{"error": <kind>, "message": <detail>}`
pub fn error_response(err: &TaskError) -> Result<Response<Body>, Error> {
    let status = match err {
        TaskError::Validation(_) => StatusCode::BAD_REQUEST,
        TaskError::NotFound(_) => StatusCode::NOT_FOUND,
        TaskError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Task API failure: {}", err);
    }
    json_response(
        status,
        &serde_json::json!({"error": err.kind(), "message": err.to_string()}),
    )
}

fn respond<T: Serialize>(
    status: StatusCode,
    result: Result<T, TaskError>,
) -> Result<Response<Body>, Error> {
    match result {
        Ok(value) => json_response(status, &value),
        Err(e) => error_response(&e),
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T, TaskError> {
    serde_json::from_slice(body).map_err(|e| TaskError::Validation(format!("Invalid request body: {}", e)))
}

#[derive(Debug, Deserialize, Default)]
struct ListQuery {
    bucket: Option<BucketFilter>,
    order: Option<String>,
}

fn parse_list_query(query: Option<&str>) -> Result<(BucketFilter, SortOrder), TaskError> {
    let parsed: ListQuery = match query {
        Some(q) if !q.is_empty() => serde_urlencoded::from_str(q)
            .map_err(|e| TaskError::Validation(format!("Invalid query string: {}", e)))?,
        _ => ListQuery::default(),
    };
    let order = match parsed.order.as_deref() {
        Some(raw) => raw.parse().map_err(TaskError::Validation)?,
        None => SortOrder::Oldest,
    };
    Ok((parsed.bucket.unwrap_or_default(), order))
}

/// GET /api/tasks/ - every task, oldest first unless `?order=desc`
pub async fn list_tasks(store: &TaskStore, query: Option<&str>) -> Result<Response<Body>, Error> {
    let (filter, order) = match parse_list_query(query) {
        Ok(parsed) => parsed,
        Err(e) => return error_response(&e),
    };
    respond(StatusCode::OK, service::list_tasks(store, filter, order).await)
}

/// POST /api/tasks/
pub async fn create_task(store: &TaskStore, body: &[u8]) -> Result<Response<Body>, Error> {
    let payload: CreateTaskPayload = match parse_body(body) {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };
    respond(
        StatusCode::CREATED,
        service::create_task(store, &payload.title, payload.description.as_deref()).await,
    )
}

/// GET /api/tasks/{id}/
pub async fn get_task(store: &TaskStore, task_id: TaskId) -> Result<Response<Body>, Error> {
    respond(StatusCode::OK, service::get_task(store, task_id).await)
}

/// PUT /api/tasks/{id}/ - full replacement, omitted flags reset to false
pub async fn replace_task(
    store: &TaskStore,
    task_id: TaskId,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: ReplaceTaskPayload = match parse_body(body) {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };
    respond(StatusCode::OK, service::replace_task(store, task_id, &payload).await)
}

/// PATCH /api/tasks/{id}/
pub async fn patch_task(
    store: &TaskStore,
    task_id: TaskId,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: PatchTaskPayload = match parse_body(body) {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };
    respond(StatusCode::OK, service::patch_task(store, task_id, &payload).await)
}

/// DELETE /api/tasks/{id}/ - soft delete, returns the task
pub async fn delete_task(store: &TaskStore, task_id: TaskId) -> Result<Response<Body>, Error> {
    respond(StatusCode::OK, service::delete_task(store, task_id).await)
}

/// POST /api/tasks/{id}/toggle/
pub async fn toggle_task(store: &TaskStore, task_id: TaskId) -> Result<Response<Body>, Error> {
    respond(StatusCode::OK, service::toggle_task(store, task_id).await)
}

/// DELETE /api/tasks/{id}/purge/ - hard delete, only when enabled
pub async fn purge_task(
    store: &TaskStore,
    task_id: TaskId,
    allowed: bool,
) -> Result<Response<Body>, Error> {
    if !allowed {
        return json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &serde_json::json!({"error": "Purge is disabled"}),
        );
    }
    match service::purge_task(store, task_id).await {
        Ok(()) => Ok(Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header("Access-Control-Allow-Origin", "*")
            .body(Body::Empty)
            .map_err(Box::new)?),
        Err(e) => error_response(&e),
    }
}
