use board_block::views;
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use std::sync::Arc;
use taskboard_atoms::tasks::{http as rest, TaskId};
use taskboard_shared::AppState;

use lambda_http::http::header::HeaderValue;

fn with_cors_headers(mut resp: Response<Body>) -> Response<Body> {
    let headers = resp.headers_mut();
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,HX-Request,HX-Target,HX-Current-URL"),
    );
    resp
}

fn method_not_allowed() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "application/json")
        .body(
            serde_json::json!({"error": "Method not allowed"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}

/// Ids are plain decimal digits; anything else never matches a route
fn parse_id(raw: &str) -> Option<TaskId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn is_htmx(event: &Request) -> bool {
    event
        .headers()
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Main Lambda handler - REST API under /api, the board everywhere else
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    tracing::info!("🚀 Task board invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == Method::OPTIONS {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp));
    }

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let resp = match parts.as_slice() {
        ["api", api_parts @ ..] => api_routes(&event, &state, api_parts).await,
        _ => board_routes(&event, &state, &parts).await,
    };
    resp.map(with_cors_headers)
}

/// /api/tasks/...
async fn api_routes(
    event: &Request,
    state: &AppState,
    parts: &[&str],
) -> Result<Response<Body>, Error> {
    let store = &state.store;
    let method = event.method();
    let body = event.body();

    match (method, parts) {
        (&Method::GET, ["tasks"]) => rest::list_tasks(store, event.uri().query()).await,
        (&Method::POST, ["tasks"]) => rest::create_task(store, body).await,
        (_, ["tasks"]) => method_not_allowed(),

        (_, ["tasks", raw_id, action @ ..]) => {
            let Some(task_id) = parse_id(raw_id) else {
                return not_found();
            };
            match (method, action) {
                (&Method::GET, []) => rest::get_task(store, task_id).await,
                (&Method::PUT, []) => rest::replace_task(store, task_id, body).await,
                (&Method::PATCH, []) => rest::patch_task(store, task_id, body).await,
                (&Method::DELETE, []) => rest::delete_task(store, task_id).await,
                (&Method::POST, ["toggle"]) => rest::toggle_task(store, task_id).await,
                (&Method::DELETE, ["purge"]) => {
                    rest::purge_task(store, task_id, state.config.allow_purge).await
                }
                (_, [] | ["toggle"] | ["purge"]) => method_not_allowed(),
                _ => not_found(),
            }
        }

        _ => not_found(),
    }
}

/// The htmx board and dashboard
async fn board_routes(
    event: &Request,
    state: &AppState,
    parts: &[&str],
) -> Result<Response<Body>, Error> {
    let board = &state.board;
    let method = event.method();
    let body = event.body();

    match (method, parts) {
        (&Method::GET, []) => views::home(board, is_htmx(event)).await,
        (&Method::GET, ["dashboard"]) => views::dashboard(board).await,
        (&Method::POST, ["add-task"]) => views::add_task(board, body).await,
        (_, [] | ["dashboard"] | ["add-task"]) => method_not_allowed(),

        (_, [page @ ("update-task" | "toggle-task" | "delete-task" | "edit-task"), raw_id]) => {
            let Some(task_id) = parse_id(raw_id) else {
                return views::not_found_page(board, "Page not found.");
            };
            match (method, *page) {
                (&Method::POST | &Method::PUT, "update-task") => {
                    views::update_task(board, task_id, body).await
                }
                (&Method::POST, "toggle-task") => views::toggle_task(board, task_id).await,
                (&Method::POST | &Method::DELETE, "delete-task") => {
                    views::delete_task(board, task_id).await
                }
                (&Method::GET, "edit-task") => views::edit_task_form(board, task_id).await,
                _ => method_not_allowed(),
            }
        }

        _ => views::not_found_page(board, "Page not found."),
    }
}
