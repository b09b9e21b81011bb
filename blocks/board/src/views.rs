use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::Serialize;
use taskboard_atoms::tasks::{self, BoardColumns, BucketCounts, Task, TaskError, TaskId};

use crate::dashboard::{build_charts, Charts, DashboardStats};
use crate::error::{FailurePolicy, MutationError};
use crate::forms::TaskForm;
use crate::Board;

const COLUMNS_TEMPLATE: &str = "partials/all_columns.html";

fn html_response(status: StatusCode, html: String) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Access-Control-Allow-Origin", "*")
        .body(html.into())
        .map_err(Box::new)?)
}

#[derive(Serialize)]
struct ColumnsContext<'a> {
    columns: &'a BoardColumns,
    counts: BucketCounts,
    notice: Option<String>,
}

#[derive(Serialize)]
struct EditContext<'a> {
    task: &'a Task,
}

#[derive(Serialize)]
struct DashboardContext {
    stats: DashboardStats,
    charts: Charts,
}

#[derive(Serialize)]
struct NotFoundContext<'a> {
    message: &'a str,
}

/// Re-read all three buckets and render them with `template`
async fn render_columns(
    board: &Board,
    template: &str,
    notice: Option<String>,
) -> Result<Response<Body>, Error> {
    let columns = match tasks::load_board_columns(&board.store).await {
        Ok(columns) => columns,
        Err(e) => {
            tracing::error!("Failed to load board columns: {}", e);
            return html_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"<div id="task-columns" role="alert">The board could not be loaded.</div>"#
                    .to_string(),
            );
        }
    };

    let context = ColumnsContext {
        counts: columns.counts(),
        columns: &columns,
        notice,
    };
    html_response(StatusCode::OK, board.renderer.render(template, &context)?)
}

/// Log the outcome of a mutation and decide whether the user sees a notice
fn settle(
    board: &Board,
    action: &'static str,
    task_id: Option<TaskId>,
    outcome: Result<Task, MutationError>,
) -> Option<String> {
    let mode = board.gateway.mode();
    let err = match outcome {
        Ok(task) => {
            tracing::info!(action, task_id = task.id, ?mode, "Board mutation applied");
            return None;
        }
        Err(err) => err,
    };

    match &err {
        MutationError::Validation(_) | MutationError::NotFound(_) => {
            tracing::warn!(action, ?task_id, ?mode, error = %err, "Board mutation skipped")
        }
        MutationError::Upstream(_) | MutationError::Storage(_) => {
            tracing::error!(action, ?task_id, ?mode, error = %err, "Board mutation failed")
        }
    }

    match board.policy {
        FailurePolicy::Swallow => None,
        FailurePolicy::Surface => Some(err.notice()),
    }
}

/// GET / - full page, or only the columns for htmx requests
pub async fn home(board: &Board, htmx: bool) -> Result<Response<Body>, Error> {
    let template = if htmx { COLUMNS_TEMPLATE } else { "home.html" };
    render_columns(board, template, None).await
}

/// POST /add-task/
pub async fn add_task(board: &Board, body: &[u8]) -> Result<Response<Body>, Error> {
    let form = TaskForm::parse(body);
    let outcome = board.gateway.create(&form).await;
    let notice = settle(board, "create", None, outcome);
    render_columns(board, COLUMNS_TEMPLATE, notice).await
}

/// POST|PUT /update-task/{id}/
pub async fn update_task(board: &Board, task_id: TaskId, body: &[u8]) -> Result<Response<Body>, Error> {
    let form = TaskForm::parse(body);
    let outcome = board.gateway.update(task_id, &form).await;
    let notice = settle(board, "update", Some(task_id), outcome);
    render_columns(board, COLUMNS_TEMPLATE, notice).await
}

/// POST /toggle-task/{id}/
pub async fn toggle_task(board: &Board, task_id: TaskId) -> Result<Response<Body>, Error> {
    let outcome = board.gateway.toggle(task_id).await;
    let notice = settle(board, "toggle", Some(task_id), outcome);
    render_columns(board, COLUMNS_TEMPLATE, notice).await
}

/// POST|DELETE /delete-task/{id}/ - soft delete
pub async fn delete_task(board: &Board, task_id: TaskId) -> Result<Response<Body>, Error> {
    let outcome = board.gateway.soft_delete(task_id).await;
    let notice = settle(board, "delete", Some(task_id), outcome);
    render_columns(board, COLUMNS_TEMPLATE, notice).await
}

/// GET /edit-task/{id}/ - inline edit form
pub async fn edit_task_form(board: &Board, task_id: TaskId) -> Result<Response<Body>, Error> {
    match tasks::get_task(&board.store, task_id).await {
        Ok(task) => html_response(
            StatusCode::OK,
            board
                .renderer
                .render("partials/edit_task_form.html", &EditContext { task: &task })?,
        ),
        Err(TaskError::NotFound(_)) => not_found_page(board, "That task does not exist."),
        Err(e) => {
            tracing::error!(task_id, "Failed to load task for editing: {}", e);
            html_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "<p role=\"alert\">The task could not be loaded.</p>".to_string(),
            )
        }
    }
}

/// GET /dashboard/
pub async fn dashboard(board: &Board) -> Result<Response<Body>, Error> {
    let counts = match tasks::count_buckets(&board.store).await {
        Ok(counts) => counts,
        Err(e) => {
            tracing::error!("Failed to count tasks for the dashboard: {}", e);
            return html_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "<p role=\"alert\">The dashboard could not be loaded.</p>".to_string(),
            );
        }
    };

    let context = DashboardContext {
        stats: DashboardStats::from_counts(counts),
        charts: build_charts(&counts),
    };
    html_response(StatusCode::OK, board.renderer.render("dashboard.html", &context)?)
}

pub fn not_found_page(board: &Board, message: &str) -> Result<Response<Body>, Error> {
    html_response(
        StatusCode::NOT_FOUND,
        board
            .renderer
            .render("not_found.html", &NotFoundContext { message })?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::TaskApiClient;
    use crate::gateway::MutationGateway;
    use rstest::{fixture, rstest};
    use taskboard_atoms::tasks::TaskStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[fixture]
    fn board() -> Board {
        Board::direct(TaskStore::memory(), FailurePolicy::Swallow).unwrap()
    }

    fn html(resp: &Response<Body>) -> String {
        String::from_utf8(resp.body().to_vec()).unwrap()
    }

    /// Number of task cards rendered inside the given bucket's column
    fn cards_in(page: &str, bucket: &str) -> usize {
        let marker = format!("data-bucket=\"{}\"", bucket);
        let section = page
            .split("<section")
            .find(|s| s.contains(&marker))
            .unwrap_or_default();
        section.matches("class=\"task-card").count()
    }

    #[rstest]
    #[tokio::test]
    async fn add_then_toggle_then_delete_moves_the_card(board: Board) {
        let resp = add_task(&board, b"title=Buy+milk").await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let page = html(&resp);
        assert!(page.contains("Buy milk"));
        assert_eq!(cards_in(&page, "pending"), 1);

        let page = html(&toggle_task(&board, 1).await.unwrap());
        assert_eq!(cards_in(&page, "pending"), 0);
        assert_eq!(cards_in(&page, "completed"), 1);

        let page = html(&delete_task(&board, 1).await.unwrap());
        assert_eq!(cards_in(&page, "completed"), 0);
        assert_eq!(cards_in(&page, "deleted"), 1);
        assert!(tasks::get_task(&board.store, 1).await.unwrap().completed);
    }

    #[rstest]
    #[tokio::test]
    async fn blank_title_is_silently_ignored(board: Board) {
        let resp = add_task(&board, b"title=++&description=x").await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let page = html(&resp);
        assert!(!page.contains("role=\"alert\""));
        assert_eq!(tasks::count_buckets(&board.store).await.unwrap().total(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn blank_update_keeps_the_old_title(board: Board) {
        add_task(&board, b"title=X").await.unwrap();
        let resp = update_task(&board, 1, b"title=&description=changed").await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let task = tasks::get_task(&board.store, 1).await.unwrap();
        assert_eq!(task.title, "X");
        assert_eq!(task.description, "");
    }

    #[rstest]
    #[tokio::test]
    async fn update_preserves_flags(board: Board) {
        add_task(&board, b"title=Draft").await.unwrap();
        toggle_task(&board, 1).await.unwrap();
        update_task(&board, 1, b"title=Final&description=signed").await.unwrap();
        let task = tasks::get_task(&board.store, 1).await.unwrap();
        assert_eq!(task.title, "Final");
        assert_eq!(task.description, "signed");
        assert!(task.completed);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_task_mutations_still_render(board: Board) {
        for resp in [
            toggle_task(&board, 404).await.unwrap(),
            delete_task(&board, 404).await.unwrap(),
            update_task(&board, 404, b"title=x").await.unwrap(),
        ] {
            assert_eq!(resp.status(), StatusCode::OK);
            assert!(html(&resp).contains("id=\"task-columns\""));
        }
    }

    #[rstest]
    #[tokio::test]
    async fn columns_are_newest_first(board: Board) {
        add_task(&board, b"title=older").await.unwrap();
        let page = html(&add_task(&board, b"title=newer").await.unwrap());
        let newer = page.find("newer").unwrap();
        let older = page.find("older").unwrap();
        assert!(newer < older);
    }

    #[rstest]
    #[tokio::test]
    async fn home_serves_page_or_fragment(board: Board) {
        let full = html(&home(&board, false).await.unwrap());
        assert!(full.contains("<!DOCTYPE html>"));
        assert!(full.contains("id=\"task-columns\""));

        let fragment = html(&home(&board, true).await.unwrap());
        assert!(!fragment.contains("<!DOCTYPE html>"));
        assert!(fragment.contains("id=\"task-columns\""));
    }

    #[rstest]
    #[tokio::test]
    async fn edit_form_is_prefilled_or_404(board: Board) {
        add_task(&board, b"title=Tidy+desk&description=before+friday").await.unwrap();

        let resp = edit_task_form(&board, 1).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let form = html(&resp);
        assert!(form.contains("value=\"Tidy desk\""));
        assert!(form.contains("before friday"));
        assert!(form.contains("hx-post=\"/update-task/1/\""));

        let missing = edit_task_form(&board, 2).await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn dashboard_reports_counts(board: Board) {
        for n in 1..=6 {
            add_task(&board, format!("title=task+{n}").as_bytes()).await.unwrap();
        }
        toggle_task(&board, 1).await.unwrap();
        toggle_task(&board, 2).await.unwrap();
        delete_task(&board, 3).await.unwrap();

        let resp = dashboard(&board).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let page = html(&resp);
        assert!(page.contains(r#"data-stat="total">6<"#));
        assert!(page.contains(r#"data-stat="active">5<"#));
        assert!(page.contains(r#"data-stat="completion_rate">40%<"#) || page.contains(r#"data-stat="completion_rate">40.0%<"#));
        assert!(page.contains("class=\"pie-chart\""));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_dashboard_shows_empty_state(board: Board) {
        let page = html(&dashboard(&board).await.unwrap());
        assert!(page.contains("No tasks yet."));
        assert!(page.contains(r#"data-stat="total">0<"#));
    }

    #[rstest]
    #[tokio::test]
    async fn surface_policy_adds_a_notice() {
        let board = Board::direct(TaskStore::memory(), FailurePolicy::Surface).unwrap();
        let page = html(&add_task(&board, b"title=").await.unwrap());
        assert!(page.contains("role=\"alert\""));
        assert!(page.contains("A task needs a title."));

        let page = html(&toggle_task(&board, 9).await.unwrap());
        assert!(page.contains("Task #9 no longer exists."));
    }

    #[rstest]
    #[tokio::test]
    async fn proxied_upstream_failure_renders_unchanged_state() {
        let store = TaskStore::memory();
        tasks::create_task(&store, "Pending one", None).await.unwrap();

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tasks/1/toggle/"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let board = Board::new(
            store.clone(),
            MutationGateway::Proxied {
                store: store.clone(),
                api: TaskApiClient::new(&server.uri(), None).unwrap(),
            },
            FailurePolicy::Swallow,
        )
        .unwrap();

        let resp = toggle_task(&board, 1).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let page = html(&resp);
        assert_eq!(cards_in(&page, "pending"), 1);
        assert!(!page.contains("role=\"alert\""));
        assert!(!tasks::get_task(&store, 1).await.unwrap().completed);
    }
}
