use chrono::Utc;

use super::error::TaskError;
use super::model::{
    Bucket, BucketCounts, BucketFilter, PatchTaskPayload, ReplaceTaskPayload, SortOrder, Task,
    TaskId,
};
use super::status;
use super::store::TaskStore;

/// Create a task in the `{pending, active}` state
pub async fn create_task(
    store: &TaskStore,
    title: &str,
    description: Option<&str>,
) -> Result<Task, TaskError> {
    // Validate before allocating so blank titles never burn an id
    status::normalize_title(title)?;

    let id = store.allocate_id().await?;
    let task = status::new_task(id, title, description, Utc::now())?;
    store.insert(&task).await?;

    tracing::info!(task_id = task.id, "task created");
    Ok(task)
}

pub async fn get_task(store: &TaskStore, id: TaskId) -> Result<Task, TaskError> {
    store.fetch(id).await
}

/// Rewrite title and description; `completed` and `deleted` are preserved
pub async fn update_task(
    store: &TaskStore,
    id: TaskId,
    title: &str,
    description: &str,
) -> Result<Task, TaskError> {
    let mut task = store.fetch(id).await?;
    status::edit(&mut task, title, description, Utc::now())?;
    store.save(&task).await?;
    Ok(task)
}

/// Full replacement as sent by a PUT
pub async fn replace_task(
    store: &TaskStore,
    id: TaskId,
    payload: &ReplaceTaskPayload,
) -> Result<Task, TaskError> {
    let mut task = store.fetch(id).await?;
    status::replace(&mut task, payload, Utc::now())?;
    store.save(&task).await?;
    Ok(task)
}

pub async fn patch_task(
    store: &TaskStore,
    id: TaskId,
    payload: &PatchTaskPayload,
) -> Result<Task, TaskError> {
    let mut task = store.fetch(id).await?;
    status::patch(&mut task, payload, Utc::now())?;
    store.save(&task).await?;
    Ok(task)
}

pub async fn toggle_task(store: &TaskStore, id: TaskId) -> Result<Task, TaskError> {
    let mut task = store.fetch(id).await?;
    status::toggle(&mut task, Utc::now());
    store.save(&task).await?;

    tracing::info!(task_id = id, completed = task.completed, "task toggled");
    Ok(task)
}

/// Soft delete. Deleting an already deleted task succeeds.
pub async fn delete_task(store: &TaskStore, id: TaskId) -> Result<Task, TaskError> {
    let mut task = store.fetch(id).await?;
    status::soft_delete(&mut task, Utc::now());
    store.save(&task).await?;

    tracing::info!(task_id = id, "task soft-deleted");
    Ok(task)
}

/// Hard delete: the row is gone afterwards. Only reachable through the
/// explicitly enabled purge endpoint.
pub async fn purge_task(store: &TaskStore, id: TaskId) -> Result<(), TaskError> {
    store.remove(id).await?;
    tracing::warn!(task_id = id, "task purged");
    Ok(())
}

/// The one listing query: filter by bucket, then order by `created_at`
pub async fn list_tasks(
    store: &TaskStore,
    filter: BucketFilter,
    order: SortOrder,
) -> Result<Vec<Task>, TaskError> {
    let mut tasks: Vec<Task> = store
        .scan_all()
        .await?
        .into_iter()
        .filter(|task| filter.matches(task))
        .collect();

    tasks.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
    if order == SortOrder::Newest {
        tasks.reverse();
    }
    Ok(tasks)
}

/// Pending, completed and deleted columns as shown on the board, newest first.
///
/// Three separate reads; they are not a consistent snapshot of each other.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BoardColumns {
    pub pending: Vec<Task>,
    pub completed: Vec<Task>,
    pub deleted: Vec<Task>,
}

impl BoardColumns {
    pub fn counts(&self) -> BucketCounts {
        BucketCounts {
            pending: self.pending.len(),
            completed: self.completed.len(),
            deleted: self.deleted.len(),
        }
    }
}

pub async fn load_board_columns(store: &TaskStore) -> Result<BoardColumns, TaskError> {
    Ok(BoardColumns {
        pending: list_tasks(store, Bucket::Pending.into(), SortOrder::Newest).await?,
        completed: list_tasks(store, Bucket::Completed.into(), SortOrder::Newest).await?,
        deleted: list_tasks(store, Bucket::Deleted.into(), SortOrder::Newest).await?,
    })
}

pub async fn count_buckets(store: &TaskStore) -> Result<BucketCounts, TaskError> {
    let tasks = store.scan_all().await?;
    Ok(BucketCounts::tally(&tasks))
}

const DEMO_TASKS: [(&str, &str); 9] = [
    ("Set up the workspace", "Install the toolchain and prepare the base project."),
    ("Define the Task model", "Create the data structure that stores tasks."),
    ("Load demo data", "Check that the seeded tasks show up."),
    ("Design the first screen", "Build the main view with the three columns."),
    ("Add interactivity", "Update the board without reloading the page."),
    ("Expose the REST API", "Add endpoints for the CRUD operations."),
    ("Analytics dashboard", "Chart the task counts per bucket."),
    ("Walk through the user flow", "Try every task action and the navigation."),
    ("Write the README", "Record technical decisions, trade-offs and open points."),
];

/// Fill an empty store with demo tasks. Returns how many were created.
pub async fn seed_demo_tasks(store: &TaskStore) -> Result<usize, TaskError> {
    if !store.scan_all().await?.is_empty() {
        return Ok(0);
    }
    for (title, description) in DEMO_TASKS {
        create_task(store, title, Some(description)).await?;
    }
    tracing::info!(count = DEMO_TASKS.len(), "seeded demo tasks");
    Ok(DEMO_TASKS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> TaskStore {
        TaskStore::memory()
    }

    async fn titles(store: &TaskStore, filter: BucketFilter, order: SortOrder) -> Vec<String> {
        list_tasks(store, filter, order)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect()
    }

    #[rstest]
    #[tokio::test]
    async fn buy_milk_walks_through_all_buckets(store: TaskStore) {
        let task = create_task(&store, "Buy milk", None).await.unwrap();
        assert!(!task.completed && !task.deleted);
        assert_eq!(titles(&store, BucketFilter::Pending, SortOrder::Newest).await, ["Buy milk"]);

        toggle_task(&store, task.id).await.unwrap();
        let columns = load_board_columns(&store).await.unwrap();
        assert!(columns.pending.is_empty());
        assert_eq!(columns.completed.len(), 1);

        let deleted = delete_task(&store, task.id).await.unwrap();
        assert!(deleted.completed, "completed flag survives deletion");
        let columns = load_board_columns(&store).await.unwrap();
        assert!(columns.pending.is_empty());
        assert!(columns.completed.is_empty());
        assert_eq!(columns.deleted.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn whitespace_title_creates_nothing(store: TaskStore) {
        let before = count_buckets(&store).await.unwrap();
        let err = create_task(&store, "  ", None).await.unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
        assert_eq!(count_buckets(&store).await.unwrap(), before);

        // No id was consumed by the rejected create
        let task = create_task(&store, "First", None).await.unwrap();
        assert_eq!(task.id, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_twice_is_idempotent(store: TaskStore) {
        let task = create_task(&store, "Once", None).await.unwrap();
        delete_task(&store, task.id).await.unwrap();
        let again = delete_task(&store, task.id).await.unwrap();
        assert!(again.deleted);
        assert_eq!(count_buckets(&store).await.unwrap().deleted, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn deleted_task_stays_toggleable_and_editable(store: TaskStore) {
        let task = create_task(&store, "Ghost", None).await.unwrap();
        delete_task(&store, task.id).await.unwrap();

        let toggled = toggle_task(&store, task.id).await.unwrap();
        assert!(toggled.completed && toggled.deleted);

        let edited = update_task(&store, task.id, "Renamed ghost", "").await.unwrap();
        assert_eq!(edited.title, "Renamed ghost");
        assert!(edited.deleted);
        assert_eq!(titles(&store, BucketFilter::Deleted, SortOrder::Oldest).await, ["Renamed ghost"]);
    }

    #[rstest]
    #[tokio::test]
    async fn blank_update_keeps_title(store: TaskStore) {
        let task = create_task(&store, "X", None).await.unwrap();
        let err = update_task(&store, task.id, "   ", "new").await.unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
        let reread = get_task(&store, task.id).await.unwrap();
        assert_eq!(reread.title, "X");
        assert_eq!(reread.description, "");
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_ids_are_not_found(store: TaskStore) {
        assert_eq!(get_task(&store, 7).await.unwrap_err(), TaskError::NotFound(7));
        assert_eq!(toggle_task(&store, 7).await.unwrap_err(), TaskError::NotFound(7));
        assert_eq!(delete_task(&store, 7).await.unwrap_err(), TaskError::NotFound(7));
        assert_eq!(
            update_task(&store, 7, "t", "").await.unwrap_err(),
            TaskError::NotFound(7)
        );
        assert_eq!(purge_task(&store, 7).await.unwrap_err(), TaskError::NotFound(7));
    }

    #[rstest]
    #[tokio::test]
    async fn purge_removes_the_row(store: TaskStore) {
        let task = create_task(&store, "Temporary", None).await.unwrap();
        purge_task(&store, task.id).await.unwrap();
        assert_eq!(count_buckets(&store).await.unwrap().total(), 0);
        assert!(matches!(get_task(&store, task.id).await, Err(TaskError::NotFound(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn listing_order_follows_sort_order(store: TaskStore) {
        for title in ["first", "second", "third"] {
            create_task(&store, title, None).await.unwrap();
        }
        assert_eq!(
            titles(&store, BucketFilter::All, SortOrder::Oldest).await,
            ["first", "second", "third"]
        );
        assert_eq!(
            titles(&store, BucketFilter::All, SortOrder::Newest).await,
            ["third", "second", "first"]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn counts_match_buckets(store: TaskStore) {
        let mut ids = Vec::new();
        for n in 0..6 {
            ids.push(create_task(&store, &format!("task {n}"), None).await.unwrap().id);
        }
        toggle_task(&store, ids[0]).await.unwrap();
        toggle_task(&store, ids[1]).await.unwrap();
        delete_task(&store, ids[2]).await.unwrap();

        let counts = count_buckets(&store).await.unwrap();
        assert_eq!(counts, BucketCounts { pending: 3, completed: 2, deleted: 1 });
        assert_eq!(load_board_columns(&store).await.unwrap().counts(), counts);
    }

    #[rstest]
    #[tokio::test]
    async fn seeding_only_fills_an_empty_store(store: TaskStore) {
        assert_eq!(seed_demo_tasks(&store).await.unwrap(), 9);
        assert_eq!(seed_demo_tasks(&store).await.unwrap(), 0);
        assert_eq!(count_buckets(&store).await.unwrap().pending, 9);
    }
}
