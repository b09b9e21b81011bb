//! Status transitions for a single task.
//!
//! A task carries two independent flags, `completed` and `deleted`, so it can
//! be in four states. Display collapses them into three buckets because
//! `deleted` dominates. Every transition here is legal in every state:
//!
//! - `toggle` flips `completed` and never touches `deleted`
//! - `soft_delete` sets `deleted`; nothing clears it again
//! - `edit` rewrites title/description and keeps both flags
//!
//! These functions are pure. The service fetches the row, applies one of them
//! and saves the result, so every store backend shares the same rules.

use chrono::{DateTime, Utc};

use super::error::TaskError;
use super::model::{PatchTaskPayload, ReplaceTaskPayload, Task, TaskId};

/// Trim a title and reject it when nothing is left
pub fn normalize_title(raw: &str) -> Result<String, TaskError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TaskError::Validation("title must not be blank".to_string()));
    }
    Ok(title.to_string())
}

/// Fresh task in the initial `{pending, active}` state
pub fn new_task(
    id: TaskId,
    title: &str,
    description: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Task, TaskError> {
    Ok(Task {
        id,
        title: normalize_title(title)?,
        description: description.unwrap_or_default().to_string(),
        completed: false,
        deleted: false,
        created_at: now,
        updated_at: now,
    })
}

pub fn edit(
    task: &mut Task,
    title: &str,
    description: &str,
    now: DateTime<Utc>,
) -> Result<(), TaskError> {
    task.title = normalize_title(title)?;
    task.description = description.to_string();
    task.updated_at = now;
    Ok(())
}

/// Full replacement. Flags come from the payload, whatever was stored.
pub fn replace(
    task: &mut Task,
    payload: &ReplaceTaskPayload,
    now: DateTime<Utc>,
) -> Result<(), TaskError> {
    task.title = normalize_title(&payload.title)?;
    task.description = payload.description.clone();
    task.completed = payload.completed;
    task.deleted = payload.deleted;
    task.updated_at = now;
    Ok(())
}

pub fn patch(
    task: &mut Task,
    payload: &PatchTaskPayload,
    now: DateTime<Utc>,
) -> Result<(), TaskError> {
    // Validate before touching anything so a bad title leaves the task intact
    let title = payload.title.as_deref().map(normalize_title).transpose()?;

    if let Some(title) = title {
        task.title = title;
    }
    if let Some(description) = &payload.description {
        task.description = description.clone();
    }
    if let Some(completed) = payload.completed {
        task.completed = completed;
    }
    if let Some(deleted) = payload.deleted {
        task.deleted = deleted;
    }
    task.updated_at = now;
    Ok(())
}

pub fn toggle(task: &mut Task, now: DateTime<Utc>) {
    task.completed = !task.completed;
    task.updated_at = now;
}

/// Idempotent: deleting a deleted task only refreshes `updated_at`.
pub fn soft_delete(task: &mut Task, now: DateTime<Utc>) {
    task.deleted = true;
    task.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::model::Bucket;
    use chrono::Duration;
    use rstest::{fixture, rstest};

    #[fixture]
    fn task() -> Task {
        new_task(1, "Buy milk", None, Utc::now()).unwrap()
    }

    #[rstest]
    #[case("Buy milk", "Buy milk")]
    #[case("  padded  ", "padded")]
    #[case("\tTabs\n", "Tabs")]
    fn normalize_title_trims(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_title(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("  ")]
    #[case("\n\t ")]
    fn normalize_title_rejects_blank(#[case] raw: &str) {
        assert!(matches!(normalize_title(raw), Err(TaskError::Validation(_))));
    }

    #[rstest]
    fn new_task_starts_pending_and_active(task: Task) {
        assert!(!task.completed);
        assert!(!task.deleted);
        assert_eq!(task.description, "");
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(task.bucket(), Bucket::Pending);
    }

    #[rstest]
    fn toggle_twice_restores_completed(mut task: Task) {
        let before = task.completed;
        toggle(&mut task, Utc::now());
        assert_ne!(task.completed, before);
        toggle(&mut task, Utc::now());
        assert_eq!(task.completed, before);
    }

    #[rstest]
    fn toggle_does_not_touch_deleted(mut task: Task) {
        soft_delete(&mut task, Utc::now());
        toggle(&mut task, Utc::now());
        assert!(task.deleted);
        assert!(task.completed);
        assert_eq!(task.bucket(), Bucket::Deleted);
    }

    #[rstest]
    fn soft_delete_is_idempotent_and_keeps_completed(mut task: Task) {
        toggle(&mut task, Utc::now());
        soft_delete(&mut task, Utc::now());
        soft_delete(&mut task, Utc::now());
        assert!(task.deleted);
        assert!(task.completed);
    }

    #[rstest]
    #[case(false, false, Bucket::Pending)]
    #[case(true, false, Bucket::Completed)]
    #[case(false, true, Bucket::Deleted)]
    #[case(true, true, Bucket::Deleted)]
    fn deleted_dominates_bucket(
        mut task: Task,
        #[case] completed: bool,
        #[case] deleted: bool,
        #[case] expected: Bucket,
    ) {
        task.completed = completed;
        task.deleted = deleted;
        assert_eq!(task.bucket(), expected);
    }

    #[rstest]
    fn edit_keeps_flags_and_refreshes_updated_at(mut task: Task) {
        let created = task.created_at;
        toggle(&mut task, created);
        let later = created + Duration::seconds(5);
        edit(&mut task, " Buy oat milk ", "2 litres", later).unwrap();
        assert_eq!(task.title, "Buy oat milk");
        assert_eq!(task.description, "2 litres");
        assert!(task.completed);
        assert_eq!(task.updated_at, later);
        assert_ne!(task.created_at, task.updated_at);
    }

    #[rstest]
    fn edit_with_blank_title_leaves_task_untouched(mut task: Task) {
        let before = task.clone();
        assert!(edit(&mut task, "   ", "ignored", Utc::now()).is_err());
        assert_eq!(task, before);
    }

    #[rstest]
    fn replace_resets_omitted_flags(mut task: Task) {
        toggle(&mut task, Utc::now());
        soft_delete(&mut task, Utc::now());
        let payload: ReplaceTaskPayload =
            serde_json::from_str(r#"{"title": "Renamed"}"#).unwrap();
        replace(&mut task, &payload, Utc::now()).unwrap();
        assert_eq!(task.title, "Renamed");
        assert!(!task.completed);
        assert!(!task.deleted);
    }

    #[rstest]
    fn patch_only_touches_given_fields(mut task: Task) {
        toggle(&mut task, Utc::now());
        let payload = PatchTaskPayload {
            description: Some("from the corner shop".to_string()),
            ..Default::default()
        };
        patch(&mut task, &payload, Utc::now()).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "from the corner shop");
        assert!(task.completed);
    }

    #[rstest]
    fn patch_with_blank_title_is_rejected_whole(mut task: Task) {
        let before = task.clone();
        let payload = PatchTaskPayload {
            title: Some(" ".to_string()),
            completed: Some(true),
            ..Default::default()
        };
        assert!(patch(&mut task, &payload, Utc::now()).is_err());
        assert_eq!(task, before);
    }
}
