use serde::Deserialize;

/// Form-encoded task fields as posted by the board.
///
/// Missing fields read as empty strings; both fields are trimmed.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl TaskForm {
    /// Lenient parse: an unreadable body is treated as an empty form
    pub fn parse(body: &[u8]) -> Self {
        let form: TaskForm = serde_urlencoded::from_bytes(body).unwrap_or_else(|e| {
            tracing::warn!("Unreadable task form, treating it as empty: {}", e);
            TaskForm::default()
        });
        TaskForm {
            title: form.title.trim().to_string(),
            description: form.description.trim().to_string(),
        }
    }
}
