use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoClient;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::error::TaskError;
use super::model::{Task, TaskId};

const TASK_PK: &str = "TASK";
const TASK_SK_PREFIX: &str = "TASK#";
const COUNTER_PK: &str = "COUNTER";
const COUNTER_SK: &str = "TASK";

type Item = HashMap<String, AttributeValue>;

/// DynamoDB-backed rows, single-table layout:
/// `PK = "TASK"`, `SK = "TASK#<zero-padded id>"`, plus one counter item.
#[derive(Clone, Debug)]
pub struct DynamoTaskStore {
    client: DynamoClient,
    table_name: String,
}

fn sort_key(id: TaskId) -> String {
    // Zero padding keeps the lexical SK order equal to the numeric id order
    format!("{}{:012}", TASK_SK_PREFIX, id)
}

fn task_to_item(task: &Task) -> Item {
    HashMap::from([
        ("PK".to_string(), AttributeValue::S(TASK_PK.to_string())),
        ("SK".to_string(), AttributeValue::S(sort_key(task.id))),
        ("task_id".to_string(), AttributeValue::N(task.id.to_string())),
        ("title".to_string(), AttributeValue::S(task.title.clone())),
        ("description".to_string(), AttributeValue::S(task.description.clone())),
        ("completed".to_string(), AttributeValue::Bool(task.completed)),
        ("deleted".to_string(), AttributeValue::Bool(task.deleted)),
        ("created_at".to_string(), AttributeValue::S(task.created_at.to_rfc3339())),
        ("updated_at".to_string(), AttributeValue::S(task.updated_at.to_rfc3339())),
    ])
}

fn string_attr(item: &Item, name: &str) -> String {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

fn bool_attr(item: &Item, name: &str) -> bool {
    item.get(name)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .unwrap_or(false)
}

fn timestamp_attr(item: &Item, name: &str) -> Result<DateTime<Utc>, TaskError> {
    let raw = string_attr(item, name);
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| TaskError::Storage(format!("bad {} '{}': {}", name, raw, e)))
}

fn task_from_item(item: &Item) -> Result<Task, TaskError> {
    let id = item
        .get("task_id")
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse::<TaskId>().ok())
        .ok_or_else(|| TaskError::Storage("task item without numeric task_id".to_string()))?;

    Ok(Task {
        id,
        title: string_attr(item, "title"),
        description: string_attr(item, "description"),
        completed: bool_attr(item, "completed"),
        deleted: bool_attr(item, "deleted"),
        created_at: timestamp_attr(item, "created_at")?,
        updated_at: timestamp_attr(item, "updated_at")?,
    })
}

impl DynamoTaskStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Atomically bump the task counter and return the new value
    pub async fn allocate_id(&self) -> Result<TaskId, TaskError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(COUNTER_PK.to_string()))
            .key("SK", AttributeValue::S(COUNTER_SK.to_string()))
            .update_expression("ADD next_id :one")
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|e| TaskError::Storage(format!("DynamoDB update_item error: {}", e)))?;

        result
            .attributes()
            .and_then(|attrs| attrs.get("next_id"))
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| TaskError::Storage("counter update returned no next_id".to_string()))
    }

    pub async fn insert(&self, task: &Task) -> Result<(), TaskError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(task_to_item(task)))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await
            .map_err(|e| TaskError::Storage(format!("DynamoDB put_item error: {}", e)))?;
        Ok(())
    }

    pub async fn fetch(&self, id: TaskId) -> Result<Task, TaskError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(TASK_PK.to_string()))
            .key("SK", AttributeValue::S(sort_key(id)))
            .send()
            .await
            .map_err(|e| TaskError::Storage(format!("DynamoDB get_item error: {}", e)))?;

        match result.item() {
            Some(item) => task_from_item(item),
            None => Err(TaskError::NotFound(id)),
        }
    }

    /// Overwrite an existing row. Last write wins; a missing row is `NotFound`.
    pub async fn save(&self, task: &Task) -> Result<(), TaskError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(task_to_item(task)))
            .condition_expression("attribute_exists(PK)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(TaskError::NotFound(task.id))
            }
            Err(e) => Err(TaskError::Storage(format!("DynamoDB put_item error: {}", e))),
        }
    }

    /// Physically delete a row
    pub async fn remove(&self, id: TaskId) -> Result<(), TaskError> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(TASK_PK.to_string()))
            .key("SK", AttributeValue::S(sort_key(id)))
            .condition_expression("attribute_exists(PK)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(TaskError::NotFound(id))
            }
            Err(e) => Err(TaskError::Storage(format!("DynamoDB delete_item error: {}", e))),
        }
    }

    /// Every task row, in SK (id) order
    pub async fn scan_all(&self) -> Result<Vec<Task>, TaskError> {
        let mut tasks = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
                .expression_attribute_values(":pk", AttributeValue::S(TASK_PK.to_string()))
                .expression_attribute_values(
                    ":sk_prefix",
                    AttributeValue::S(TASK_SK_PREFIX.to_string()),
                )
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| TaskError::Storage(format!("DynamoDB query error: {}", e)))?;

            for item in result.items() {
                tasks.push(task_from_item(item)?);
            }

            match result.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(tasks)
    }
}
