//! Row shapes of the `tasks` table and their mapping to entities.
//!
//! Columns are snake_case and everything except `id`, `title`, `status`,
//! `priority` and `created_at` may be null.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::traits::NewTask;
use crate::entities::{parse_date, Task, TaskPatch, TaskPriority, TaskSource, TaskStatus};

/// A row as returned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hours_spent: Option<f64>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            priority: row.priority.unwrap_or_default(),
            status: row.status.unwrap_or_default(),
            due_date: row.due_date.as_deref().and_then(parse_date),
            updated_at: row.updated_at.unwrap_or(row.created_at),
            created_at: row.created_at,
            completed_at: row.completed_at,
            hours_spent: row.hours_spent,
            user_id: row.user_email.unwrap_or_default(),
            source: row.source.map(TaskSource::from).unwrap_or_default(),
        }
    }
}

/// Insert payload.
#[derive(Debug, Clone, Serialize)]
pub struct NewTaskRow {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub hours_spent: Option<f64>,
    pub user_email: String,
    pub source: String,
}

impl From<NewTask> for NewTaskRow {
    fn from(task: NewTask) -> Self {
        Self {
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
            created_at: task.created_at,
            updated_at: task.updated_at,
            completed_at: task.completed_at,
            hours_spent: task.hours_spent,
            user_email: task.user_id,
            source: task.source.into(),
        }
    }
}

/// Update payload; absent fields are omitted, cleared fields are sent as null.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskRowPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_spent: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl From<&TaskPatch> for TaskRowPatch {
    fn from(patch: &TaskPatch) -> Self {
        Self {
            title: patch.title.clone(),
            description: patch.description.clone(),
            priority: patch.priority,
            status: patch.status,
            due_date: patch.due_date,
            updated_at: patch.updated_at,
            completed_at: patch.completed_at,
            hours_spent: patch.hours_spent,
            source: patch.source.clone().map(String::from),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Accepts `timestamptz` (RFC 3339) and zone-less `timestamp` columns, the
/// latter read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
    }
}
