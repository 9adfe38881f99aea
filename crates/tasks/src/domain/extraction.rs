//! Task extraction from free-text notes.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::ai::prompts::extract_tasks::{self, ExtractTasksContext};
use crate::ai::{AIMessage, AIProvider, GenerateOptions};
use crate::entities::{parse_date, TaskDraft, TaskPriority, TaskSource, TaskStatus};
use crate::errors::{TasksError, TasksResult};

/// Longest title kept from a model reply
pub const MAX_TITLE_CHARS: usize = 200;

/// Longest description kept from a model reply
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

/// First `[` through last `]`, across lines.
static JSON_ARRAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

/// Turns notes into task drafts with one model call.
pub struct TaskExtractor {
    provider: Arc<dyn AIProvider>,
    model: String,
}

impl TaskExtractor {
    pub fn new(provider: Arc<dyn AIProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Extract drafts from `content`.
    ///
    /// Empty content is a validation error. Provider failures propagate.
    /// An unreadable reply yields an empty list.
    #[instrument(skip(self, content), fields(chars = content.len(), model = %self.model))]
    pub async fn extract(&self, content: &str) -> TasksResult<Vec<TaskDraft>> {
        if content.is_empty() {
            return Err(TasksError::validation("Content is required"));
        }

        let prompt = extract_tasks::template().render(&ExtractTasksContext { content })?;
        let response = self
            .provider
            .generate_text(
                &self.model,
                &[AIMessage::user(prompt)],
                &GenerateOptions::default(),
            )
            .await?;

        let drafts = parse_extracted_tasks(&response.text, Utc::now());
        info!(
            count = drafts.len(),
            tokens = response.usage.total_tokens,
            "Extracted tasks"
        );
        Ok(drafts)
    }
}

/// The greedy `[` … `]` span of `text`, if any.
pub fn extract_json_array(text: &str) -> Option<&str> {
    JSON_ARRAY.find(text).map(|m| m.as_str())
}

/// The first bracketed span whose brackets balance, ignoring brackets in strings.
fn balanced_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a model reply into drafts stamped with extraction metadata.
///
/// Never fails: a reply with no parseable array gives an empty list.
pub fn parse_extracted_tasks(text: &str, now: DateTime<Utc>) -> Vec<TaskDraft> {
    let Some(candidate) = extract_json_array(text) else {
        debug!("No JSON array in model reply");
        return Vec::new();
    };

    let items = match serde_json::from_str::<Vec<Value>>(candidate) {
        Ok(items) => items,
        Err(err) => {
            match balanced_array(text).and_then(|span| serde_json::from_str::<Vec<Value>>(span).ok())
            {
                Some(items) => {
                    debug!(error = %err, "Greedy match unparseable, used first balanced array");
                    items
                }
                None => {
                    warn!(error = %err, "Error parsing tasks from model reply");
                    return Vec::new();
                }
            }
        }
    };

    let total = items.len();
    let drafts: Vec<TaskDraft> = items
        .iter()
        .filter_map(|item| draft_from_value(item, now))
        .collect();
    if drafts.len() < total {
        warn!(
            dropped = total - drafts.len(),
            "Dropped extracted items without a usable title"
        );
    }
    drafts
}

fn draft_from_value(item: &Value, now: DateTime<Utc>) -> Option<TaskDraft> {
    let fields = item.as_object()?;

    let title = field_str(fields, "title")?.trim();
    if title.is_empty() {
        return None;
    }

    let description = field_str(fields, "description")
        .map(|d| truncate_chars(d.trim(), MAX_DESCRIPTION_CHARS))
        .unwrap_or_default();

    let priority = field_str(fields, "priority")
        .and_then(|p| p.trim().to_lowercase().parse::<TaskPriority>().ok())
        .unwrap_or_default();

    let due_date = field_str(fields, "duedate")
        .or_else(|| field_str(fields, "due"))
        .and_then(parse_date);

    Some(TaskDraft {
        title: truncate_chars(title, MAX_TITLE_CHARS),
        description,
        priority,
        due_date,
        source: TaskSource::AiExtraction,
        status: TaskStatus::Todo,
        created_at: Some(now),
    })
}

/// Look a string field up by name, ignoring case, `_`, `-` and spaces.
fn field_str<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| {
            let normalized: String = key
                .chars()
                .filter(|c| !matches!(c, '_' | '-' | ' '))
                .flat_map(char::to_lowercase)
                .collect();
            normalized == name
        })
        .and_then(|(_, value)| value.as_str())
}

fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].trim_end().to_string(),
        None => value.to_string(),
    }
}
