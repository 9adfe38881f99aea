//! Extract-tasks prompt template.
//!
//! Turns free-text notes into a JSON array of task candidates.

use serde::Serialize;

use super::PromptTemplate;

/// Context for the extract-tasks prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractTasksContext<'a> {
    /// Raw notes supplied by the user
    pub content: &'a str,
}

/// Get the extract-tasks template.
pub fn template() -> PromptTemplate {
    PromptTemplate::new("extract-tasks", PROMPT)
        .with_description("Identify actionable tasks in free-form notes")
}

const PROMPT: &str = r"Extract tasks from the following content. For each task, identify:
1. Title (short description of the task)
2. Description (more details if available)
3. Priority (low, medium, high) based on urgency
4. Due date if mentioned (in YYYY-MM-DD format)

Format the output as a JSON array of tasks with these fields.
If no tasks are found, return an empty array.

Content:
{{content}}
";
