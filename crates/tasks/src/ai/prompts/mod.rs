//! Prompt templates rendered with Handlebars.

pub mod extract_tasks;

use handlebars::Handlebars;
use serde::Serialize;

use crate::errors::{TasksError, TasksResult};

/// A named prompt body with `{{placeholders}}`.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub description: &'static str,
    body: &'static str,
}

impl PromptTemplate {
    pub fn new(name: &'static str, body: &'static str) -> Self {
        Self {
            name,
            description: "",
            body,
        }
    }

    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Render the body with `context`.
    ///
    /// Values are inserted verbatim; user notes must reach the model unescaped.
    pub fn render<T: Serialize>(&self, context: &T) -> TasksResult<String> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .render_template(self.body, context)
            .map_err(|e| TasksError::Ai(format!("Failed to render prompt '{}': {e}", self.name)))
    }
}
