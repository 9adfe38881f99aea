//! Error types for the tasks crate.

use thiserror::Error;

/// Errors surfaced by the gateways, the extraction pipeline and the task board.
#[derive(Error, Debug, Clone)]
pub enum TasksError {
    // Validation errors
    #[error("{reason}")]
    Validation { reason: String },

    #[error("Invalid status: '{status}'")]
    InvalidStatus { status: String },

    #[error("Invalid priority: '{priority}'")]
    InvalidPriority { priority: String },

    #[error("Invalid status transition for task '{task_id}': {from} -> {to}")]
    InvalidTransition {
        task_id: String,
        from: String,
        to: String,
    },

    // Task errors
    #[error("Task '{task_id}' not found")]
    TaskNotFound { task_id: String },

    // Authentication errors
    #[error("Not signed in")]
    Unauthorized,

    #[error("{message}")]
    Auth { message: String },

    // Provider errors
    #[error("{service} request failed: {reason}")]
    Provider { service: String, reason: String },

    #[error("{service} is not configured")]
    NotConfigured { service: String },

    #[error("AI error: {0}")]
    Ai(String),

    #[error("Failed to parse JSON: {reason}")]
    JsonParseError { reason: String },
}

impl TasksError {
    /// Shorthand for a validation failure.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Shorthand for a failed call to an external service.
    pub fn provider(service: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Provider {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error was caused by caller input rather than a collaborator.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidStatus { .. }
                | Self::InvalidPriority { .. }
                | Self::InvalidTransition { .. }
        )
    }
}

impl From<serde_json::Error> for TasksError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParseError {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for tasks operations
pub type TasksResult<T> = Result<T, TasksError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TasksError::TaskNotFound {
            task_id: "123".to_string(),
        };
        assert_eq!(err.to_string(), "Task '123' not found");
    }

    #[test]
    fn test_validation_message_is_bare() {
        let err = TasksError::validation("Content is required");
        assert_eq!(err.to_string(), "Content is required");
        assert!(err.is_validation());
    }

    #[test]
    fn test_provider_error_is_not_validation() {
        let err = TasksError::provider("supabase", "connection refused");
        assert_eq!(err.to_string(), "supabase request failed: connection refused");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err: TasksError = json_err.into();
        assert!(matches!(err, TasksError::JsonParseError { .. }));
    }
}
