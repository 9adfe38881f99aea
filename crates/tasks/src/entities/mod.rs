//! Core data structures for task management.

mod task;
mod user;

pub use task::{parse_date, Task, TaskDraft, TaskPatch, TaskPriority, TaskSource, TaskStatus};
pub use user::{display_name, Session, User};
