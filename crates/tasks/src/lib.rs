#![warn(clippy::pedantic)]
// Allow common pedantic lints that don't affect correctness
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]

//! # Tasks
//!
//! Core of a personal task manager backed by a hosted store.
//!
//! This crate provides:
//! - Task, user and session entities
//! - Storage gateways (Supabase PostgREST, in-memory)
//! - Authentication gateways (Supabase Auth, in-memory)
//! - LLM-based task extraction from free-text notes
//! - The task board lifecycle, periodic reports and board/calendar views
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tasks::{MemoryStorage, TaskBoard, TaskDraft};
//!
//! let mut board = TaskBoard::new(Arc::new(MemoryStorage::new()));
//! let task = board.create_task(TaskDraft::manual("Buy milk"), "ada@example.com").await?;
//! board.complete_task(&task.id, 0.5).await?;
//! ```

// Core entities
pub mod entities;

// Error types
pub mod errors;

// Hosted backend settings
pub mod supabase;

// Storage layer
pub mod storage;

// Identity provider
pub mod auth;

// AI integration
pub mod ai;

// Domain facades
pub mod domain;

// Re-export key types for convenience
pub use auth::{Authenticator, MemoryAuth, Registration, SupabaseAuth};
pub use domain::{
    build_report, PeriodReport, ReportPeriod, TaskBoard, TaskExtractor, TaskReport,
};
pub use entities::{Session, Task, TaskDraft, TaskPatch, TaskPriority, TaskSource, TaskStatus, User};
pub use errors::{TasksError, TasksResult};
pub use storage::{MemoryStorage, Storage, SupabaseStorage};
pub use supabase::SupabaseConfig;

// Re-export AI types
pub use ai::{AIMessage, AIProvider, AIResponse, AIRole, GenerateOptions, OpenAIProvider, TokenUsage};
