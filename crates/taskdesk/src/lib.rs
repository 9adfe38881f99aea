#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

//! # Taskdesk
//!
//! HTTP service for the personal task board.
//!
//! Serves the extraction endpoint, authentication, task CRUD and the
//! dashboard view models (overview, kanban, calendar, reports) over the
//! `tasks` crate.

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod session;

pub use config::{Config, LogFormat};
pub use error::{ApiError, ApiResult};
pub use server::{build_router, run_server, AppState};
