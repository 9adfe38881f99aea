//! Domain facades for task management.
//!
//! These combine storage and AI operations with the task lifecycle rules.

mod board;
pub mod extraction;
pub mod reports;
pub mod views;

pub use board::TaskBoard;
pub use extraction::{extract_json_array, parse_extracted_tasks, TaskExtractor};
pub use reports::{
    build_report, export_filename, render_report_document, PeriodRange, PeriodReport,
    PriorityCounts, ReportPeriod, StatusCounts, TaskReport,
};
pub use views::{dates_with_tasks, tasks_due_on, KanbanColumn, KanbanColumns};
