//! Periodic task reports.
//!
//! A report aggregates the tasks completed inside a day, week or month
//! anchored to the current time. Reports are recomputed on every request.

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, Months, NaiveDate, NaiveTime, TimeZone, Utc,
};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use serde::{Deserialize, Serialize};

use crate::entities::{Task, TaskPriority, TaskStatus};
use crate::errors::TasksError;

/// Width of the exported document's tables
const DOCUMENT_WIDTH: u16 = 100;

/// Reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    Day,
    Week,
    Month,
}

impl ReportPeriod {
    /// Selector text shown next to the report.
    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "Today",
            Self::Week => "This Week",
            Self::Month => "This Month",
        }
    }
}

impl std::fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
        }
    }
}

impl std::str::FromStr for ReportPeriod {
    type Err = TasksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "today" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(TasksError::validation(format!(
                "Invalid period '{s}', expected day, week or month"
            ))),
        }
    }
}

/// Inclusive time window of a period, with its human-readable label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRange {
    pub period: ReportPeriod,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
    #[serde(skip)]
    offset: FixedOffset,
}

impl PeriodRange {
    /// The period containing `now`, using `now`'s UTC offset for day boundaries.
    pub fn containing(period: ReportPeriod, now: DateTime<FixedOffset>) -> Self {
        let offset = *now.offset();
        let today = now.date_naive();

        let (first, last, label) = match period {
            ReportPeriod::Day => (today, today, format_day(today)),
            ReportPeriod::Week => {
                let sunday = today - Days::new(u64::from(today.weekday().num_days_from_sunday()));
                (
                    sunday,
                    sunday + Days::new(6),
                    format!("Week of {}", format_day(sunday)),
                )
            }
            ReportPeriod::Month => {
                let first = today - Days::new(u64::from(today.day0()));
                let last = first + Months::new(1) - Days::new(1);
                (first, last, today.format("%B %Y").to_string())
            }
        };

        Self {
            period,
            start: start_of_day(first, offset),
            end: start_of_day(last + Days::new(1), offset) - Duration::milliseconds(1),
            label,
            offset,
        }
    }

    /// Whether `instant` falls inside the window, both ends included.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Attachment name for this period's exported document.
    pub fn export_filename(&self, extension: &str) -> String {
        export_filename(&self.label, extension)
    }

    fn local_day(&self, instant: DateTime<Utc>) -> String {
        format_day(instant.with_timezone(&self.offset).date_naive())
    }
}

fn start_of_day(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local_midnight = date.and_time(NaiveTime::MIN);
    Utc.from_utc_datetime(&(local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()))))
}

/// Long date with an ordinal day, e.g. "October 18th, 2026".
pub fn format_day(date: NaiveDate) -> String {
    format!(
        "{} {}{}, {}",
        date.format("%B"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// `Task_Report_<label>.<ext>` with every whitespace run in the label as `_`.
pub fn export_filename(label: &str, extension: &str) -> String {
    let label: String = label
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("Task_Report_{label}.{extension}")
}

/// Counts per priority, zero-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl PriorityCounts {
    /// Count `tasks` per priority.
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            match task.priority {
                TaskPriority::Low => counts.low += 1,
                TaskPriority::Medium => counts.medium += 1,
                TaskPriority::High => counts.high += 1,
            }
        }
        counts
    }

    pub fn get(&self, priority: TaskPriority) -> usize {
        match priority {
            TaskPriority::Low => self.low,
            TaskPriority::Medium => self.medium,
            TaskPriority::High => self.high,
        }
    }
}

/// Counts per status, zero-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub todo: usize,
    #[serde(rename = "in-progress")]
    pub in_progress: usize,
    pub done: usize,
}

impl StatusCounts {
    /// Count `tasks` per status.
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            match task.status {
                TaskStatus::Todo => counts.todo += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Done => counts.done += 1,
            }
        }
        counts
    }

    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Done => self.done,
        }
    }
}

/// Aggregate over the tasks completed in a window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub total_hours_spent: f64,
    pub tasks_by_priority: PriorityCounts,
    pub tasks_by_status: StatusCounts,
}

/// Tasks whose `completedAt` lies in `[start, end]`.
pub fn completed_between(tasks: &[Task], start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| {
            task.completed_at
                .is_some_and(|completed| start <= completed && completed <= end)
        })
        .collect()
}

/// Aggregate the tasks completed in `[start, end]`.
pub fn build_report(tasks: &[Task], start: DateTime<Utc>, end: DateTime<Utc>) -> TaskReport {
    let included = completed_between(tasks, start, end);
    let tasks_by_status = StatusCounts::tally(included.iter().copied());

    TaskReport {
        total_tasks: included.len(),
        completed_tasks: tasks_by_status.done,
        total_hours_spent: included.iter().map(|t| t.hours_spent.unwrap_or(0.0)).sum(),
        tasks_by_priority: PriorityCounts::tally(included.iter().copied()),
        tasks_by_status,
    }
}

/// A report together with its window and the tasks it covers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    #[serde(flatten)]
    pub range: PeriodRange,
    pub report: TaskReport,
    pub tasks: Vec<Task>,
}

impl PeriodReport {
    /// Build the report for the period containing `now`.
    pub fn generate(tasks: &[Task], period: ReportPeriod, now: DateTime<FixedOffset>) -> Self {
        let range = PeriodRange::containing(period, now);
        let report = build_report(tasks, range.start, range.end);
        let tasks = tasks
            .iter()
            .filter(|t| t.completed_at.is_some_and(|at| range.contains(at)))
            .cloned()
            .collect();
        Self {
            range,
            report,
            tasks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn table() -> Table {
    let mut table = Table::new();
    table
        .force_no_tty()
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(DOCUMENT_WIDTH);
    table
}

fn count_table<T: Copy>(
    heading: &str,
    rows: &[T],
    label: impl Fn(T) -> &'static str,
    count: impl Fn(T) -> usize,
) -> Table {
    let mut table = table();
    table.set_header(vec![Cell::new(heading), Cell::new("Tasks")]);
    for &row in rows {
        table.add_row(vec![
            Cell::new(label(row)),
            Cell::new(count(row)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Render the report as a plain-text document.
pub fn render_report_document(report: &PeriodReport) -> String {
    let summary = &report.report;

    let mut totals = table();
    totals.set_header(vec!["Total Tasks", "Completed Tasks", "Total Hours"]);
    totals.add_row(vec![
        summary.total_tasks.to_string(),
        summary.completed_tasks.to_string(),
        format!("{:.1}", summary.total_hours_spent),
    ]);

    let priorities = count_table(
        "Tasks by Priority",
        &TaskPriority::ALL,
        TaskPriority::label,
        |p| summary.tasks_by_priority.get(p),
    );
    let statuses = count_table(
        "Tasks by Status",
        &TaskStatus::ALL,
        TaskStatus::label,
        |s| summary.tasks_by_status.get(s),
    );

    let completed = if report.tasks.is_empty() {
        "No tasks completed in this period".to_string()
    } else {
        let mut rows = table();
        rows.set_header(vec!["Task", "Priority", "Hours", "Completed"]);
        for task in &report.tasks {
            rows.add_row(vec![
                Cell::new(&task.title),
                Cell::new(task.priority.label()),
                Cell::new(task.hours_spent.unwrap_or(0.0)).set_alignment(CellAlignment::Right),
                Cell::new(
                    task.completed_at
                        .map_or_else(|| "N/A".to_string(), |at| report.range.local_day(at)),
                ),
            ]);
        }
        rows.to_string()
    };

    format!(
        "Task Report\n\nSummary for {label}\n\n{totals}\n\n{priorities}\n\n{statuses}\n\nCompleted Tasks\n\n{completed}\n",
        label = report.range.label,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TaskSource;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn local(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    fn task(id: &str, priority: TaskPriority, completed_at: Option<&str>, hours: Option<f64>) -> Task {
        let created = at("2026-10-01T08:00:00Z");
        Task {
            id: id.to_string(),
            title: format!("Task {id}"),
            description: String::new(),
            priority,
            status: if completed_at.is_some() {
                TaskStatus::Done
            } else {
                TaskStatus::Todo
            },
            due_date: None,
            created_at: created,
            updated_at: created,
            completed_at: completed_at.map(at),
            hours_spent: hours,
            user_id: "ada@example.com".to_string(),
            source: TaskSource::Manual,
        }
    }

    #[test]
    fn test_empty_report_is_all_zero() {
        let report = build_report(&[], at("2026-10-18T00:00:00Z"), at("2026-10-18T23:59:59Z"));

        assert_eq!(report, TaskReport::default());
        assert!(report.total_hours_spent.abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_filters_by_completion_window_inclusively() {
        let start = at("2026-10-18T00:00:00Z");
        let end = at("2026-10-18T23:59:59.999Z");
        let tasks = vec![
            task("open", TaskPriority::High, None, None),
            task("at-start", TaskPriority::Low, Some("2026-10-18T00:00:00Z"), Some(1.5)),
            task("at-end", TaskPriority::High, Some("2026-10-18T23:59:59.999Z"), None),
            task("before", TaskPriority::Low, Some("2026-10-17T23:59:59.999Z"), Some(9.0)),
            task("after", TaskPriority::Low, Some("2026-10-19T00:00:00Z"), Some(9.0)),
        ];

        let report = build_report(&tasks, start, end);

        assert_eq!(report.total_tasks, 2);
        assert_eq!(report.completed_tasks, 2);
        assert!((report.total_hours_spent - 1.5).abs() < f64::EPSILON);
        assert_eq!(
            report.tasks_by_priority,
            PriorityCounts {
                low: 1,
                medium: 0,
                high: 1
            }
        );
        assert_eq!(report.tasks_by_status.done, 2);
        assert_eq!(report.tasks_by_status.todo, 0);
    }

    #[test]
    fn test_report_serializes_store_facing_keys() {
        let value = serde_json::to_value(TaskReport::default()).unwrap();

        assert_eq!(value["totalHoursSpent"], 0.0);
        assert_eq!(value["tasksByStatus"]["in-progress"], 0);
        assert_eq!(value["tasksByPriority"]["medium"], 0);
    }

    #[test]
    fn test_day_range_and_label() {
        let range = PeriodRange::containing(ReportPeriod::Day, local("2026-10-18T15:30:00Z"));

        assert_eq!(range.start, at("2026-10-18T00:00:00Z"));
        assert_eq!(range.end, at("2026-10-18T23:59:59.999Z"));
        assert_eq!(range.label, "October 18th, 2026");
    }

    #[test]
    fn test_day_range_respects_offset() {
        let range = PeriodRange::containing(ReportPeriod::Day, local("2026-10-18T01:00:00+02:00"));

        assert_eq!(range.start, at("2026-10-17T22:00:00Z"));
        assert_eq!(range.end, at("2026-10-18T21:59:59.999Z"));
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // Wednesday
        let range = PeriodRange::containing(ReportPeriod::Week, local("2026-10-21T12:00:00Z"));

        assert_eq!(range.start, at("2026-10-18T00:00:00Z"));
        assert_eq!(range.end, at("2026-10-24T23:59:59.999Z"));
        assert_eq!(range.label, "Week of October 18th, 2026");
    }

    #[test]
    fn test_month_range_and_label() {
        let range = PeriodRange::containing(ReportPeriod::Month, local("2026-02-10T12:00:00Z"));

        assert_eq!(range.start, at("2026-02-01T00:00:00Z"));
        assert_eq!(range.end, at("2026-02-28T23:59:59.999Z"));
        assert_eq!(range.label, "February 2026");
    }

    #[test]
    fn test_ordinal_suffixes() {
        let day = |d| format_day(NaiveDate::from_ymd_opt(2026, 10, d).unwrap());
        assert_eq!(day(1), "October 1st, 2026");
        assert_eq!(day(2), "October 2nd, 2026");
        assert_eq!(day(3), "October 3rd, 2026");
        assert_eq!(day(11), "October 11th, 2026");
        assert_eq!(day(12), "October 12th, 2026");
        assert_eq!(day(22), "October 22nd, 2026");
        assert_eq!(day(31), "October 31st, 2026");
    }

    #[test]
    fn test_export_filename_replaces_whitespace() {
        assert_eq!(
            export_filename("Week of October 18th, 2026", "pdf"),
            "Task_Report_Week_of_October_18th,_2026.pdf"
        );
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("week".parse::<ReportPeriod>().unwrap(), ReportPeriod::Week);
        assert_eq!("Month".parse::<ReportPeriod>().unwrap(), ReportPeriod::Month);
        assert!("year".parse::<ReportPeriod>().unwrap_err().is_validation());
    }

    #[test]
    fn test_generate_carries_included_tasks() {
        let tasks = vec![
            task("a", TaskPriority::Medium, Some("2026-10-18T10:00:00Z"), Some(2.0)),
            task("b", TaskPriority::Medium, Some("2026-09-30T10:00:00Z"), Some(2.0)),
        ];

        let report = PeriodReport::generate(&tasks, ReportPeriod::Month, local("2026-10-18T12:00:00Z"));

        assert_eq!(report.tasks.len(), 1);
        assert_eq!(report.tasks[0].id, "a");
        assert_eq!(report.report.total_tasks, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["label"], "October 2026");
        assert_eq!(json["period"], "month");
        assert_eq!(json["report"]["totalTasks"], 1);
    }

    #[test]
    fn test_document_lists_summary_and_tasks() {
        let tasks = vec![task("a", TaskPriority::High, Some("2026-10-18T10:00:00Z"), Some(2.5))];
        let report = PeriodReport::generate(&tasks, ReportPeriod::Day, local("2026-10-18T12:00:00Z"));

        let document = render_report_document(&report);

        assert!(document.contains("Summary for October 18th, 2026"));
        assert!(document.contains("Task a"));
        assert!(document.contains("2.5"));
        assert!(document.contains("High"));
        assert!(!document.contains("No tasks completed"));
    }

    #[test]
    fn test_document_for_empty_period() {
        let report = PeriodReport::generate(&[], ReportPeriod::Week, local("2026-10-18T12:00:00Z"));

        assert!(report.is_empty());
        assert!(render_report_document(&report).contains("No tasks completed in this period"));
    }
}
