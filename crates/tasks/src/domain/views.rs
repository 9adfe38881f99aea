//! Board and calendar projections over a task list.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::entities::{Task, TaskStatus};

/// One Kanban column.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanColumn {
    pub status: TaskStatus,
    pub title: &'static str,
    pub count: usize,
    pub tasks: Vec<Task>,
}

/// Tasks grouped by status, in board order.
#[derive(Debug, Clone, Serialize)]
pub struct KanbanColumns {
    pub columns: Vec<KanbanColumn>,
}

impl KanbanColumns {
    /// Group tasks into columns, keeping their relative order.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let columns = TaskStatus::ALL
            .into_iter()
            .map(|status| {
                let tasks: Vec<Task> = tasks
                    .iter()
                    .filter(|t| t.status == status)
                    .cloned()
                    .collect();
                KanbanColumn {
                    status,
                    title: status.label(),
                    count: tasks.len(),
                    tasks,
                }
            })
            .collect();
        Self { columns }
    }

    pub fn column(&self, status: TaskStatus) -> Option<&KanbanColumn> {
        self.columns.iter().find(|c| c.status == status)
    }
}

/// Tasks due on `date`.
pub fn tasks_due_on(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|t| t.due_date == Some(date)).collect()
}

/// Distinct due dates, ascending.
pub fn dates_with_tasks(tasks: &[Task]) -> Vec<NaiveDate> {
    tasks
        .iter()
        .filter_map(|t| t.due_date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{TaskPriority, TaskSource};
    use chrono::Utc;

    fn task(id: &str, status: TaskStatus, due: Option<(i32, u32, u32)>) -> Task {
        let now = Utc::now();
        Task {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            priority: TaskPriority::Medium,
            status,
            due_date: due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            created_at: now,
            updated_at: now,
            completed_at: (status == TaskStatus::Done).then_some(now),
            hours_spent: None,
            user_id: String::new(),
            source: TaskSource::Manual,
        }
    }

    #[test]
    fn test_columns_preserve_order_and_count() {
        let tasks = vec![
            task("a", TaskStatus::Todo, None),
            task("b", TaskStatus::Done, None),
            task("c", TaskStatus::Todo, None),
        ];

        let board = KanbanColumns::from_tasks(&tasks);

        assert_eq!(board.columns.len(), 3);
        let todo = board.column(TaskStatus::Todo).unwrap();
        assert_eq!(todo.count, 2);
        assert_eq!(
            todo.tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            ["a", "c"]
        );
        assert_eq!(board.column(TaskStatus::InProgress).unwrap().count, 0);

        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["columns"][1]["status"], "in-progress");
        assert_eq!(json["columns"][1]["title"], "In Progress");
    }

    #[test]
    fn test_calendar_projections() {
        let tasks = vec![
            task("a", TaskStatus::Todo, Some((2026, 10, 20))),
            task("b", TaskStatus::Todo, Some((2026, 10, 18))),
            task("c", TaskStatus::Done, Some((2026, 10, 20))),
            task("d", TaskStatus::Todo, None),
        ];
        let day = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();

        let due: Vec<&str> = tasks_due_on(&tasks, day).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(due, ["a", "c"]);

        assert_eq!(
            dates_with_tasks(&tasks),
            vec![NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), day]
        );
    }
}
