//! Read-only view models for the dashboard pages.

use axum::{
    extract::{Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tasks::domain::{
    dates_with_tasks, render_report_document, tasks_due_on, KanbanColumns, PeriodReport,
    ReportPeriod, StatusCounts,
};
use tasks::entities::parse_date;
use tasks::{Task, User};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;
use crate::session::AccessToken;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub user: User,
    pub total_tasks: usize,
    pub tasks_by_status: StatusCounts,
    pub tasks: Vec<Task>,
}

/// `GET /api/views/overview`
pub async fn overview(
    State(state): State<AppState>,
    token: AccessToken,
) -> ApiResult<Json<Overview>> {
    let (user, mut board) = state.board_for(&token).await?;
    let tasks = board.list_tasks().await?;
    Ok(Json(Overview {
        user,
        total_tasks: tasks.len(),
        tasks_by_status: StatusCounts::tally(&tasks),
        tasks,
    }))
}

/// `GET /api/views/kanban`
pub async fn kanban(
    State(state): State<AppState>,
    token: AccessToken,
) -> ApiResult<Json<KanbanColumns>> {
    let (_user, mut board) = state.board_for(&token).await?;
    board.load().await?;
    Ok(Json(KanbanColumns::from_tasks(board.tasks())))
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
    pub dates_with_tasks: Vec<NaiveDate>,
}

/// `GET /api/views/calendar?date=YYYY-MM-DD`, defaulting to today.
pub async fn calendar(
    State(state): State<AppState>,
    token: AccessToken,
    Query(query): Query<CalendarQuery>,
) -> ApiResult<Json<CalendarDay>> {
    let date = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => parse_date(raw)
            .ok_or_else(|| ApiError::bad_request(format!("Invalid date '{raw}'")))?,
        None => Local::now().date_naive(),
    };

    let (_user, mut board) = state.board_for(&token).await?;
    let tasks = board.load().await?;
    Ok(Json(CalendarDay {
        date,
        tasks: tasks_due_on(tasks, date).into_iter().cloned().collect(),
        dates_with_tasks: dates_with_tasks(tasks),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub period: Option<String>,
    /// Caller's UTC offset in minutes east of UTC; server time when absent.
    pub utc_offset_minutes: Option<i32>,
}

impl ReportQuery {
    fn period(&self) -> ApiResult<ReportPeriod> {
        match self.period.as_deref() {
            Some(raw) => Ok(raw.parse()?),
            None => Ok(ReportPeriod::default()),
        }
    }

    fn now(&self) -> ApiResult<DateTime<FixedOffset>> {
        match self.utc_offset_minutes {
            Some(minutes) => {
                let offset = minutes
                    .checked_mul(60)
                    .and_then(FixedOffset::east_opt)
                    .ok_or_else(|| ApiError::bad_request("Invalid UTC offset"))?;
                Ok(Utc::now().with_timezone(&offset))
            }
            None => Ok(Local::now().fixed_offset()),
        }
    }
}

async fn period_report(
    state: &AppState,
    token: &AccessToken,
    query: &ReportQuery,
) -> ApiResult<PeriodReport> {
    let period = query.period()?;
    let now = query.now()?;
    let (_user, mut board) = state.board_for(token).await?;
    let tasks = board.load().await?;
    Ok(PeriodReport::generate(tasks, period, now))
}

/// `GET /api/views/reports?period=day|week|month`
pub async fn report(
    State(state): State<AppState>,
    token: AccessToken,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<PeriodReport>> {
    Ok(Json(period_report(&state, &token, &query).await?))
}

/// `GET /api/views/reports/export?period=...`: plain-text attachment.
pub async fn export_report(
    State(state): State<AppState>,
    token: AccessToken,
    Query(query): Query<ReportQuery>,
) -> ApiResult<impl IntoResponse> {
    let report = period_report(&state, &token, &query).await?;
    if report.is_empty() {
        return Err(ApiError::bad_request("No tasks completed in this period"));
    }

    let filename = report.range.export_filename("txt");
    let document = render_report_document(&report);
    info!(%filename, tasks = report.tasks.len(), "Exported report");

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        document,
    ))
}
