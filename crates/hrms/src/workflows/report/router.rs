use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::hours::{top_employees, working_summary};
use super::presence::presence_grid;
use super::ReportData;
use crate::workflows::attendance::AttendanceRepository;
use crate::workflows::calendar::HolidayCalendar;
use crate::workflows::directory::EmployeeDirectory;
use crate::workflows::leave::LeaveRepository;
use crate::workflows::tour::TourRepository;

/// Shared state for report endpoints.
pub struct ReportState<S> {
    pub store: Arc<S>,
    pub calendar: Arc<HolidayCalendar>,
    pub full_day_hours: u32,
}

pub fn reports_router<S>(state: Arc<ReportState<S>>) -> Router
where
    S: LeaveRepository + TourRepository + AttendanceRepository + EmployeeDirectory + 'static,
{
    Router::new()
        .route("/api/v1/reports/presence", post(presence_handler::<S>))
        .route("/api/v1/reports/working-hours", post(working_hours_handler::<S>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportRange {
    pub(crate) from: NaiveDate,
    pub(crate) to: NaiveDate,
    #[serde(default)]
    pub(crate) top: Option<usize>,
}

fn invalid_range() -> Response {
    let payload = json!({ "error": "report range must not end before it starts" });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

fn load<S>(state: &ReportState<S>, range: &ReportRange) -> Result<ReportData, Response>
where
    S: LeaveRepository + TourRepository + AttendanceRepository + EmployeeDirectory,
{
    if range.to < range.from {
        return Err(invalid_range());
    }
    ReportData::load(state.store.as_ref(), range.from, range.to).map_err(|err| {
        let payload = json!({ "error": err.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
    })
}

pub(crate) async fn presence_handler<S>(
    State(state): State<Arc<ReportState<S>>>,
    axum::Json(range): axum::Json<ReportRange>,
) -> Response
where
    S: LeaveRepository + TourRepository + AttendanceRepository + EmployeeDirectory + 'static,
{
    let data = match load(&state, &range) {
        Ok(data) => data,
        Err(response) => return response,
    };
    let grid = presence_grid(
        &data,
        &state.calendar,
        range.from,
        range.to,
        state.full_day_hours,
    );
    (StatusCode::OK, axum::Json(grid)).into_response()
}

pub(crate) async fn working_hours_handler<S>(
    State(state): State<Arc<ReportState<S>>>,
    axum::Json(range): axum::Json<ReportRange>,
) -> Response
where
    S: LeaveRepository + TourRepository + AttendanceRepository + EmployeeDirectory + 'static,
{
    let data = match load(&state, &range) {
        Ok(data) => data,
        Err(response) => return response,
    };
    let mut summaries = working_summary(
        &data,
        &state.calendar,
        range.from,
        range.to,
        state.full_day_hours,
    );
    if let Some(n) = range.top {
        summaries = top_employees(summaries, n);
    }
    (StatusCode::OK, axum::Json(summaries)).into_response()
}
