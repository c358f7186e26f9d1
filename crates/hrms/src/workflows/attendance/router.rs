use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::json;

use super::domain::AttendanceLogId;
use super::punches::parse_device_lines;
use super::regularization::RegularizationAction;
use super::repository::AttendanceRepository;
use super::service::{AttendanceService, AttendanceServiceError};
use crate::workflows::directory::{EmployeeDirectory, EmployeeId};
use crate::workflows::notifications::NotificationPublisher;
use crate::workflows::repository::RepositoryError;

/// Router builder exposing punch ingestion, classification and regularization endpoints.
pub fn attendance_router<S, N>(service: Arc<AttendanceService<S, N>>) -> Router
where
    S: AttendanceRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/attendance/classify", post(classify_handler::<S, N>))
        .route("/api/v1/attendance/punches", post(punches_handler::<S, N>))
        .route("/api/v1/attendance/logs/:log_id", get(log_handler::<S, N>))
        .route(
            "/api/v1/attendance/logs/:log_id/regularization",
            post(regularization_handler::<S, N>),
        )
        .route(
            "/api/v1/attendance/logs/:log_id/actions",
            post(action_handler::<S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClassifyRequest {
    pub(crate) login: NaiveDateTime,
    pub(crate) logout: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PunchUpload {
    pub(crate) lines: String,
    #[serde(default)]
    pub(crate) include_seconds: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegularizationRequest {
    pub(crate) actor: EmployeeId,
    pub(crate) reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegularizationActionRequest {
    pub(crate) action: RegularizationAction,
    pub(crate) actor: EmployeeId,
    #[serde(default)]
    pub(crate) notes: String,
}

pub(crate) fn error_response(error: AttendanceServiceError) -> Response {
    let status = match &error {
        AttendanceServiceError::Regularization(_) | AttendanceServiceError::UnknownEmployee(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AttendanceServiceError::NotOwner(_) | AttendanceServiceError::SelfApproval(_) => {
            StatusCode::FORBIDDEN
        }
        AttendanceServiceError::Lock(_) => StatusCode::LOCKED,
        AttendanceServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AttendanceServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AttendanceServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn classify_handler<S, N>(
    State(service): State<Arc<AttendanceService<S, N>>>,
    axum::Json(request): axum::Json<ClassifyRequest>,
) -> Response
where
    S: AttendanceRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    if request.logout < request.login {
        let payload = json!({ "error": "logout must not be before login" });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    }
    let classification = service.classify(request.login, request.logout);
    (StatusCode::OK, axum::Json(classification)).into_response()
}

pub(crate) async fn punches_handler<S, N>(
    State(service): State<Arc<AttendanceService<S, N>>>,
    axum::Json(upload): axum::Json<PunchUpload>,
) -> Response
where
    S: AttendanceRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let batch = parse_device_lines(&upload.lines, upload.include_seconds);
    match service.ingest(&batch.punches) {
        Ok(report) => {
            let payload = json!({
                "rejected_lines": batch.rejected,
                "locked_days": report.locked_days,
                "preserved": report.preserved,
                "unknown_codes": report.unknown_codes,
                "logs": report.logs,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn log_handler<S, N>(
    State(service): State<Arc<AttendanceService<S, N>>>,
    Path(log_id): Path<String>,
) -> Response
where
    S: AttendanceRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let id = AttendanceLogId(log_id);
    let actions = service.actions(&id).unwrap_or_default();
    match service.get(&id) {
        Ok(log) => {
            let payload = json!({
                "log": log,
                "actions": actions,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn regularization_handler<S, N>(
    State(service): State<Arc<AttendanceService<S, N>>>,
    Path(log_id): Path<String>,
    axum::Json(request): axum::Json<RegularizationRequest>,
) -> Response
where
    S: AttendanceRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let id = AttendanceLogId(log_id);
    match service.submit_regularization(
        &id,
        &request.actor,
        &request.reason,
        Local::now().naive_local(),
    ) {
        Ok(log) => (StatusCode::OK, axum::Json(log)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn action_handler<S, N>(
    State(service): State<Arc<AttendanceService<S, N>>>,
    Path(log_id): Path<String>,
    axum::Json(request): axum::Json<RegularizationActionRequest>,
) -> Response
where
    S: AttendanceRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let id = AttendanceLogId(log_id);
    match service.act(
        &id,
        request.action,
        &request.actor,
        &request.notes,
        Local::now().naive_local(),
    ) {
        Ok(log) => (StatusCode::OK, axum::Json(log)).into_response(),
        Err(error) => error_response(error),
    }
}
