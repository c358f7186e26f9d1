use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use super::domain::{LeaveAction, LeaveApplicationId, LeaveRequest};
use super::repository::LeaveRepository;
use super::service::{LeaveApplicationService, LeaveServiceError};
use crate::workflows::directory::{EmployeeDirectory, EmployeeId};
use crate::workflows::notifications::NotificationPublisher;
use crate::workflows::repository::RepositoryError;

/// Router builder exposing HTTP endpoints for leave intake, checks and approvals.
pub fn leave_router<S, N>(service: Arc<LeaveApplicationService<S, N>>) -> Router
where
    S: LeaveRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/leave/applications", post(apply_handler::<S, N>))
        .route("/api/v1/leave/check", post(check_handler::<S, N>))
        .route(
            "/api/v1/leave/applications/:application_id",
            get(status_handler::<S, N>),
        )
        .route(
            "/api/v1/leave/applications/:application_id/actions",
            post(action_handler::<S, N>),
        )
        .route(
            "/api/v1/leave/balances/:employee_id/:year",
            get(balances_handler::<S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaveActionRequest {
    pub(crate) action: LeaveAction,
    pub(crate) actor: EmployeeId,
    #[serde(default)]
    pub(crate) notes: String,
}

pub(crate) fn error_response(error: LeaveServiceError) -> Response {
    let status = match &error {
        LeaveServiceError::Policy(_)
        | LeaveServiceError::Balance(_)
        | LeaveServiceError::InvalidTransition { .. }
        | LeaveServiceError::UnknownEmployee(_)
        | LeaveServiceError::UnknownLeaveType(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LeaveServiceError::SelfApproval(_) => StatusCode::FORBIDDEN,
        LeaveServiceError::Lock(_) => StatusCode::LOCKED,
        LeaveServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LeaveServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        LeaveServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn apply_handler<S, N>(
    State(service): State<Arc<LeaveApplicationService<S, N>>>,
    axum::Json(request): axum::Json<LeaveRequest>,
) -> Response
where
    S: LeaveRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    match service.apply(request, Local::now().naive_local()) {
        Ok(application) => {
            (StatusCode::CREATED, axum::Json(application.status_view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn check_handler<S, N>(
    State(service): State<Arc<LeaveApplicationService<S, N>>>,
    axum::Json(request): axum::Json<LeaveRequest>,
) -> Response
where
    S: LeaveRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    match service.check(&request, Local::now().date_naive()) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<S, N>(
    State(service): State<Arc<LeaveApplicationService<S, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: LeaveRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let id = LeaveApplicationId(application_id);
    let application = match service.get(&id) {
        Ok(application) => application,
        Err(error) => return error_response(error),
    };
    match service.logs(&id) {
        Ok(logs) => {
            let payload = json!({
                "application": application.status_view(),
                "leave_days": application.leave_days,
                "history": logs,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn action_handler<S, N>(
    State(service): State<Arc<LeaveApplicationService<S, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<LeaveActionRequest>,
) -> Response
where
    S: LeaveRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let id = LeaveApplicationId(application_id);
    match service.transition(
        &id,
        request.action,
        &request.actor,
        &request.notes,
        Local::now().naive_local(),
    ) {
        Ok(application) => (StatusCode::OK, axum::Json(application.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn balances_handler<S, N>(
    State(service): State<Arc<LeaveApplicationService<S, N>>>,
    Path((employee_id, year)): Path<(String, i32)>,
) -> Response
where
    S: LeaveRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let employee = EmployeeId(employee_id);
    let balances = service
        .initialize_balances(&employee, year)
        .and_then(|_| service.balances(&employee, year));
    match balances {
        Ok(balances) => (StatusCode::OK, axum::Json(balances)).into_response(),
        Err(error) => error_response(error),
    }
}
