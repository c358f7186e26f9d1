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

use super::domain::{TourAction, TourId, TourRequest};
use super::repository::TourRepository;
use super::service::{TourService, TourServiceError};
use crate::workflows::directory::{EmployeeDirectory, EmployeeId};
use crate::workflows::notifications::NotificationPublisher;
use crate::workflows::repository::RepositoryError;

pub fn tour_router<S, N>(service: Arc<TourService<S, N>>) -> Router
where
    S: TourRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/tours", post(apply_handler::<S, N>))
        .route("/api/v1/tours/:tour_id", get(status_handler::<S, N>))
        .route("/api/v1/tours/:tour_id/actions", post(action_handler::<S, N>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct TourActionRequest {
    pub(crate) action: TourAction,
    pub(crate) actor: EmployeeId,
    #[serde(default)]
    pub(crate) comments: String,
    #[serde(default)]
    pub(crate) new_end: Option<NaiveDateTime>,
}

pub(crate) fn error_response(error: TourServiceError) -> Response {
    let status = match &error {
        TourServiceError::Validation(_)
        | TourServiceError::InvalidTransition { .. }
        | TourServiceError::UnknownEmployee(_)
        | TourServiceError::MissingExtension => StatusCode::UNPROCESSABLE_ENTITY,
        TourServiceError::SelfApproval(_) => StatusCode::FORBIDDEN,
        TourServiceError::Lock(_) => StatusCode::LOCKED,
        TourServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        TourServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        TourServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn apply_handler<S, N>(
    State(service): State<Arc<TourService<S, N>>>,
    axum::Json(request): axum::Json<TourRequest>,
) -> Response
where
    S: TourRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    match service.apply(request, Local::now().naive_local()) {
        Ok(tour) => (StatusCode::CREATED, axum::Json(tour)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<S, N>(
    State(service): State<Arc<TourService<S, N>>>,
    Path(tour_id): Path<String>,
) -> Response
where
    S: TourRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let id = TourId(tour_id);
    let logs = service.logs(&id).unwrap_or_default();
    match service.get(&id) {
        Ok(tour) => {
            let payload = json!({
                "total_minutes": tour.total_duration().num_minutes(),
                "tour": tour,
                "history": logs,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn action_handler<S, N>(
    State(service): State<Arc<TourService<S, N>>>,
    Path(tour_id): Path<String>,
    axum::Json(request): axum::Json<TourActionRequest>,
) -> Response
where
    S: TourRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let id = TourId(tour_id);
    match service.act(
        &id,
        request.action,
        &request.actor,
        &request.comments,
        request.new_end,
        Local::now().naive_local(),
    ) {
        Ok(tour) => (StatusCode::OK, axum::Json(tour)).into_response(),
        Err(error) => error_response(error),
    }
}
