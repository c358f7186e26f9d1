//! Approval queues: what each approver is expected to act on next.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::attendance::{ApprovalStatus, AttendanceLog, AttendanceRepository};
use super::directory::{Employee, EmployeeDirectory, EmployeeId};
use super::leave::{LeaveApplication, LeaveRepository, LeaveStatus};
use super::repository::RepositoryError;
use super::tour::{Tour, TourRepository, TourStatus};

fn report_ids(reports: &[Employee]) -> HashSet<&EmployeeId> {
    reports.iter().map(|report| &report.id).collect()
}

/// Leave applications waiting on `approver`.
///
/// Superusers see pending and recommended requests from everyone, managers
/// see their reports' pending requests and cancellation requests, and the
/// admin department also picks up anything recommended.
pub fn leave_queue(
    approver: &Employee,
    reports: &[Employee],
    applications: Vec<LeaveApplication>,
) -> Vec<LeaveApplication> {
    let reports = report_ids(reports);
    applications
        .into_iter()
        .filter(|application| application.employee != approver.id)
        .filter(|application| {
            let status = application.status;
            let superuser = approver.is_superuser
                && matches!(status, LeaveStatus::Pending | LeaveStatus::Recommended);
            let manager = reports.contains(&application.employee)
                && matches!(
                    status,
                    LeaveStatus::Pending | LeaveStatus::PendingCancellation
                );
            let admin = approver.is_admin_department() && status == LeaveStatus::Recommended;
            superuser || manager || admin
        })
        .collect()
}

/// Tours waiting on `approver`: pending or extended, from reports or from anyone for superusers.
pub fn tour_queue(approver: &Employee, reports: &[Employee], tours: Vec<Tour>) -> Vec<Tour> {
    let reports = report_ids(reports);
    tours
        .into_iter()
        .filter(|tour| tour.applied_by != approver.id)
        .filter(|tour| matches!(tour.status, TourStatus::Pending | TourStatus::Extended))
        .filter(|tour| approver.is_superuser || reports.contains(&tour.applied_by))
        .collect()
}

/// Submitted regularizations waiting on `approver`.
pub fn regularization_queue(
    approver: &Employee,
    reports: &[Employee],
    logs: Vec<AttendanceLog>,
) -> Vec<AttendanceLog> {
    let reports = report_ids(reports);
    logs.into_iter()
        .filter(|log| log.is_submitted && log.employee != approver.id)
        .filter(|log| match log.reg_status {
            Some(ApprovalStatus::Pending) => {
                approver.is_superuser || reports.contains(&log.employee)
            }
            Some(ApprovalStatus::Recommended) => {
                approver.is_superuser || approver.is_admin_department()
            }
            _ => false,
        })
        .collect()
}

/// Every queue for one approver.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApprovalQueues {
    pub leave: Vec<LeaveApplication>,
    pub tours: Vec<Tour>,
    pub regularizations: Vec<AttendanceLog>,
}

impl ApprovalQueues {
    pub fn total(&self) -> usize {
        self.leave.len() + self.tours.len() + self.regularizations.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("unknown approver '{0}'")]
    UnknownApprover(String),
}

pub fn queues_for<S>(store: &S, approver: &EmployeeId) -> Result<ApprovalQueues, ApprovalError>
where
    S: LeaveRepository + TourRepository + AttendanceRepository + EmployeeDirectory,
{
    let approver = store
        .employee(approver)?
        .ok_or_else(|| ApprovalError::UnknownApprover(approver.0.clone()))?;
    let reports = store.reports_of(&approver.id)?;

    Ok(ApprovalQueues {
        leave: leave_queue(&approver, &reports, LeaveRepository::all(store)?),
        tours: tour_queue(&approver, &reports, store.all_tours()?),
        regularizations: regularization_queue(&approver, &reports, store.submitted_logs()?),
    })
}

pub fn approvals_router<S>(store: Arc<S>) -> Router
where
    S: LeaveRepository + TourRepository + AttendanceRepository + EmployeeDirectory + 'static,
{
    Router::new()
        .route("/api/v1/approvals/:approver_id", get(queues_handler::<S>))
        .with_state(store)
}

pub(crate) async fn queues_handler<S>(
    State(store): State<Arc<S>>,
    Path(approver_id): Path<String>,
) -> Response
where
    S: LeaveRepository + TourRepository + AttendanceRepository + EmployeeDirectory + 'static,
{
    match queues_for(store.as_ref(), &EmployeeId(approver_id)) {
        Ok(queues) => {
            let leave: Vec<_> = queues
                .leave
                .iter()
                .map(LeaveApplication::status_view)
                .collect();
            let payload = json!({
                "total": queues.total(),
                "leave": leave,
                "tours": queues.tours,
                "regularizations": queues.regularizations,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(ApprovalError::UnknownApprover(id)) => {
            let payload = json!({ "error": format!("unknown approver '{id}'") });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
