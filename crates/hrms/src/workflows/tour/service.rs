use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use super::domain::{
    validate_window, Tour, TourAction, TourId, TourRequest, TourStatus, TourStatusLog,
    TourValidationError,
};
use super::repository::TourRepository;
use crate::workflows::directory::{Employee, EmployeeDirectory, EmployeeId};
use crate::workflows::lock::{LockError, LockRegistry};
use crate::workflows::notifications::{
    compose, dispatch, NotificationKind, NotificationPublisher, StatusNotice,
};
use crate::workflows::repository::RepositoryError;
use crate::workflows::slug::unique_slug;

/// Service running tour requests through approval, extension and completion.
pub struct TourService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    locks: Arc<LockRegistry>,
}

static TOUR_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_tour_id() -> TourId {
    let id = TOUR_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    TourId(format!("tour-{id:06}"))
}

impl<S, N> TourService<S, N>
where
    S: TourRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, locks: Arc<LockRegistry>) -> Self {
        Self {
            store,
            notifier,
            locks,
        }
    }

    fn employee(&self, id: &EmployeeId) -> Result<Employee, TourServiceError> {
        self.store
            .employee(id)?
            .ok_or_else(|| TourServiceError::UnknownEmployee(id.0.clone()))
    }

    pub fn apply(&self, request: TourRequest, now: NaiveDateTime) -> Result<Tour, TourServiceError> {
        validate_window(
            request.start_date,
            request.start_time,
            request.end_date,
            request.end_time,
        )?;
        self.locks.ensure_unlocked(request.start_date)?;
        let applicant = self.employee(&request.applied_by)?;

        let slug = unique_slug(
            &format!(
                "{}-{}-{}-{}",
                applicant.username, request.from_destination, request.to_destination, request.start_date
            ),
            |candidate| self.store.tour_slug_exists(candidate),
        )?;

        let tour = Tour {
            id: next_tour_id(),
            applied_by: request.applied_by,
            short_code: "T".to_string(),
            from_destination: request.from_destination,
            to_destination: request.to_destination,
            start_date: request.start_date,
            start_time: request.start_time,
            end_date: request.end_date,
            end_time: request.end_time,
            extended_end: None,
            status: TourStatus::Pending,
            approval_type: request.approval_type,
            bills_submitted: false,
            remarks: request.remarks,
            slug,
        };

        let stored = self.store.insert_tour(tour)?;
        self.store.append_tour_log(TourStatusLog {
            tour: stored.id.clone(),
            actor: applicant.id.clone(),
            action: "applied".to_string(),
            status: stored.status,
            comments: String::new(),
            at: now,
        })?;
        info!(
            tour = %stored.id.0,
            employee = %applicant.id.0,
            to = %stored.to_destination,
            "tour submitted"
        );
        self.notify(&stored, &applicant, &applicant, now);
        Ok(stored)
    }

    /// Apply an action; `new_end` is required for [`TourAction::Extend`].
    pub fn act(
        &self,
        id: &TourId,
        action: TourAction,
        actor: &EmployeeId,
        comments: &str,
        new_end: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Result<Tour, TourServiceError> {
        let mut tour = self.store.fetch_tour(id)?.ok_or(RepositoryError::NotFound)?;
        self.locks.ensure_unlocked(tour.start_date)?;

        let from = tour.status;
        let to = action.target(from).ok_or(TourServiceError::InvalidTransition {
            from,
            action: action.label(),
        })?;

        let actor = self.employee(actor)?;
        let applicant = self.employee(&tour.applied_by)?;
        if actor.id == applicant.id && !action.is_self_service() {
            return Err(TourServiceError::SelfApproval(action.label()));
        }

        let mut note = comments.to_string();
        if action == TourAction::Extend {
            let new_end = new_end.ok_or(TourServiceError::MissingExtension)?;
            tour.extend(new_end)?;
            note = format!("Tour extended to {new_end}. Reason: {comments}");
        }

        tour.status = to;
        self.store.update_tour(tour.clone())?;
        self.store.append_tour_log(TourStatusLog {
            tour: tour.id.clone(),
            actor: actor.id.clone(),
            action: action.label().to_string(),
            status: to,
            comments: note,
            at: now,
        })?;

        info!(
            tour = %tour.id.0,
            from = from.label(),
            to = to.label(),
            actor = %actor.id.0,
            "tour transitioned"
        );
        self.notify(&tour, &applicant, &actor, now);
        Ok(tour)
    }

    pub fn mark_bills_submitted(&self, id: &TourId) -> Result<Tour, TourServiceError> {
        let mut tour = self.get(id)?;
        tour.bills_submitted = true;
        self.store.update_tour(tour.clone())?;
        Ok(tour)
    }

    pub fn get(&self, id: &TourId) -> Result<Tour, TourServiceError> {
        Ok(self.store.fetch_tour(id)?.ok_or(RepositoryError::NotFound)?)
    }

    pub fn logs(&self, id: &TourId) -> Result<Vec<TourStatusLog>, TourServiceError> {
        Ok(self.store.tour_logs(id)?)
    }

    fn notify(&self, tour: &Tour, applicant: &Employee, actor: &Employee, now: NaiveDateTime) {
        let manager = applicant
            .reports_to
            .as_ref()
            .and_then(|id| self.store.employee(id).ok().flatten());
        let reference = format!("{} to {}", tour.from_destination, tour.to_destination);
        let outbound = compose(&StatusNotice {
            kind: NotificationKind::TourStatus,
            related_id: &tour.id.0,
            reference: &reference,
            slug: &tour.slug,
            status: tour.status.label(),
            actor,
            applicant,
            manager: manager.as_ref(),
            at: now,
        });
        if let Err(err) = dispatch(self.notifier.as_ref(), outbound) {
            warn!(tour = %tour.id.0, error = %err, "tour notification failed");
        }
    }
}

/// Error raised by the tour service.
#[derive(Debug, thiserror::Error)]
pub enum TourServiceError {
    #[error(transparent)]
    Validation(#[from] TourValidationError),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("unknown employee '{0}'")]
    UnknownEmployee(String),
    #[error("cannot {action} a tour that is {from}")]
    InvalidTransition { from: TourStatus, action: &'static str },
    #[error("employees cannot {0} their own tour")]
    SelfApproval(&'static str),
    #[error("a new end is required to extend a tour")]
    MissingExtension,
}
