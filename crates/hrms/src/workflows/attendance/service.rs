use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::classifier::{AttendanceClassifier, Classification};
use super::domain::{AttendanceLog, AttendanceLogAction, AttendanceLogId, ShiftTiming};
use super::punches::{group_daily, Punch};
use super::regularization::{self, RegularizationAction, RegularizationError};
use super::repository::AttendanceRepository;
use crate::workflows::approvals::regularization_queue;
use crate::workflows::directory::{Employee, EmployeeDirectory, EmployeeId};
use crate::workflows::lock::{LockError, LockRegistry};
use crate::workflows::notifications::{
    compose, dispatch, NotificationKind, NotificationPublisher, StatusNotice,
};
use crate::workflows::repository::RepositoryError;
use crate::workflows::slug::slugify;

/// Summary of one punch ingestion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub logs: Vec<AttendanceLog>,
    pub locked_days: usize,
    pub preserved: usize,
    pub unknown_codes: Vec<String>,
}

/// Service turning punches into attendance logs and running regularization approvals.
pub struct AttendanceService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    classifier: Arc<AttendanceClassifier>,
    locks: Arc<LockRegistry>,
    default_shift: ShiftTiming,
}

static ATTENDANCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_attendance_id() -> AttendanceLogId {
    let id = ATTENDANCE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AttendanceLogId(format!("att-{id:06}"))
}

impl<S, N> AttendanceService<S, N>
where
    S: AttendanceRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        classifier: AttendanceClassifier,
        locks: Arc<LockRegistry>,
    ) -> Self {
        Self {
            store,
            notifier,
            classifier: Arc::new(classifier),
            locks,
            default_shift: ShiftTiming::general(),
        }
    }

    pub fn with_default_shift(mut self, shift: ShiftTiming) -> Self {
        self.default_shift = shift;
        self
    }

    pub fn classifier(&self) -> &AttendanceClassifier {
        &self.classifier
    }

    pub fn default_shift(&self) -> &ShiftTiming {
        &self.default_shift
    }

    fn shift_for(&self, employee: &Employee) -> Result<ShiftTiming, AttendanceServiceError> {
        match &employee.shift {
            Some(id) => Ok(self
                .store
                .shift(id)?
                .unwrap_or_else(|| self.default_shift.clone())),
            None => Ok(self.default_shift.clone()),
        }
    }

    fn employee(&self, id: &EmployeeId) -> Result<Employee, AttendanceServiceError> {
        self.store
            .employee(id)?
            .ok_or_else(|| AttendanceServiceError::UnknownEmployee(id.0.clone()))
    }

    fn load(&self, id: &AttendanceLogId) -> Result<AttendanceLog, AttendanceServiceError> {
        Ok(self.store.fetch_log(id)?.ok_or(RepositoryError::NotFound)?)
    }

    /// Classify a single pair of punches against the default shift.
    pub fn classify(&self, login: NaiveDateTime, logout: NaiveDateTime) -> Classification {
        self.classifier.classify(login, logout, &self.default_shift)
    }

    /// Group punches per employee and day, classify each day and upsert its log.
    ///
    /// Locked dates and days already under regularization are left untouched.
    pub fn ingest(&self, punches: &[Punch]) -> Result<IngestReport, AttendanceServiceError> {
        let mut report = IngestReport::default();

        for day in group_daily(punches) {
            let Some(employee) = self.store.by_code(&day.employee_code)? else {
                warn!(code = %day.employee_code, "punches for unknown employee code");
                if !report.unknown_codes.contains(&day.employee_code) {
                    report.unknown_codes.push(day.employee_code.clone());
                }
                continue;
            };
            if self.locks.ensure_unlocked(day.date).is_err() {
                report.locked_days += 1;
                continue;
            }

            let existing = self.store.log_on(&employee.id, day.date)?;
            if existing
                .as_ref()
                .is_some_and(|log| log.regularized || log.is_submitted)
            {
                debug!(employee = %employee.id.0, date = %day.date, "keeping regularized log");
                report.preserved += 1;
                continue;
            }

            let shift = self.shift_for(&employee)?;
            let classification = self.classifier.classify(day.login, day.logout, &shift);
            let log = AttendanceLog {
                id: existing
                    .map(|log| log.id)
                    .unwrap_or_else(next_attendance_id),
                employee: employee.id.clone(),
                date: day.date,
                slug: slugify(&format!("{}-{}", employee.full_name, day.date)),
                start: day.login,
                end: day.logout,
                duration_minutes: classification.duration_minutes,
                status: classification.status,
                color_hex: classification.color_hex,
                regularization: classification.regularization,
                reg_status: classification.reg_status,
                reason: None,
                is_submitted: false,
                regularized: false,
                history: Vec::new(),
            };
            report.logs.push(self.store.upsert_log(log)?);
        }

        info!(
            logs = report.logs.len(),
            locked = report.locked_days,
            unknown = report.unknown_codes.len(),
            "attendance punches ingested"
        );
        Ok(report)
    }

    /// Employee asks for their own log to be regularized.
    pub fn submit_regularization(
        &self,
        id: &AttendanceLogId,
        actor: &EmployeeId,
        reason: &str,
        now: NaiveDateTime,
    ) -> Result<AttendanceLog, AttendanceServiceError> {
        let mut log = self.load(id)?;
        if &log.employee != actor {
            return Err(AttendanceServiceError::NotOwner(actor.0.clone()));
        }
        self.locks.ensure_unlocked(log.date)?;
        regularization::submit(&mut log, reason)?;

        let log = self.store.upsert_log(log)?;
        self.record(&log, actor, "submitted", reason, now)?;
        let employee = self.employee(actor)?;
        self.notify(&log, &employee, &employee, "submitted", now);
        Ok(log)
    }

    /// Approver decision on a submitted regularization.
    pub fn act(
        &self,
        id: &AttendanceLogId,
        action: RegularizationAction,
        actor: &EmployeeId,
        notes: &str,
        now: NaiveDateTime,
    ) -> Result<AttendanceLog, AttendanceServiceError> {
        let mut log = self.load(id)?;
        if &log.employee == actor {
            return Err(AttendanceServiceError::SelfApproval(action.label()));
        }
        self.locks.ensure_unlocked(log.date)?;

        let approver = self.employee(actor)?;
        let applicant = self.employee(&log.employee)?;
        let shift = self.shift_for(&applicant)?;
        let status =
            regularization::act(&mut log, action, actor, &self.classifier, &shift, now)?;

        let log = self.store.upsert_log(log)?;
        self.record(&log, actor, action.label(), notes, now)?;
        info!(
            log = %log.id.0,
            action = action.label(),
            status = status.label(),
            "attendance regularization actioned"
        );
        self.notify(&log, &applicant, &approver, status.label(), now);
        Ok(log)
    }

    /// Undo the last approved regularization.
    pub fn revert(
        &self,
        id: &AttendanceLogId,
        actor: &EmployeeId,
        now: NaiveDateTime,
    ) -> Result<AttendanceLog, AttendanceServiceError> {
        let mut log = self.load(id)?;
        self.locks.ensure_unlocked(log.date)?;
        regularization::revert(&mut log)?;
        let log = self.store.upsert_log(log)?;
        self.record(&log, actor, "revert", "", now)?;
        Ok(log)
    }

    /// Submitted regularizations waiting on `approver`.
    pub fn pending_for(
        &self,
        approver: &EmployeeId,
    ) -> Result<Vec<AttendanceLog>, AttendanceServiceError> {
        let approver = self.employee(approver)?;
        let reports = self.store.reports_of(&approver.id)?;
        let logs = self.store.submitted_logs()?;
        Ok(regularization_queue(&approver, &reports, logs))
    }

    pub fn get(&self, id: &AttendanceLogId) -> Result<AttendanceLog, AttendanceServiceError> {
        self.load(id)
    }

    pub fn actions(
        &self,
        id: &AttendanceLogId,
    ) -> Result<Vec<AttendanceLogAction>, AttendanceServiceError> {
        Ok(self.store.actions(id)?)
    }

    fn record(
        &self,
        log: &AttendanceLog,
        actor: &EmployeeId,
        action: &str,
        notes: &str,
        now: NaiveDateTime,
    ) -> Result<(), AttendanceServiceError> {
        self.store.append_action(AttendanceLogAction {
            log: log.id.clone(),
            actor: actor.clone(),
            action: action.to_string(),
            notes: notes.to_string(),
            at: now,
        })?;
        Ok(())
    }

    fn notify(
        &self,
        log: &AttendanceLog,
        applicant: &Employee,
        actor: &Employee,
        status: &str,
        now: NaiveDateTime,
    ) {
        let manager = applicant
            .reports_to
            .as_ref()
            .and_then(|id| self.store.employee(id).ok().flatten());
        let reference = log.date.to_string();
        let outbound = compose(&StatusNotice {
            kind: NotificationKind::AttendanceRegularization,
            related_id: &log.id.0,
            reference: &reference,
            slug: &log.slug,
            status,
            actor,
            applicant,
            manager: manager.as_ref(),
            at: now,
        });
        if let Err(err) = dispatch(self.notifier.as_ref(), outbound) {
            warn!(log = %log.id.0, error = %err, "regularization notification failed");
        }
    }
}

/// Error raised by the attendance service.
#[derive(Debug, thiserror::Error)]
pub enum AttendanceServiceError {
    #[error(transparent)]
    Regularization(#[from] RegularizationError),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("unknown employee '{0}'")]
    UnknownEmployee(String),
    #[error("only the employee can request regularization, not '{0}'")]
    NotOwner(String),
    #[error("employees cannot {0} their own regularization")]
    SelfApproval(&'static str),
}
