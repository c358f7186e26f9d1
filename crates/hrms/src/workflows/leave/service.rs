use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use super::balance::{
    initialize_balances, BalanceError, BalanceKey, BalanceMovement, LeaveBalance,
    LeaveTransaction,
};
use super::days::leave_days;
use super::domain::{
    LeaveAction, LeaveApplication, LeaveApplicationId, LeaveLogEntry, LeaveRequest, LeaveStatus,
    LeaveType, LeaveTypeId,
};
use super::policy::{LeavePolicy, LeavePolicyViolation, LeaveRequestContext, PolicyOutcome};
use super::repository::LeaveRepository;
use crate::workflows::calendar::HolidayCalendar;
use crate::workflows::directory::{Employee, EmployeeDirectory, EmployeeId};
use crate::workflows::lock::{LockError, LockRegistry};
use crate::workflows::notifications::{
    compose, dispatch, NotificationKind, NotificationPublisher, StatusNotice,
};
use crate::workflows::repository::RepositoryError;
use crate::workflows::slug::unique_slug;

/// Service composing the policy engine, balances, lock periods and notifications.
pub struct LeaveApplicationService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    policy: Arc<LeavePolicy>,
    calendar: Arc<HolidayCalendar>,
    locks: Arc<LockRegistry>,
}

static LEAVE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_leave_sequence() -> u64 {
    LEAVE_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

impl<S, N> LeaveApplicationService<S, N>
where
    S: LeaveRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        policy: LeavePolicy,
        calendar: Arc<HolidayCalendar>,
        locks: Arc<LockRegistry>,
    ) -> Self {
        Self {
            store,
            notifier,
            policy: Arc::new(policy),
            calendar,
            locks,
        }
    }

    pub fn policy(&self) -> &LeavePolicy {
        &self.policy
    }

    fn employee(&self, id: &EmployeeId) -> Result<Employee, LeaveServiceError> {
        self.store
            .employee(id)?
            .ok_or_else(|| LeaveServiceError::UnknownEmployee(id.0.clone()))
    }

    fn leave_type(&self, id: &LeaveTypeId) -> Result<LeaveType, LeaveServiceError> {
        self.store
            .leave_type(id)?
            .ok_or_else(|| LeaveServiceError::UnknownLeaveType(id.0.clone()))
    }

    /// Dry-run the policy engine without persisting anything.
    pub fn check(
        &self,
        request: &LeaveRequest,
        today: NaiveDate,
    ) -> Result<PolicyOutcome, LeaveServiceError> {
        self.employee(&request.employee)?;
        let leave_type = self.leave_type(&request.leave_type)?;
        let catalogue = self.store.leave_types()?;
        let existing = self.store.for_employee(&request.employee)?;
        let balance = self.store.balance(&BalanceKey {
            employee: request.employee.clone(),
            leave_type: leave_type.id.clone(),
            year: request.start_date.year(),
        })?;

        let context = LeaveRequestContext {
            request,
            leave_type: &leave_type,
            catalogue: &catalogue,
            existing: &existing,
            balance: balance.as_ref(),
            calendar: &self.calendar,
            today,
        };

        Ok(self.policy.validate(&context)?)
    }

    /// Validate and persist a new application in `pending`.
    pub fn apply(
        &self,
        request: LeaveRequest,
        now: NaiveDateTime,
    ) -> Result<LeaveApplication, LeaveServiceError> {
        self.locks.ensure_unlocked(request.start_date)?;
        let outcome = self.check(&request, now.date())?;
        let applicant = self.employee(&request.employee)?;
        let leave_type = self.leave_type(&request.leave_type)?;

        let sequence = next_leave_sequence();
        let slug = unique_slug(
            &format!(
                "{}-{}-{}",
                applicant.username,
                request.start_date,
                request.start_day_choice.code()
            ),
            |candidate| self.store.slug_exists(candidate),
        )?;

        let application = LeaveApplication {
            id: LeaveApplicationId(format!("leave-{sequence:06}")),
            application_no: format!("LV/{}/{sequence:06}", leave_type.short_code),
            slug,
            employee: request.employee.clone(),
            leave_type: request.leave_type.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            start_day_choice: request.start_day_choice,
            end_day_choice: request.end_day_choice,
            used_leave: outcome.booked_days,
            balance_after: outcome.remaining_after,
            reason: request.reason,
            status: LeaveStatus::Pending,
            applied_on: now.date(),
            leave_days: leave_days(
                request.start_date,
                request.end_date,
                request.start_day_choice,
                request.end_day_choice,
            ),
        };

        let stored = self.store.insert(application)?;
        self.store.append_log(LeaveLogEntry {
            application: stored.id.clone(),
            actor: applicant.id.clone(),
            action: "applied".to_string(),
            status: stored.status,
            notes: String::new(),
            at: now,
        })?;

        info!(
            application = %stored.application_no,
            employee = %stored.employee.0,
            days = stored.used_leave,
            "leave application submitted"
        );
        self.notify(&stored, &applicant, &applicant, now);

        Ok(stored)
    }

    /// Move an application through its lifecycle, adjusting balances on approval and cancellation.
    pub fn transition(
        &self,
        id: &LeaveApplicationId,
        action: LeaveAction,
        actor: &EmployeeId,
        notes: &str,
        now: NaiveDateTime,
    ) -> Result<LeaveApplication, LeaveServiceError> {
        let mut application = self
            .store
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        self.locks.ensure_unlocked(application.start_date)?;

        let from = application.status;
        let to = action
            .target(from)
            .ok_or(LeaveServiceError::InvalidTransition {
                from,
                action: action.label(),
            })?;

        let actor = self.employee(actor)?;
        let applicant = self.employee(&application.employee)?;
        let self_service = matches!(
            action,
            LeaveAction::Cancel | LeaveAction::RequestCancellation
        );
        if actor.id == applicant.id && !self_service {
            return Err(LeaveServiceError::SelfApproval(action.label()));
        }

        let leave_type = self.leave_type(&application.leave_type)?;
        if leave_type.kind.tracks_balance() {
            let key = BalanceKey {
                employee: application.employee.clone(),
                leave_type: application.leave_type.clone(),
                year: application.start_date.year(),
            };
            if let Some(mut balance) = self.store.balance(&key)? {
                let movement = balance.apply_status_change(from, to, application.used_leave)?;
                if movement != BalanceMovement::None {
                    application.balance_after = Some(balance.remaining);
                    self.store.upsert_balance(balance)?;
                }
            }
        }

        application.status = to;
        self.store.update(application.clone())?;
        self.store.append_log(LeaveLogEntry {
            application: application.id.clone(),
            actor: actor.id.clone(),
            action: action.label().to_string(),
            status: to,
            notes: notes.to_string(),
            at: now,
        })?;

        info!(
            application = %application.application_no,
            from = from.label(),
            to = to.label(),
            actor = %actor.id.0,
            "leave application transitioned"
        );
        self.notify(&application, &applicant, &actor, now);

        Ok(application)
    }

    fn notify(
        &self,
        application: &LeaveApplication,
        applicant: &Employee,
        actor: &Employee,
        now: NaiveDateTime,
    ) {
        let manager = applicant
            .reports_to
            .as_ref()
            .and_then(|id| self.store.employee(id).ok().flatten());
        let outbound = compose(&StatusNotice {
            kind: NotificationKind::LeaveStatus,
            related_id: &application.id.0,
            reference: &application.application_no,
            slug: &application.slug,
            status: application.status.label(),
            actor,
            applicant,
            manager: manager.as_ref(),
            at: now,
        });
        if let Err(err) = dispatch(self.notifier.as_ref(), outbound) {
            warn!(
                application = %application.application_no,
                error = %err,
                "leave notification failed"
            );
        }
    }

    pub fn get(&self, id: &LeaveApplicationId) -> Result<LeaveApplication, LeaveServiceError> {
        let application = self.store.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    pub fn logs(&self, id: &LeaveApplicationId) -> Result<Vec<LeaveLogEntry>, LeaveServiceError> {
        Ok(self.store.logs(id)?)
    }

    pub fn for_employee(
        &self,
        employee: &EmployeeId,
    ) -> Result<Vec<LeaveApplication>, LeaveServiceError> {
        Ok(self.store.for_employee(employee)?)
    }

    /// Create the opening balance rows an employee is missing for `year`.
    pub fn initialize_balances(
        &self,
        employee: &EmployeeId,
        year: i32,
    ) -> Result<Vec<LeaveBalance>, LeaveServiceError> {
        self.employee(employee)?;
        let leave_types = self.store.leave_types()?;
        let existing = self.store.balances()?;
        let created = initialize_balances(employee, &leave_types, &existing, year);
        for balance in &created {
            self.store.upsert_balance(balance.clone())?;
        }
        Ok(created)
    }

    pub fn balances(
        &self,
        employee: &EmployeeId,
        year: i32,
    ) -> Result<Vec<LeaveBalance>, LeaveServiceError> {
        Ok(self
            .store
            .balances()?
            .into_iter()
            .filter(|balance| &balance.employee == employee && balance.year == year)
            .collect())
    }

    /// Apply a manual credit or debit; returns the balances touched.
    pub fn record_transaction(
        &self,
        transaction: &LeaveTransaction,
    ) -> Result<Vec<LeaveBalance>, LeaveServiceError> {
        let mut touched = Vec::new();
        for mut balance in self.store.balances()? {
            if transaction.matches(&balance) {
                balance.apply(transaction.kind, transaction.days)?;
                touched.push(balance);
            }
        }
        if touched.is_empty() {
            return Err(BalanceError::NoMatchingBalance.into());
        }
        for balance in &touched {
            self.store.upsert_balance(balance.clone())?;
        }
        Ok(touched)
    }
}

/// Error raised by the leave application service.
#[derive(Debug, thiserror::Error)]
pub enum LeaveServiceError {
    #[error(transparent)]
    Policy(#[from] LeavePolicyViolation),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Balance(#[from] BalanceError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("unknown employee '{0}'")]
    UnknownEmployee(String),
    #[error("unknown leave type '{0}'")]
    UnknownLeaveType(String),
    #[error("cannot {action} a leave application that is {from}")]
    InvalidTransition { from: LeaveStatus, action: &'static str },
    #[error("applicants cannot {0} their own leave application")]
    SelfApproval(&'static str),
}
