use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use super::domain::{
    available_balance, CompOffAction, CompOffError, CompOffId, CompOffLog, CompOffStatus,
    CompensatoryOff,
};
use super::repository::CompOffRepository;
use crate::workflows::directory::{Employee, EmployeeDirectory, EmployeeId};
use crate::workflows::notifications::{
    compose, dispatch, NotificationKind, NotificationPublisher, StatusNotice,
};
use crate::workflows::repository::RepositoryError;

pub struct CompOffService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    expiry_days: i64,
}

static COMP_OFF_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_comp_off_id() -> CompOffId {
    let id = COMP_OFF_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CompOffId(format!("co-{id:06}"))
}

impl<S, N> CompOffService<S, N>
where
    S: CompOffRepository + EmployeeDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, expiry_days: i64) -> Self {
        Self {
            store,
            notifier,
            expiry_days,
        }
    }

    fn employee(&self, id: &EmployeeId) -> Result<Employee, CompOffServiceError> {
        self.store
            .employee(id)?
            .ok_or_else(|| CompOffServiceError::UnknownEmployee(id.0.clone()))
    }

    /// Record a credit for working on `worked_on`.
    pub fn record(
        &self,
        employee: &EmployeeId,
        worked_on: NaiveDate,
        hours_earned: Option<f64>,
        reason: Option<String>,
        now: NaiveDateTime,
    ) -> Result<CompensatoryOff, CompOffServiceError> {
        let employee = self.employee(employee)?;
        let mut entry = CompensatoryOff::new(
            next_comp_off_id(),
            employee.id.clone(),
            worked_on,
            hours_earned,
            None,
            self.expiry_days,
        )?;
        entry.reason = reason;
        entry.refresh_expiry(now.date());

        let stored = self.store.insert_comp_off(entry)?;
        self.log(&stored, &employee.id, "recorded", "", now)?;
        info!(
            comp_off = %stored.id.0,
            employee = %employee.id.0,
            hours = stored.hours_earned,
            "compensatory off recorded"
        );
        Ok(stored)
    }

    /// Expire every open credit past its expiry date. Returns how many changed.
    pub fn refresh_expiry(&self, today: NaiveDate) -> Result<usize, CompOffServiceError> {
        let mut expired = 0;
        for mut entry in self.store.all_comp_offs()? {
            if entry.refresh_expiry(today) {
                self.store.update_comp_off(entry)?;
                expired += 1;
            }
        }
        if expired > 0 {
            info!(expired, "compensatory offs expired");
        }
        Ok(expired)
    }

    pub fn available_balance(
        &self,
        employee: &EmployeeId,
        today: NaiveDate,
    ) -> Result<f64, CompOffServiceError> {
        self.refresh_expiry(today)?;
        let entries = self.store.comp_offs_for(employee)?;
        Ok(available_balance(&entries, employee))
    }

    pub fn claim(
        &self,
        id: &CompOffId,
        actor: &EmployeeId,
        notes: &str,
        now: NaiveDateTime,
    ) -> Result<CompensatoryOff, CompOffServiceError> {
        self.act(id, CompOffAction::Claim, actor, notes, now)
    }

    pub fn reject(
        &self,
        id: &CompOffId,
        actor: &EmployeeId,
        notes: &str,
        now: NaiveDateTime,
    ) -> Result<CompensatoryOff, CompOffServiceError> {
        self.act(id, CompOffAction::Reject, actor, notes, now)
    }

    fn act(
        &self,
        id: &CompOffId,
        action: CompOffAction,
        actor: &EmployeeId,
        notes: &str,
        now: NaiveDateTime,
    ) -> Result<CompensatoryOff, CompOffServiceError> {
        let mut entry = self
            .store
            .fetch_comp_off(id)?
            .ok_or(RepositoryError::NotFound)?;
        if entry.refresh_expiry(now.date()) {
            self.store.update_comp_off(entry.clone())?;
            return Err(CompOffError::Expired(entry.expiry).into());
        }

        let from = entry.status;
        let to = action
            .target(from)
            .ok_or(CompOffServiceError::InvalidTransition {
                from,
                action: action.label(),
            })?;

        let actor = self.employee(actor)?;
        let owner = self.employee(&entry.employee)?;
        if action == CompOffAction::Reject && actor.id == owner.id {
            return Err(CompOffServiceError::SelfApproval(action.label()));
        }

        entry.status = to;
        if actor.id != owner.id {
            entry.approved_by = Some(actor.id.clone());
        }
        if !notes.is_empty() {
            entry.comments = Some(notes.to_string());
        }
        self.store.update_comp_off(entry.clone())?;
        self.log(&entry, &actor.id, action.label(), notes, now)?;
        self.notify(&entry, &owner, &actor, now);
        Ok(entry)
    }

    pub fn logs(&self, id: &CompOffId) -> Result<Vec<CompOffLog>, CompOffServiceError> {
        Ok(self.store.comp_off_logs(id)?)
    }

    fn log(
        &self,
        entry: &CompensatoryOff,
        actor: &EmployeeId,
        action: &str,
        notes: &str,
        now: NaiveDateTime,
    ) -> Result<(), CompOffServiceError> {
        self.store.append_comp_off_log(CompOffLog {
            comp_off: entry.id.clone(),
            actor: actor.clone(),
            action: action.to_string(),
            notes: notes.to_string(),
            at: now,
        })?;
        Ok(())
    }

    fn notify(
        &self,
        entry: &CompensatoryOff,
        owner: &Employee,
        actor: &Employee,
        now: NaiveDateTime,
    ) {
        let manager = owner
            .reports_to
            .as_ref()
            .and_then(|id| self.store.employee(id).ok().flatten());
        let reference = entry.worked_on.to_string();
        let outbound = compose(&StatusNotice {
            kind: NotificationKind::CompOffStatus,
            related_id: &entry.id.0,
            reference: &reference,
            slug: &entry.id.0,
            status: entry.status.label(),
            actor,
            applicant: owner,
            manager: manager.as_ref(),
            at: now,
        });
        if let Err(err) = dispatch(self.notifier.as_ref(), outbound) {
            warn!(comp_off = %entry.id.0, error = %err, "comp off notification failed");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompOffServiceError {
    #[error(transparent)]
    CompOff(#[from] CompOffError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("unknown employee '{0}'")]
    UnknownEmployee(String),
    #[error("cannot {action} a compensatory off that is {from}")]
    InvalidTransition {
        from: CompOffStatus,
        action: &'static str,
    },
    #[error("employees cannot {0} their own compensatory off")]
    SelfApproval(&'static str),
}
