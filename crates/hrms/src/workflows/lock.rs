use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Period during which leave, attendance and tour records are frozen (e.g. after payroll close).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LockPeriod {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.is_locked && date >= self.from && date <= self.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LockError {
    #[error("Action is locked for the period from {from} to {to}. Reason: {reason}")]
    Locked {
        from: NaiveDate,
        to: NaiveDate,
        reason: String,
    },
}

/// Registry of lock periods consulted before every mutation.
#[derive(Debug, Default)]
pub struct LockRegistry {
    periods: Mutex<Vec<LockPeriod>>,
}

impl LockRegistry {
    pub fn new(periods: Vec<LockPeriod>) -> Self {
        Self {
            periods: Mutex::new(periods),
        }
    }

    pub fn add(&self, period: LockPeriod) {
        self.periods
            .lock()
            .expect("lock registry mutex poisoned")
            .push(period);
    }

    /// Release every period that covers the date; returns how many were unlocked.
    pub fn unlock(&self, date: NaiveDate) -> usize {
        let mut guard = self.periods.lock().expect("lock registry mutex poisoned");
        let mut released = 0;
        for period in guard.iter_mut().filter(|period| period.covers(date)) {
            period.is_locked = false;
            released += 1;
        }
        released
    }

    pub fn periods(&self) -> Vec<LockPeriod> {
        self.periods
            .lock()
            .expect("lock registry mutex poisoned")
            .clone()
    }

    pub fn ensure_unlocked(&self, date: NaiveDate) -> Result<(), LockError> {
        let guard = self.periods.lock().expect("lock registry mutex poisoned");
        match guard.iter().find(|period| period.covers(date)) {
            Some(period) => {
                warn!(%date, from = %period.from, to = %period.to, "mutation denied by lock period");
                Err(LockError::Locked {
                    from: period.from,
                    to: period.to,
                    reason: period
                        .reason
                        .clone()
                        .filter(|reason| !reason.trim().is_empty())
                        .unwrap_or_else(|| "No reason provided".to_string()),
                })
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn denies_dates_inside_locked_period() {
        let registry = LockRegistry::new(vec![LockPeriod {
            from: date(2025, 3, 1),
            to: date(2025, 3, 31),
            is_locked: true,
            reason: None,
        }]);

        let err = registry
            .ensure_unlocked(date(2025, 3, 10))
            .expect_err("march is locked");
        assert_eq!(
            err.to_string(),
            "Action is locked for the period from 2025-03-01 to 2025-03-31. Reason: No reason provided"
        );
        assert!(registry.ensure_unlocked(date(2025, 4, 1)).is_ok());
    }

    #[test]
    fn unlocked_periods_are_ignored() {
        let registry = LockRegistry::default();
        registry.add(LockPeriod {
            from: date(2025, 2, 1),
            to: date(2025, 2, 28),
            is_locked: true,
            reason: Some("Payroll processed".to_string()),
        });

        let err = registry
            .ensure_unlocked(date(2025, 2, 14))
            .expect_err("february is locked");
        assert!(err.to_string().ends_with("Reason: Payroll processed"));

        assert_eq!(registry.unlock(date(2025, 2, 14)), 1);
        assert!(registry.ensure_unlocked(date(2025, 2, 14)).is_ok());
    }
}
