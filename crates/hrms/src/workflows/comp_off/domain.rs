use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::workflows::directory::EmployeeId;

pub const MIN_HOURS_EARNED: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompOffId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompOffStatus {
    Open,
    Claimed,
    Expired,
    Rejected,
}

impl CompOffStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Claimed => "claimed",
            Self::Expired => "expired",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for CompOffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompOffAction {
    Claim,
    Reject,
}

impl CompOffAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::Reject => "reject",
        }
    }

    pub const fn target(self, from: CompOffStatus) -> Option<CompOffStatus> {
        match (self, from) {
            (Self::Claim, CompOffStatus::Open) => Some(CompOffStatus::Claimed),
            (Self::Reject, CompOffStatus::Open) => Some(CompOffStatus::Rejected),
            _ => None,
        }
    }
}

/// Credit earned by working on an off day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensatoryOff {
    pub id: CompOffId,
    pub employee: EmployeeId,
    pub worked_on: NaiveDate,
    pub expiry: NaiveDate,
    pub hours_earned: f64,
    pub status: CompOffStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub approved_by: Option<EmployeeId>,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompOffError {
    #[error("hours earned must be at least {MIN_HOURS_EARNED}, got {0}")]
    TooFewHours(f64),
    #[error("expiry {expiry} must not be before the worked date {worked_on}")]
    ExpiryBeforeWork {
        worked_on: NaiveDate,
        expiry: NaiveDate,
    },
    #[error("compensatory off expired on {0}")]
    Expired(NaiveDate),
}

impl CompensatoryOff {
    /// Build an open credit; without an explicit expiry it lapses `expiry_days` after the worked date.
    pub fn new(
        id: CompOffId,
        employee: EmployeeId,
        worked_on: NaiveDate,
        hours_earned: Option<f64>,
        expiry: Option<NaiveDate>,
        expiry_days: i64,
    ) -> Result<Self, CompOffError> {
        let hours_earned = hours_earned.unwrap_or(1.0);
        if hours_earned < MIN_HOURS_EARNED {
            return Err(CompOffError::TooFewHours(hours_earned));
        }
        let expiry = expiry.unwrap_or(worked_on + Duration::days(expiry_days));
        if expiry < worked_on {
            return Err(CompOffError::ExpiryBeforeWork { worked_on, expiry });
        }
        Ok(Self {
            id,
            employee,
            worked_on,
            expiry,
            hours_earned,
            status: CompOffStatus::Open,
            reason: None,
            approved_by: None,
            comments: None,
        })
    }

    /// Flip an open credit to expired once `today` is past its expiry. Returns whether it changed.
    pub fn refresh_expiry(&mut self, today: NaiveDate) -> bool {
        if self.status == CompOffStatus::Open && self.expiry < today {
            self.status = CompOffStatus::Expired;
            return true;
        }
        false
    }
}

/// Total open hours for `employee`.
pub fn available_balance(entries: &[CompensatoryOff], employee: &EmployeeId) -> f64 {
    entries
        .iter()
        .filter(|entry| &entry.employee == employee && entry.status == CompOffStatus::Open)
        .map(|entry| entry.hours_earned)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompOffLog {
    pub comp_off: CompOffId,
    pub actor: EmployeeId,
    pub action: String,
    #[serde(default)]
    pub notes: String,
    pub at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).expect("valid date")
    }

    fn credit(employee: &str, hours: Option<f64>) -> CompensatoryOff {
        CompensatoryOff::new(
            CompOffId(format!("co-{employee}")),
            EmployeeId(employee.to_string()),
            date(6, 1),
            hours,
            None,
            90,
        )
        .expect("valid credit")
    }

    #[test]
    fn expiry_defaults_from_worked_date() {
        let entry = credit("emp-1", None);
        assert_eq!(entry.expiry, date(8, 30));
        assert_eq!(entry.hours_earned, 1.0);
    }

    #[test]
    fn hours_below_half_are_rejected() {
        let result = CompensatoryOff::new(
            CompOffId("co".to_string()),
            EmployeeId("emp-1".to_string()),
            date(6, 1),
            Some(0.25),
            None,
            90,
        );
        assert_eq!(result, Err(CompOffError::TooFewHours(0.25)));
    }

    #[test]
    fn refresh_expires_only_past_open_entries() {
        let mut entry = credit("emp-1", None);
        assert!(!entry.refresh_expiry(date(8, 30)));
        assert!(entry.refresh_expiry(date(8, 31)));
        assert_eq!(entry.status, CompOffStatus::Expired);
        assert!(!entry.refresh_expiry(date(9, 30)));
    }

    #[test]
    fn balance_sums_open_hours_for_employee() {
        let mut claimed = credit("emp-1", Some(2.0));
        claimed.status = CompOffStatus::Claimed;
        let entries = vec![
            credit("emp-1", Some(1.5)),
            credit("emp-1", None),
            claimed,
            credit("emp-2", Some(4.0)),
        ];
        let employee = EmployeeId("emp-1".to_string());
        assert!((available_balance(&entries, &employee) - 2.5).abs() < f64::EPSILON);
    }
}
