mod config;
mod rules;

pub use config::LeavePolicyConfig;

use chrono::NaiveDate;
use serde::Serialize;

use super::balance::LeaveBalance;
use super::days::total_leave_days;
use super::domain::{LeaveApplication, LeaveKind, LeaveRequest, LeaveType};
use crate::workflows::calendar::HolidayCalendar;

/// Everything the engine needs to judge one request.
#[derive(Debug, Clone, Copy)]
pub struct LeaveRequestContext<'a> {
    pub request: &'a LeaveRequest,
    pub leave_type: &'a LeaveType,
    pub catalogue: &'a [LeaveType],
    /// The applicant's other applications, in any status.
    pub existing: &'a [LeaveApplication],
    pub balance: Option<&'a LeaveBalance>,
    pub calendar: &'a HolidayCalendar,
    pub today: NaiveDate,
}

/// Result of a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolicyOutcome {
    pub booked_days: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_after: Option<f64>,
}

/// Reasons a leave request is refused. `Display` is the message shown to the applicant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LeavePolicyViolation {
    #[error("Start date {start} cannot be after end date {end}.")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("There is an overlapping leave application ({application_no}) in the selected date range.")]
    Overlap { application_no: String },
    #[error("You cannot apply for {current} immediately after {previous}. Please choose a different leave type or wait a few days.")]
    RestrictedAfter { current: String, previous: String },
    #[error("You cannot apply for {current} immediately before {next}. Please choose a different leave type or leave a gap.")]
    RestrictedBefore { current: String, next: String },
    #[error("{code} should be applied at least {days} days in advance.")]
    NoticeTooShort { code: String, days: i64 },
    #[error("{code} can be applied for a minimum of {min} days.")]
    BelowMinimum { code: String, min: f64 },
    #[error("{code} can be applied for a maximum of {max} days.")]
    AboveMaximum { code: String, max: f64 },
    #[error("{code} can be applied a maximum of {allowed} times in the financial year.")]
    AnnualLimitReached { code: String, allowed: u32 },
    #[error("Insufficient {code} balance: requested {requested} days, {remaining} remaining.")]
    InsufficientBalance {
        code: String,
        requested: f64,
        remaining: f64,
    },
}

/// Stateless evaluator applying leave rules in a fixed order.
#[derive(Debug, Clone, Default)]
pub struct LeavePolicy {
    config: LeavePolicyConfig,
}

impl LeavePolicy {
    pub fn new(config: LeavePolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LeavePolicyConfig {
        &self.config
    }

    pub fn booked_days(&self, request: &LeaveRequest) -> f64 {
        total_leave_days(
            request.start_date,
            request.end_date,
            request.start_day_choice,
            request.end_day_choice,
            &self.config.adjustments,
        )
    }

    pub fn validate(
        &self,
        context: &LeaveRequestContext<'_>,
    ) -> Result<PolicyOutcome, LeavePolicyViolation> {
        rules::check_range(context.request)?;
        let booked_days = self.booked_days(context.request);

        rules::check_overlap(context)?;
        rules::check_consecutive(context)?;

        let leave_type = context.leave_type;
        match leave_type.kind {
            LeaveKind::Casual => {
                rules::check_notice(context)?;
                rules::check_day_limits(leave_type, booked_days)?;
            }
            LeaveKind::Earned => {
                rules::check_day_limits(leave_type, booked_days)?;
                rules::check_annual_applications(context, self.config.financial_year_start_month)?;
            }
            _ => rules::check_day_limits(leave_type, booked_days)?,
        }

        let remaining_after = rules::check_balance(context, booked_days)?;

        Ok(PolicyOutcome {
            booked_days,
            remaining_after,
        })
    }
}
