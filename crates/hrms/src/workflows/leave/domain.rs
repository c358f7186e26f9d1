use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::days::HalfDaySpan;
use crate::workflows::directory::EmployeeId;

/// Identifier wrapper for leave types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeaveTypeId(pub String);

/// Identifier wrapper for leave applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeaveApplicationId(pub String);

/// Policy family a leave type belongs to; drives which rule set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveKind {
    Casual,
    Sick,
    Earned,
    Maternity,
    Unpaid,
    CompOff,
    Other,
}

impl LeaveKind {
    pub fn from_short_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "CL" => Self::Casual,
            "SL" => Self::Sick,
            "EL" => Self::Earned,
            "ML" => Self::Maternity,
            "LWP" | "UP" => Self::Unpaid,
            "CO" => Self::CompOff,
            _ => Self::Other,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Casual => "Casual Leave",
            Self::Sick => "Sick Leave",
            Self::Earned => "Earned Leave",
            Self::Maternity => "Maternity Leave",
            Self::Unpaid => "Leave Without Pay",
            Self::CompOff => "Compensatory Off",
            Self::Other => "Other Leave",
        }
    }

    pub const fn tracks_balance(self) -> bool {
        !matches!(self, Self::Unpaid)
    }
}

/// Configured leave type with its policy dials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveType {
    pub id: LeaveTypeId,
    pub name: String,
    pub short_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_day_short_code: Option<String>,
    pub kind: LeaveKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_allocation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_notice_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_days_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_days_limit: Option<f64>,
    /// For earned leave this caps the number of applications per financial year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_days_per_year: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restricted_after: Vec<LeaveTypeId>,
    #[serde(default = "default_leave_color")]
    pub color_hex: String,
}

fn default_leave_color() -> String {
    "#000000".to_string()
}

impl LeaveType {
    /// Minimal leave type whose kind is inferred from the short code.
    pub fn new(id: &str, name: &str, short_code: &str) -> Self {
        Self {
            id: LeaveTypeId(id.to_string()),
            name: name.to_string(),
            short_code: short_code.to_string(),
            half_day_short_code: None,
            kind: LeaveKind::from_short_code(short_code),
            default_allocation: None,
            min_notice_days: None,
            min_days_limit: None,
            max_days_limit: None,
            allowed_days_per_year: None,
            restricted_after: Vec::new(),
            color_hex: default_leave_color(),
        }
    }

    pub fn is_restricted_after(&self, previous: &LeaveTypeId) -> bool {
        self.restricted_after.iter().any(|id| id == previous)
    }

    pub fn half_day_code(&self) -> &str {
        self.half_day_short_code
            .as_deref()
            .unwrap_or(&self.short_code)
    }
}

/// Portion of the boundary day a leave covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayChoice {
    #[serde(alias = "1")]
    FullDay,
    #[serde(alias = "2")]
    FirstHalf,
    #[serde(alias = "3")]
    SecondHalf,
}

impl Default for DayChoice {
    fn default() -> Self {
        Self::FullDay
    }
}

impl DayChoice {
    pub const fn code(self) -> &'static str {
        match self {
            Self::FullDay => "1",
            Self::FirstHalf => "2",
            Self::SecondHalf => "3",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FullDay => "Full Day",
            Self::FirstHalf => "First Half (Morning)",
            Self::SecondHalf => "Second Half (Afternoon)",
        }
    }

    pub const fn is_half(self) -> bool {
        !matches!(self, Self::FullDay)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day choice '{0}' (expected full_day, first_half, second_half or 1-3)")]
pub struct DayChoiceParseError(pub String);

impl FromStr for DayChoice {
    type Err = DayChoiceParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "full" | "full_day" => Ok(Self::FullDay),
            "2" | "first" | "first_half" => Ok(Self::FirstHalf),
            "3" | "second" | "second_half" => Ok(Self::SecondHalf),
            _ => Err(DayChoiceParseError(value.to_string())),
        }
    }
}

/// Approval lifecycle of a leave application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Recommended,
    NotRecommended,
    Approved,
    Rejected,
    Cancelled,
    PendingCancellation,
}

impl LeaveStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Recommended => "recommended",
            Self::NotRecommended => "not recommended",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::PendingCancellation => "pending_cancellation",
        }
    }

    /// Statuses that still hold the requested dates.
    pub const fn is_active(self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Recommended | Self::Approved | Self::PendingCancellation
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Actions an approver or applicant can take on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveAction {
    Approve,
    Reject,
    Recommend,
    NotRecommend,
    Cancel,
    RequestCancellation,
}

impl LeaveAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Recommend => "recommend",
            Self::NotRecommend => "notrecommend",
            Self::Cancel => "cancel",
            Self::RequestCancellation => "pending_cancel",
        }
    }

    /// Status reached when the action is taken from `from`, or `None` if not allowed.
    pub const fn target(self, from: LeaveStatus) -> Option<LeaveStatus> {
        use LeaveStatus::*;
        match (from, self) {
            (Pending, Self::Approve) | (Recommended, Self::Approve) => Some(Approved),
            (Pending, Self::Reject)
            | (Recommended, Self::Reject)
            | (NotRecommended, Self::Reject) => Some(Rejected),
            (Pending, Self::Recommend) => Some(Recommended),
            (Pending, Self::NotRecommend) => Some(NotRecommended),
            (Pending, Self::Cancel)
            | (Recommended, Self::Cancel)
            | (NotRecommended, Self::Cancel)
            | (Approved, Self::Cancel)
            | (PendingCancellation, Self::Cancel) => Some(Cancelled),
            (Approved, Self::RequestCancellation) => Some(PendingCancellation),
            (PendingCancellation, Self::Approve) => Some(Approved),
            _ => None,
        }
    }
}

/// Inbound leave request as submitted by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub employee: EmployeeId,
    pub leave_type: LeaveTypeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub start_day_choice: DayChoice,
    #[serde(default)]
    pub end_day_choice: DayChoice,
    #[serde(default)]
    pub reason: String,
}

impl LeaveRequest {
    pub fn span(&self) -> HalfDaySpan {
        HalfDaySpan::new(
            self.start_date,
            self.end_date,
            self.start_day_choice,
            self.end_day_choice,
        )
    }
}

/// One calendar day consumed by a leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveDay {
    pub date: NaiveDate,
    pub is_full_day: bool,
}

/// Persisted leave application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveApplication {
    pub id: LeaveApplicationId,
    pub application_no: String,
    pub slug: String,
    pub employee: EmployeeId,
    pub leave_type: LeaveTypeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_day_choice: DayChoice,
    pub end_day_choice: DayChoice,
    pub used_leave: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_after: Option<f64>,
    pub reason: String,
    pub status: LeaveStatus,
    pub applied_on: NaiveDate,
    pub leave_days: Vec<LeaveDay>,
}

impl LeaveApplication {
    pub fn span(&self) -> HalfDaySpan {
        HalfDaySpan::new(
            self.start_date,
            self.end_date,
            self.start_day_choice,
            self.end_day_choice,
        )
    }

    pub fn status_view(&self) -> LeaveStatusView {
        LeaveStatusView {
            id: self.id.clone(),
            application_no: self.application_no.clone(),
            slug: self.slug.clone(),
            employee: self.employee.clone(),
            leave_type: self.leave_type.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            used_leave: self.used_leave,
            balance_after: self.balance_after,
            status: self.status.label(),
        }
    }
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct LeaveStatusView {
    pub id: LeaveApplicationId,
    pub application_no: String,
    pub slug: String,
    pub employee: EmployeeId,
    pub leave_type: LeaveTypeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub used_leave: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_after: Option<f64>,
    pub status: &'static str,
}

/// Audit trail entry written for every application change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveLogEntry {
    pub application: LeaveApplicationId,
    pub actor: EmployeeId,
    pub action: String,
    pub status: LeaveStatus,
    #[serde(default)]
    pub notes: String,
    pub at: NaiveDateTime,
}
