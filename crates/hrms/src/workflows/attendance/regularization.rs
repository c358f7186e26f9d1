use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::classifier::AttendanceClassifier;
use super::domain::{ApprovalStatus, AttendanceLog, RegularizationKind, ShiftTiming};
use crate::workflows::directory::EmployeeId;

/// Decision an approver can take on a submitted regularization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegularizationAction {
    Approve,
    Reject,
    Recommend,
    NotRecommend,
}

impl RegularizationAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Recommend => "recommend",
            Self::NotRecommend => "notrecommend",
        }
    }

    /// Status reached from `from`, or `None` when the action is not allowed.
    pub const fn target(self, from: ApprovalStatus) -> Option<ApprovalStatus> {
        match (self, from) {
            (Self::Recommend, ApprovalStatus::Pending) => Some(ApprovalStatus::Recommended),
            (Self::NotRecommend, ApprovalStatus::Pending) => Some(ApprovalStatus::NotRecommended),
            (
                Self::Approve,
                ApprovalStatus::Pending | ApprovalStatus::Recommended,
            ) => Some(ApprovalStatus::Approved),
            (
                Self::Reject,
                ApprovalStatus::Pending
                | ApprovalStatus::Recommended
                | ApprovalStatus::NotRecommended,
            ) => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegularizationError {
    #[error("attendance for {0} does not need regularization")]
    NotRequired(chrono::NaiveDate),
    #[error("regularization for {0} is already submitted")]
    AlreadySubmitted(chrono::NaiveDate),
    #[error("regularization for {0} has not been submitted")]
    NotSubmitted(chrono::NaiveDate),
    #[error("a reason is required to request regularization")]
    MissingReason,
    #[error("cannot {action} a regularization that is {from}")]
    InvalidTransition { from: &'static str, action: &'static str },
    #[error("no earlier version of this attendance log to restore")]
    NothingToRevert,
}

/// Mark a log as submitted for regularization with the employee's reason.
pub fn submit(log: &mut AttendanceLog, reason: &str) -> Result<(), RegularizationError> {
    if !log.needs_regularization() {
        return Err(RegularizationError::NotRequired(log.date));
    }
    let reopenable = matches!(
        log.reg_status,
        None | Some(ApprovalStatus::Pending)
            | Some(ApprovalStatus::Rejected)
            | Some(ApprovalStatus::NotRecommended)
    );
    if (log.is_submitted && log.reg_status == Some(ApprovalStatus::Pending)) || !reopenable {
        return Err(RegularizationError::AlreadySubmitted(log.date));
    }
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(RegularizationError::MissingReason);
    }
    log.reason = Some(reason.to_string());
    log.is_submitted = true;
    log.reg_status = Some(ApprovalStatus::Pending);
    Ok(())
}

/// Apply an approver decision. Approval rewrites the punches to cover the
/// window and re-derives the day status.
pub fn act(
    log: &mut AttendanceLog,
    action: RegularizationAction,
    actor: &EmployeeId,
    classifier: &AttendanceClassifier,
    shift: &ShiftTiming,
    now: NaiveDateTime,
) -> Result<ApprovalStatus, RegularizationError> {
    if !log.is_submitted {
        return Err(RegularizationError::NotSubmitted(log.date));
    }
    let from = log.reg_status.unwrap_or(ApprovalStatus::Pending);
    let to = action
        .target(from)
        .ok_or(RegularizationError::InvalidTransition {
            from: from.label(),
            action: action.label(),
        })?;

    if action == RegularizationAction::Approve {
        let window = log
            .regularization
            .ok_or(RegularizationError::NotRequired(log.date))?;
        log.history.push(log.snapshot(actor, now));
        match window.kind {
            RegularizationKind::EarlyGoing => log.end = window.to,
            RegularizationKind::LateComing => log.start = window.from,
            RegularizationKind::MisPunching => {
                log.start = window.from;
                log.end = window.to;
            }
        }
        let classification = classifier.classify(log.start, log.end, shift);
        log.status = classification.status;
        log.color_hex = classification.color_hex;
        log.duration_minutes = classification.duration_minutes;
        log.regularized = true;
    }

    log.reg_status = Some(to);
    Ok(to)
}

/// Restore the most recent snapshot, undoing the last approval.
pub fn revert(log: &mut AttendanceLog) -> Result<(), RegularizationError> {
    let snapshot = log
        .history
        .pop()
        .ok_or(RegularizationError::NothingToRevert)?;
    log.restore(snapshot);
    Ok(())
}
