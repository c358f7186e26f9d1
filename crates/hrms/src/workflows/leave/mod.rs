//! Leave applications: day arithmetic, the policy engine, balances and the approval lifecycle.

pub mod balance;
pub mod days;
pub mod domain;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use balance::{
    BalanceError, BalanceKey, LeaveBalance, LeaveTransaction, TransactionKind, TransactionTarget,
};
pub use days::{total_leave_days, DayChoiceAdjustments, HalfDaySpan};
pub use domain::{
    DayChoice, LeaveAction, LeaveApplication, LeaveApplicationId, LeaveDay, LeaveKind,
    LeaveLogEntry, LeaveRequest, LeaveStatus, LeaveStatusView, LeaveType, LeaveTypeId,
};
pub use policy::{
    LeavePolicy, LeavePolicyConfig, LeavePolicyViolation, LeaveRequestContext, PolicyOutcome,
};
pub use repository::LeaveRepository;
pub use router::leave_router;
pub use service::{LeaveApplicationService, LeaveServiceError};
