use serde::{Deserialize, Serialize};

use super::domain::{LeaveStatus, LeaveType, LeaveTypeId};
use crate::workflows::directory::EmployeeId;

/// Per employee, per leave type, per year ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalance {
    pub employee: EmployeeId,
    pub leave_type: LeaveTypeId,
    pub year: i32,
    pub no_of_leaves: f64,
    pub remaining: f64,
    pub opening: f64,
    pub closing: f64,
}

impl LeaveBalance {
    pub fn opening(employee: EmployeeId, leave_type: &LeaveType, year: i32) -> Self {
        let allocation = leave_type.default_allocation.unwrap_or(0.0).max(0.0);
        Self {
            employee,
            leave_type: leave_type.id.clone(),
            year,
            no_of_leaves: allocation,
            remaining: allocation,
            opening: allocation,
            closing: allocation,
        }
    }

    pub fn key(&self) -> BalanceKey {
        BalanceKey {
            employee: self.employee.clone(),
            leave_type: self.leave_type.clone(),
            year: self.year,
        }
    }

    /// Closing balance equals opening plus the days granted during the year.
    pub fn update_closing(&mut self, days: f64) -> Result<(), BalanceError> {
        let closing = self.opening + days;
        if closing < 0.0 {
            return Err(BalanceError::Negative {
                field: "closing",
                value: closing,
            });
        }
        self.closing = closing;
        Ok(())
    }

    fn adjust_remaining(&mut self, delta: f64) -> Result<(), BalanceError> {
        let remaining = self.remaining + delta;
        if remaining < 0.0 {
            return Err(BalanceError::Negative {
                field: "remaining",
                value: remaining,
            });
        }
        self.remaining = remaining;
        Ok(())
    }

    /// Move `used` days in or out of the balance for a status change.
    pub fn apply_status_change(
        &mut self,
        from: LeaveStatus,
        to: LeaveStatus,
        used: f64,
    ) -> Result<BalanceMovement, BalanceError> {
        match (from, to) {
            (LeaveStatus::Approved, LeaveStatus::Approved) => Ok(BalanceMovement::None),
            (LeaveStatus::PendingCancellation, LeaveStatus::Approved) => Ok(BalanceMovement::None),
            (_, LeaveStatus::Approved) => {
                self.adjust_remaining(-used)?;
                Ok(BalanceMovement::Debited(used))
            }
            (LeaveStatus::Approved | LeaveStatus::PendingCancellation, LeaveStatus::Cancelled) => {
                self.adjust_remaining(used)?;
                Ok(BalanceMovement::Credited(used))
            }
            _ => Ok(BalanceMovement::None),
        }
    }

    pub fn apply(&mut self, kind: TransactionKind, days: f64) -> Result<(), BalanceError> {
        if days < 0.0 {
            return Err(BalanceError::NegativeAmount(days));
        }
        match kind {
            TransactionKind::Add => self.adjust_remaining(days),
            TransactionKind::Subtract => self.adjust_remaining(-days),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BalanceKey {
    pub employee: EmployeeId,
    pub leave_type: LeaveTypeId,
    pub year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "movement", content = "days")]
pub enum BalanceMovement {
    None,
    Debited(f64),
    Credited(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Add,
    Subtract,
}

/// Which balances a manual transaction touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionTarget {
    Balance(BalanceKey),
    AllOfType { leave_type: LeaveTypeId, year: i32 },
}

/// Manual credit or debit recorded by HR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveTransaction {
    pub kind: TransactionKind,
    pub days: f64,
    pub target: TransactionTarget,
    #[serde(default)]
    pub remarks: String,
}

impl LeaveTransaction {
    pub fn matches(&self, balance: &LeaveBalance) -> bool {
        match &self.target {
            TransactionTarget::Balance(key) => &balance.key() == key,
            TransactionTarget::AllOfType { leave_type, year } => {
                &balance.leave_type == leave_type && balance.year == *year
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BalanceError {
    #[error("{field} balance cannot drop below zero (would be {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("transaction days must be positive, got {0}")]
    NegativeAmount(f64),
    #[error("no balance matched the transaction target")]
    NoMatchingBalance,
}

/// Opening rows for every leave type the employee does not hold yet for `year`.
pub fn initialize_balances(
    employee: &EmployeeId,
    leave_types: &[LeaveType],
    existing: &[LeaveBalance],
    year: i32,
) -> Vec<LeaveBalance> {
    leave_types
        .iter()
        .filter(|leave_type| {
            !existing.iter().any(|balance| {
                &balance.employee == employee
                    && balance.leave_type == leave_type.id
                    && balance.year == year
            })
        })
        .map(|leave_type| LeaveBalance::opening(employee.clone(), leave_type, year))
        .collect()
}
