use super::balance::{BalanceKey, LeaveBalance};
use super::domain::{LeaveApplication, LeaveApplicationId, LeaveLogEntry, LeaveType, LeaveTypeId};
use crate::workflows::directory::EmployeeId;
use crate::workflows::repository::RepositoryError;

/// Storage abstraction so the leave service can be exercised in isolation.
pub trait LeaveRepository: Send + Sync {
    fn insert(&self, application: LeaveApplication) -> Result<LeaveApplication, RepositoryError>;
    fn update(&self, application: LeaveApplication) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LeaveApplicationId) -> Result<Option<LeaveApplication>, RepositoryError>;
    fn for_employee(&self, employee: &EmployeeId) -> Result<Vec<LeaveApplication>, RepositoryError>;
    fn all(&self) -> Result<Vec<LeaveApplication>, RepositoryError>;
    fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError>;

    fn append_log(&self, entry: LeaveLogEntry) -> Result<(), RepositoryError>;
    fn logs(&self, id: &LeaveApplicationId) -> Result<Vec<LeaveLogEntry>, RepositoryError>;

    fn leave_type(&self, id: &LeaveTypeId) -> Result<Option<LeaveType>, RepositoryError>;
    fn leave_types(&self) -> Result<Vec<LeaveType>, RepositoryError>;

    fn balance(&self, key: &BalanceKey) -> Result<Option<LeaveBalance>, RepositoryError>;
    fn balances(&self) -> Result<Vec<LeaveBalance>, RepositoryError>;
    fn upsert_balance(&self, balance: LeaveBalance) -> Result<(), RepositoryError>;
}
