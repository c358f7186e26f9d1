use chrono::NaiveDate;

use super::domain::{AttendanceLog, AttendanceLogAction, AttendanceLogId, ShiftTiming};
use crate::workflows::directory::{EmployeeId, ShiftId};
use crate::workflows::repository::RepositoryError;

/// Storage for daily attendance logs, their audit trail and shift timings.
pub trait AttendanceRepository: Send + Sync {
    fn upsert_log(&self, log: AttendanceLog) -> Result<AttendanceLog, RepositoryError>;
    fn fetch_log(&self, id: &AttendanceLogId) -> Result<Option<AttendanceLog>, RepositoryError>;
    fn log_on(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceLog>, RepositoryError>;
    fn logs_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceLog>, RepositoryError>;
    /// Logs an employee has submitted for regularization, whatever their state.
    fn submitted_logs(&self) -> Result<Vec<AttendanceLog>, RepositoryError>;

    fn append_action(&self, action: AttendanceLogAction) -> Result<(), RepositoryError>;
    fn actions(&self, id: &AttendanceLogId) -> Result<Vec<AttendanceLogAction>, RepositoryError>;

    fn shift(&self, id: &ShiftId) -> Result<Option<ShiftTiming>, RepositoryError>;
}
