//! Monthly presence grid and working-hours summaries.

pub mod hours;
pub mod presence;
pub mod router;

use chrono::NaiveDate;

use super::attendance::{AttendanceLog, AttendanceRepository};
use super::directory::{Employee, EmployeeDirectory};
use super::leave::{LeaveApplication, LeaveRepository, LeaveStatus, LeaveType};
use super::repository::RepositoryError;
use super::tour::{Tour, TourRepository};

pub use hours::{top_employees, working_summary, WorkingSummary};
pub use presence::{presence_grid, PresenceGrid, PresenceRow};
pub use router::{reports_router, ReportState};

/// Everything the reports read for one date range.
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    pub employees: Vec<Employee>,
    pub logs: Vec<AttendanceLog>,
    pub leaves: Vec<LeaveApplication>,
    pub leave_types: Vec<LeaveType>,
    pub tours: Vec<Tour>,
}

impl ReportData {
    /// Load approved leave, travelling tours and attendance touching `from..=to`.
    pub fn load<S>(store: &S, from: NaiveDate, to: NaiveDate) -> Result<Self, RepositoryError>
    where
        S: LeaveRepository + TourRepository + AttendanceRepository + EmployeeDirectory,
    {
        let mut employees = EmployeeDirectory::all(store)?;
        employees.sort_by(|a, b| a.employee_code.cmp(&b.employee_code));

        let leaves = LeaveRepository::all(store)?
            .into_iter()
            .filter(|application| application.status == LeaveStatus::Approved)
            .filter(|application| application.start_date <= to && application.end_date >= from)
            .collect();
        let tours = store
            .tours_between(from, to)?
            .into_iter()
            .filter(|tour| tour.status.counts_as_travel())
            .collect();

        Ok(Self {
            employees,
            logs: store.logs_between(from, to)?,
            leaves,
            leave_types: store.leave_types()?,
            tours,
        })
    }
}
