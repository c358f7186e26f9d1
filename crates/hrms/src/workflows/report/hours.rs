use chrono::NaiveDate;
use serde::Serialize;

use super::ReportData;
use crate::workflows::attendance::AttendanceStatus;
use crate::workflows::calendar::HolidayCalendar;
use crate::workflows::directory::EmployeeId;

/// Expected against actual working hours for one employee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkingSummary {
    pub employee: EmployeeId,
    pub employee_code: String,
    pub full_name: String,
    pub working_days: usize,
    pub days_present: usize,
    pub expected_hours: f64,
    pub actual_hours: f64,
}

impl WorkingSummary {
    pub fn shortfall_hours(&self) -> f64 {
        (self.expected_hours - self.actual_hours).max(0.0)
    }
}

/// Expected hours are working days times `full_day_hours`; actual hours sum the logged durations.
pub fn working_summary(
    data: &ReportData,
    calendar: &HolidayCalendar,
    from: NaiveDate,
    to: NaiveDate,
    full_day_hours: u32,
) -> Vec<WorkingSummary> {
    let working_days = calendar.working_days(from, to).len();
    let expected_hours = working_days as f64 * f64::from(full_day_hours);

    data.employees
        .iter()
        .map(|employee| {
            let logs = data
                .logs
                .iter()
                .filter(|log| log.employee == employee.id && log.date >= from && log.date <= to);
            let mut minutes = 0_i64;
            let mut days_present = 0;
            for log in logs {
                minutes += log.duration_minutes.max(0);
                if log.status != AttendanceStatus::Absent {
                    days_present += 1;
                }
            }
            WorkingSummary {
                employee: employee.id.clone(),
                employee_code: employee.employee_code.clone(),
                full_name: employee.full_name.clone(),
                working_days,
                days_present,
                expected_hours,
                actual_hours: minutes as f64 / 60.0,
            }
        })
        .collect()
}

/// The `n` employees with the most actual hours, ties broken by employee code.
pub fn top_employees(mut summaries: Vec<WorkingSummary>, n: usize) -> Vec<WorkingSummary> {
    summaries.sort_by(|a, b| {
        b.actual_hours
            .total_cmp(&a.actual_hours)
            .then_with(|| a.employee_code.cmp(&b.employee_code))
    });
    summaries.truncate(n);
    summaries
}
