use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use super::ReportData;
use crate::workflows::calendar::{dates_inclusive, HolidayCalendar};
use crate::workflows::directory::EmployeeId;

pub const OFF_CODE: &str = "OFF";

/// One employee's codes across the report range.
#[derive(Debug, Clone, Serialize)]
pub struct PresenceRow {
    pub employee: EmployeeId,
    pub employee_code: String,
    pub full_name: String,
    pub days: BTreeMap<NaiveDate, String>,
    pub totals: BTreeMap<String, usize>,
}

impl PresenceRow {
    pub fn code_on(&self, date: NaiveDate) -> Option<&str> {
        self.days.get(&date).map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PresenceGrid {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub rows: Vec<PresenceRow>,
}

impl PresenceGrid {
    pub fn row(&self, employee: &EmployeeId) -> Option<&PresenceRow> {
        self.rows.iter().find(|row| &row.employee == employee)
    }
}

/// Build the presence grid for every employee in `data`.
///
/// Each cell takes the first source that has something for the day: approved
/// leave, then tour segments, then attendance, then holidays and weekly offs.
pub fn presence_grid(
    data: &ReportData,
    calendar: &HolidayCalendar,
    from: NaiveDate,
    to: NaiveDate,
    full_day_hours: u32,
) -> PresenceGrid {
    let leave_types: HashMap<_, _> = data
        .leave_types
        .iter()
        .map(|leave_type| (&leave_type.id, leave_type))
        .collect();

    let mut leave_codes: HashMap<(&EmployeeId, NaiveDate), String> = HashMap::new();
    for application in &data.leaves {
        let Some(leave_type) = leave_types.get(&application.leave_type) else {
            continue;
        };
        for day in &application.leave_days {
            let code = if day.is_full_day {
                leave_type.short_code.as_str()
            } else {
                leave_type.half_day_code()
            };
            leave_codes.insert((&application.employee, day.date), code.to_string());
        }
    }

    let mut tour_codes: HashMap<(&EmployeeId, NaiveDate), String> = HashMap::new();
    for tour in &data.tours {
        for segment in tour.daily_segments(full_day_hours) {
            tour_codes.insert((&tour.applied_by, segment.date), segment.short_code);
        }
    }

    let attendance_codes: HashMap<(&EmployeeId, NaiveDate), String> = data
        .logs
        .iter()
        .map(|log| ((&log.employee, log.date), log.grid_code()))
        .collect();

    let rows = data
        .employees
        .iter()
        .map(|employee| {
            let mut days = BTreeMap::new();
            let mut totals: BTreeMap<String, usize> = BTreeMap::new();
            for date in dates_inclusive(from, to) {
                let key = (&employee.id, date);
                let code = leave_codes
                    .get(&key)
                    .or_else(|| tour_codes.get(&key))
                    .or_else(|| attendance_codes.get(&key))
                    .cloned()
                    .or_else(|| {
                        calendar
                            .holiday_on(date)
                            .map(|holiday| holiday.short_code.clone())
                    })
                    .or_else(|| calendar.is_weekly_off(date).then(|| OFF_CODE.to_string()));
                if let Some(code) = code {
                    *totals.entry(code.clone()).or_default() += 1;
                    days.insert(date, code);
                }
            }
            PresenceRow {
                employee: employee.id.clone(),
                employee_code: employee.employee_code.clone(),
                full_name: employee.full_name.clone(),
                days,
                totals,
            }
        })
        .collect();

    PresenceGrid { from, to, rows }
}
