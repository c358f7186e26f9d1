use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Company holiday, optionally spanning several days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub title: String,
    pub short_code: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_holiday_color")]
    pub color_hex: String,
}

fn default_holiday_color() -> String {
    "#ff5733".to_string()
}

impl Holiday {
    pub fn single(title: &str, short_code: &str, date: NaiveDate) -> Self {
        Self {
            title: title.to_string(),
            short_code: short_code.to_string(),
            start_date: date,
            end_date: None,
            color_hex: default_holiday_color(),
        }
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.start_date)
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.last_day()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("holiday '{title}' ends on {end} before it starts on {start}")]
    InvertedHoliday {
        title: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// Weekly offs plus declared holidays.
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    weekly_offs: BTreeSet<u32>,
    holidays: Vec<Holiday>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::with_weekly_offs(&[Weekday::Sun])
    }
}

impl HolidayCalendar {
    pub fn with_weekly_offs(days: &[Weekday]) -> Self {
        Self {
            weekly_offs: days.iter().map(|day| day.num_days_from_monday()).collect(),
            holidays: Vec::new(),
        }
    }

    pub fn add_holiday(&mut self, holiday: Holiday) -> Result<(), CalendarError> {
        if let Some(end) = holiday.end_date {
            if end < holiday.start_date {
                return Err(CalendarError::InvertedHoliday {
                    title: holiday.title,
                    start: holiday.start_date,
                    end,
                });
            }
        }
        self.holidays.push(holiday);
        self.holidays.sort_by_key(|holiday| holiday.start_date);
        Ok(())
    }

    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    pub fn holiday_on(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.iter().find(|holiday| holiday.covers(date))
    }

    pub fn is_weekly_off(&self, date: NaiveDate) -> bool {
        self.weekly_offs
            .contains(&date.weekday().num_days_from_monday())
    }

    pub fn is_non_working(&self, date: NaiveDate) -> bool {
        self.is_weekly_off(date) || self.holiday_on(date).is_some()
    }

    /// Non-working days in the inclusive range, regardless of argument order.
    pub fn non_working_days_between(&self, a: NaiveDate, b: NaiveDate) -> u32 {
        let (from, to) = if a <= b { (a, b) } else { (b, a) };
        dates_inclusive(from, to)
            .filter(|date| self.is_non_working(*date))
            .count() as u32
    }

    pub fn working_days(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        dates_inclusive(from, to)
            .filter(|date| !self.is_non_working(*date))
            .collect()
    }
}

/// Iterate every date from `from` through `to`; empty when `to < from`.
pub fn dates_inclusive(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let span = (to - from).num_days();
    (0..=span.max(-1)).map(move |offset| from + Duration::days(offset))
}

/// Financial-year window containing a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FinancialYear {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FinancialYear {
    pub fn containing(date: NaiveDate, start_month: u32) -> Self {
        let start_month = start_month.clamp(1, 12);
        let start_year = if date.month() >= start_month {
            date.year()
        } else {
            date.year() - 1
        };
        let start = NaiveDate::from_ymd_opt(start_year, start_month, 1).unwrap_or(date);
        let next_start = NaiveDate::from_ymd_opt(start_year + 1, start_month, 1).unwrap_or(date);

        Self {
            start,
            end: next_start - Duration::days(1),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn sundays_and_holidays_are_non_working() {
        let mut calendar = HolidayCalendar::default();
        calendar
            .add_holiday(Holiday::single("Republic Day", "RD", date(2025, 1, 26)))
            .expect("holiday accepted");
        calendar
            .add_holiday(Holiday {
                end_date: Some(date(2025, 1, 15)),
                ..Holiday::single("Pongal", "PG", date(2025, 1, 14))
            })
            .expect("holiday accepted");

        assert!(calendar.is_non_working(date(2025, 1, 12)));
        assert!(calendar.is_non_working(date(2025, 1, 15)));
        assert!(!calendar.is_non_working(date(2025, 1, 16)));
        assert_eq!(
            calendar
                .holiday_on(date(2025, 1, 14))
                .map(|holiday| holiday.short_code.as_str()),
            Some("PG")
        );
        assert_eq!(
            calendar.non_working_days_between(date(2025, 1, 18), date(2025, 1, 11)),
            3
        );
        assert_eq!(
            calendar
                .working_days(date(2025, 1, 13), date(2025, 1, 19))
                .len(),
            4
        );
    }

    #[test]
    fn rejects_inverted_holiday() {
        let mut calendar = HolidayCalendar::default();
        let err = calendar
            .add_holiday(Holiday {
                end_date: Some(date(2025, 3, 1)),
                ..Holiday::single("Holi", "HL", date(2025, 3, 14))
            })
            .expect_err("inverted range rejected");
        assert!(matches!(err, CalendarError::InvertedHoliday { .. }));
    }

    #[test]
    fn financial_year_runs_april_to_march() {
        let fy = FinancialYear::containing(date(2025, 2, 10), 4);
        assert_eq!(fy.start, date(2024, 4, 1));
        assert_eq!(fy.end, date(2025, 3, 31));

        let fy = FinancialYear::containing(date(2025, 4, 1), 4);
        assert_eq!(fy.start, date(2025, 4, 1));
        assert!(fy.contains(date(2026, 3, 31)));
        assert!(!fy.contains(date(2026, 4, 1)));
    }

    #[test]
    fn dates_inclusive_is_empty_for_reversed_range() {
        assert_eq!(dates_inclusive(date(2025, 1, 2), date(2025, 1, 1)).count(), 0);
        assert_eq!(dates_inclusive(date(2025, 1, 1), date(2025, 1, 1)).count(), 1);
    }
}
