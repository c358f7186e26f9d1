//! Leave-day arithmetic over half-day granularity.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::{DayChoice, LeaveDay};
use crate::workflows::calendar::dates_inclusive;

/// Days deducted from the inclusive calendar span, keyed by (start choice, end choice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayChoiceAdjustments {
    table: BTreeMap<(DayChoice, DayChoice), f64>,
}

impl Default for DayChoiceAdjustments {
    fn default() -> Self {
        Self::standard()
    }
}

impl DayChoiceAdjustments {
    pub fn empty() -> Self {
        Self {
            table: BTreeMap::new(),
        }
    }

    /// Starting in the afternoon or finishing at noon each give back half a day.
    pub fn standard() -> Self {
        let mut adjustments = Self::empty();
        for start in [DayChoice::FullDay, DayChoice::FirstHalf, DayChoice::SecondHalf] {
            for end in [DayChoice::FullDay, DayChoice::FirstHalf, DayChoice::SecondHalf] {
                let mut deducted = 0.0;
                if start == DayChoice::SecondHalf {
                    deducted += 0.5;
                }
                if end == DayChoice::FirstHalf {
                    deducted += 0.5;
                }
                adjustments.set(start, end, deducted);
            }
        }
        adjustments
    }

    pub fn set(&mut self, start: DayChoice, end: DayChoice, deducted: f64) {
        self.table.insert((start, end), deducted);
    }

    /// Missing pairs deduct nothing.
    pub fn get(&self, start: DayChoice, end: DayChoice) -> f64 {
        self.table.get(&(start, end)).copied().unwrap_or(0.0)
    }
}

/// Booked days for a leave. Reversed ranges are swapped.
pub fn total_leave_days(
    start: NaiveDate,
    end: NaiveDate,
    start_choice: DayChoice,
    end_choice: DayChoice,
    adjustments: &DayChoiceAdjustments,
) -> f64 {
    let (start, end) = if start <= end {
        (start, end)
    } else {
        (end, start)
    };

    if start == end {
        return if start_choice.is_half() && end_choice.is_half() {
            0.5
        } else {
            1.0
        };
    }

    let span = (end - start).num_days() as f64 + 1.0;
    (span - adjustments.get(start_choice, end_choice)).max(0.0)
}

/// Expand a leave into the calendar days it consumes.
pub fn leave_days(
    start: NaiveDate,
    end: NaiveDate,
    start_choice: DayChoice,
    end_choice: DayChoice,
) -> Vec<LeaveDay> {
    if start == end {
        return vec![LeaveDay {
            date: start,
            is_full_day: !(start_choice.is_half() && end_choice.is_half()),
        }];
    }

    dates_inclusive(start, end)
        .map(|date| {
            let is_full_day = if date == start {
                start_choice != DayChoice::SecondHalf
            } else if date == end {
                end_choice != DayChoice::FirstHalf
            } else {
                true
            };
            LeaveDay { date, is_full_day }
        })
        .collect()
}

/// A leave expressed as an inclusive run of half-day slots (two per calendar day).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfDaySpan {
    pub first: i64,
    pub last: i64,
}

fn slot(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) * 2
}

impl HalfDaySpan {
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        start_choice: DayChoice,
        end_choice: DayChoice,
    ) -> Self {
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };

        if start == end {
            let base = slot(start);
            let (first, last) = match (start_choice, end_choice) {
                (DayChoice::FirstHalf, DayChoice::SecondHalf) => (base, base + 1),
                (DayChoice::FirstHalf, _) | (_, DayChoice::FirstHalf) => (base, base),
                (DayChoice::SecondHalf, _) | (_, DayChoice::SecondHalf) => (base + 1, base + 1),
                (DayChoice::FullDay, DayChoice::FullDay) => (base, base + 1),
            };
            return Self { first, last };
        }

        let first = slot(start) + i64::from(start_choice == DayChoice::SecondHalf);
        let last = slot(end) + i64::from(end_choice != DayChoice::FirstHalf);
        Self { first, last }
    }

    pub fn days(&self) -> f64 {
        (self.last - self.first + 1) as f64 / 2.0
    }

    pub fn overlaps(&self, other: &HalfDaySpan) -> bool {
        self.first <= other.last && other.first <= self.last
    }

    /// Free days between the end of `self` and the start of `next`; zero when touching or overlapping.
    pub fn gap_to(&self, next: &HalfDaySpan) -> f64 {
        let free_slots = next.first - self.last - 1;
        free_slots.max(0) as f64 / 2.0
    }
}
