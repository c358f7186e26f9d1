use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApprovalStatus, AttendanceStatus, AttendanceStatusPalette, RegularizationKind,
    RegularizationWindow, ShiftTiming,
};

/// Result of classifying a day's first and last punch against a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub status: AttendanceStatus,
    pub color_hex: String,
    pub duration_minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regularization: Option<RegularizationWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_status: Option<ApprovalStatus>,
}

/// Derives Present / HalfDay / Absent and any regularization window from punches.
#[derive(Debug, Clone)]
pub struct AttendanceClassifier {
    full_day_hours: u32,
    palette: AttendanceStatusPalette,
}

impl Default for AttendanceClassifier {
    fn default() -> Self {
        Self::new(8)
    }
}

impl AttendanceClassifier {
    pub fn new(full_day_hours: u32) -> Self {
        Self {
            full_day_hours,
            palette: AttendanceStatusPalette::default(),
        }
    }

    pub fn with_palette(mut self, palette: AttendanceStatusPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn full_day_hours(&self) -> u32 {
        self.full_day_hours
    }

    pub fn palette(&self) -> &AttendanceStatusPalette {
        &self.palette
    }

    pub fn classify(
        &self,
        login: NaiveDateTime,
        logout: NaiveDateTime,
        shift: &ShiftTiming,
    ) -> Classification {
        let total = logout - login;
        let full_day = Duration::hours(i64::from(self.full_day_hours));
        let expected_logout = login + full_day;
        let grace_start = shift.grace_start_time();
        let grace_end = shift.grace_end_time();
        let date = login.date();

        let login_time = login.time();
        let logout_time = logout.time();

        if total == Duration::zero() {
            return self.outcome(
                AttendanceStatus::Absent,
                total,
                Some(RegularizationWindow {
                    kind: RegularizationKind::MisPunching,
                    from: login,
                    to: expected_logout,
                }),
            );
        }

        if login_time <= grace_start && total >= full_day && logout_time >= expected_logout.time()
        {
            return self.outcome(AttendanceStatus::Present, total, None);
        }

        // A login exactly at grace start is on time and falls through to early going.
        if login_time > grace_start && (logout_time < grace_end || logout_time > shift.end_time) {
            return self.outcome(
                AttendanceStatus::HalfDay,
                total,
                Some(RegularizationWindow {
                    kind: RegularizationKind::LateComing,
                    from: date.and_time(grace_start),
                    to: login,
                }),
            );
        }

        if login_time <= grace_start && logout_time < expected_logout.time() {
            let to = if expected_logout.time() < shift.end_time {
                date.and_time(shift.end_time)
            } else {
                expected_logout
            };
            return self.outcome(
                AttendanceStatus::HalfDay,
                total,
                Some(RegularizationWindow {
                    kind: RegularizationKind::EarlyGoing,
                    from: logout,
                    to,
                }),
            );
        }

        if login_time >= grace_start && logout_time < shift.end_time {
            return self.outcome(AttendanceStatus::HalfDay, total, None);
        }

        self.outcome(AttendanceStatus::Absent, total, None)
    }

    fn outcome(
        &self,
        status: AttendanceStatus,
        total: Duration,
        regularization: Option<RegularizationWindow>,
    ) -> Classification {
        // An empty window cannot be regularized.
        let regularization = regularization.filter(|window| window.from < window.to);
        Classification {
            status,
            color_hex: self.palette.color_for(status).to_string(),
            duration_minutes: total.num_minutes(),
            reg_status: regularization.map(|_| ApprovalStatus::Pending),
            regularization,
        }
    }
}
