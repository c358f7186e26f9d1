use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::workflows::directory::{EmployeeId, ShiftId};

/// Identifier wrapper for attendance logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttendanceLogId(pub String);

/// Working window an employee is rostered on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTiming {
    pub id: ShiftId,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub grace_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_start: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_end: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_start: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_end: Option<NaiveTime>,
}

impl ShiftTiming {
    /// 09:00-17:30 general shift with a fifteen minute grace window.
    pub fn general() -> Self {
        Self {
            id: ShiftId("general".to_string()),
            name: "General Shift".to_string(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            end_time: NaiveTime::from_hms_opt(17, 30, 0).unwrap_or(NaiveTime::MIN),
            grace_minutes: 15,
            grace_start: None,
            grace_end: None,
            break_start: NaiveTime::from_hms_opt(13, 0, 0),
            break_end: NaiveTime::from_hms_opt(13, 30, 0),
        }
    }

    /// Latest login still treated as on time.
    pub fn grace_start_time(&self) -> NaiveTime {
        self.grace_start
            .unwrap_or_else(|| self.start_time + Duration::minutes(i64::from(self.grace_minutes)))
    }

    /// Earliest logout still treated as a full afternoon.
    pub fn grace_end_time(&self) -> NaiveTime {
        self.grace_end
            .unwrap_or_else(|| self.end_time - Duration::minutes(i64::from(self.grace_minutes)))
    }

    pub fn break_minutes(&self) -> Result<Option<i64>, ShiftError> {
        match (self.break_start, self.break_end) {
            (Some(start), Some(end)) if end <= start => Err(ShiftError::InvalidBreak { start, end }),
            (Some(start), Some(end)) => Ok(Some((end - start).num_minutes())),
            _ => Ok(None),
        }
    }

    pub fn validate(&self) -> Result<(), ShiftError> {
        if self.end_time <= self.start_time {
            return Err(ShiftError::InvertedShift {
                start: self.start_time,
                end: self.end_time,
            });
        }
        self.break_minutes().map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShiftError {
    #[error("break end {end} must be after break start {start}")]
    InvalidBreak { start: NaiveTime, end: NaiveTime },
    #[error("shift end {end} must be after shift start {start}")]
    InvertedShift { start: NaiveTime, end: NaiveTime },
}

/// Derived day status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
}

impl AttendanceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::HalfDay => "Half Day",
        }
    }

    pub const fn short_code(self) -> &'static str {
        match self {
            Self::Present => "P",
            Self::Absent => "A",
            Self::HalfDay => "H",
        }
    }
}

/// Colour shown for each status in calendars and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStatusPalette {
    pub present: String,
    pub absent: String,
    pub half_day: String,
}

impl Default for AttendanceStatusPalette {
    fn default() -> Self {
        Self {
            present: "#28a745".to_string(),
            absent: "#dc3545".to_string(),
            half_day: "#ffc107".to_string(),
        }
    }
}

impl AttendanceStatusPalette {
    pub fn color_for(&self, status: AttendanceStatus) -> &str {
        match status {
            AttendanceStatus::Present => &self.present,
            AttendanceStatus::Absent => &self.absent,
            AttendanceStatus::HalfDay => &self.half_day,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegularizationKind {
    LateComing,
    EarlyGoing,
    MisPunching,
}

impl RegularizationKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::LateComing => "late coming",
            Self::EarlyGoing => "early going",
            Self::MisPunching => "mis punching",
        }
    }
}

/// Approval state of a regularization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Recommended,
    NotRecommended,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Recommended => "recommended",
            Self::NotRecommended => "not recommended",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Time window the employee is asked to account for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegularizationWindow {
    pub kind: RegularizationKind,
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl RegularizationWindow {
    pub fn duration_minutes(&self) -> i64 {
        (self.to - self.from).num_minutes()
    }
}

/// Point-in-time copy kept before a regularization rewrites a log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSnapshot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
    pub status: AttendanceStatus,
    pub color_hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regularization: Option<RegularizationWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_status: Option<ApprovalStatus>,
    pub regularized: bool,
    pub modified_by: EmployeeId,
    pub modified_at: NaiveDateTime,
}

/// Per-day clock-in/clock-out record with its derived status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceLog {
    pub id: AttendanceLogId,
    pub employee: EmployeeId,
    pub date: NaiveDate,
    pub slug: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
    pub status: AttendanceStatus,
    pub color_hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regularization: Option<RegularizationWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_status: Option<ApprovalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub is_submitted: bool,
    #[serde(default)]
    pub regularized: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<AttendanceSnapshot>,
}

impl AttendanceLog {
    pub fn needs_regularization(&self) -> bool {
        self.regularization.is_some()
    }

    pub fn validate(&self) -> Result<(), AttendanceLogError> {
        if self.start > self.end {
            return Err(AttendanceLogError::InvertedPunches {
                start: self.start,
                end: self.end,
            });
        }
        if let Some(window) = &self.regularization {
            if window.from >= window.to {
                return Err(AttendanceLogError::EmptyWindow {
                    from: window.from,
                    to: window.to,
                });
            }
        }
        Ok(())
    }

    pub fn snapshot(&self, modified_by: &EmployeeId, at: NaiveDateTime) -> AttendanceSnapshot {
        AttendanceSnapshot {
            start: self.start,
            end: self.end,
            duration_minutes: self.duration_minutes,
            status: self.status,
            color_hex: self.color_hex.clone(),
            regularization: self.regularization,
            reg_status: self.reg_status,
            regularized: self.regularized,
            modified_by: modified_by.clone(),
            modified_at: at,
        }
    }

    pub fn restore(&mut self, snapshot: AttendanceSnapshot) {
        self.start = snapshot.start;
        self.end = snapshot.end;
        self.duration_minutes = snapshot.duration_minutes;
        self.status = snapshot.status;
        self.color_hex = snapshot.color_hex;
        self.regularization = snapshot.regularization;
        self.reg_status = snapshot.reg_status;
        self.regularized = snapshot.regularized;
    }

    /// Short code shown in the monthly grid, suffixed with `R` once regularized.
    pub fn grid_code(&self) -> String {
        if self.regularized {
            format!("{}R", self.status.short_code())
        } else {
            self.status.short_code().to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttendanceLogError {
    #[error("logout {end} is before login {start}")]
    InvertedPunches {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[error("regularization window {from} - {to} is empty")]
    EmptyWindow {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
}

/// Audit trail entry for regularization actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceLogAction {
    pub log: AttendanceLogId,
    pub actor: EmployeeId,
    pub action: String,
    #[serde(default)]
    pub notes: String,
    pub at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
    }

    #[test]
    fn grace_window_defaults_from_minutes() {
        let shift = ShiftTiming::general();
        assert_eq!(shift.grace_start_time(), time(9, 15));
        assert_eq!(shift.grace_end_time(), time(17, 15));

        let explicit = ShiftTiming {
            grace_start: Some(time(9, 30)),
            ..ShiftTiming::general()
        };
        assert_eq!(explicit.grace_start_time(), time(9, 30));
    }

    #[test]
    fn break_must_end_after_it_starts() {
        let shift = ShiftTiming::general();
        assert_eq!(shift.break_minutes(), Ok(Some(30)));

        let broken = ShiftTiming {
            break_end: Some(time(12, 45)),
            ..ShiftTiming::general()
        };
        assert!(matches!(
            broken.validate(),
            Err(ShiftError::InvalidBreak { .. })
        ));
    }

    #[test]
    fn regularized_logs_carry_suffix() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 2)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .expect("valid timestamp");
        let mut log = AttendanceLog {
            id: AttendanceLogId("att-1".to_string()),
            employee: EmployeeId("emp-1".to_string()),
            date: start.date(),
            slug: "emp-1-2025-06-02".to_string(),
            start,
            end: start + Duration::hours(9),
            duration_minutes: 540,
            status: AttendanceStatus::Present,
            color_hex: "#28a745".to_string(),
            regularization: None,
            reg_status: None,
            reason: None,
            is_submitted: false,
            regularized: false,
            history: Vec::new(),
        };
        assert_eq!(log.grid_code(), "P");
        log.regularized = true;
        assert_eq!(log.grid_code(), "PR");
        assert!(log.validate().is_ok());

        log.end = start - Duration::minutes(1);
        assert!(log.validate().is_err());
    }
}
