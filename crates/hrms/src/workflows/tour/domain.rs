use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::workflows::directory::EmployeeId;

/// Identifier wrapper for tours.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TourId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TourStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
    Extended,
    PendingCancellation,
}

impl TourStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Extended => "extended",
            Self::PendingCancellation => "pending_cancellation",
        }
    }

    /// Tours that show up on the presence grid.
    pub const fn counts_as_travel(self) -> bool {
        matches!(self, Self::Approved | Self::Extended | Self::Completed)
    }
}

impl std::fmt::Display for TourStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether the tour was approved before or after travelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalType {
    Pre,
    Post,
}

impl ApprovalType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pre => "Pre Approval",
            Self::Post => "Post Approval",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TourAction {
    Approve,
    Reject,
    Cancel,
    RequestCancellation,
    Complete,
    Extend,
}

impl TourAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::RequestCancellation => "pending_cancel",
            Self::Complete => "complete",
            Self::Extend => "extend",
        }
    }

    pub const fn target(self, from: TourStatus) -> Option<TourStatus> {
        use TourStatus::*;
        match (self, from) {
            (Self::Approve, Pending | Extended) => Some(Approved),
            (Self::Reject, Pending | Extended) => Some(Rejected),
            (Self::Cancel, Pending | PendingCancellation) => Some(Cancelled),
            (Self::RequestCancellation, Approved | Extended) => Some(PendingCancellation),
            (Self::Complete, Approved | Extended) => Some(Completed),
            (Self::Extend, Pending | Approved | Extended) => Some(Extended),
            _ => None,
        }
    }

    /// Actions the traveller takes on their own tour.
    pub const fn is_self_service(self) -> bool {
        matches!(
            self,
            Self::Cancel | Self::RequestCancellation | Self::Complete | Self::Extend
        )
    }
}

/// Tour request as submitted by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourRequest {
    pub applied_by: EmployeeId,
    pub from_destination: String,
    pub to_destination: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    pub approval_type: ApprovalType,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tour {
    pub id: TourId,
    pub applied_by: EmployeeId,
    pub short_code: String,
    pub from_destination: String,
    pub to_destination: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_end: Option<NaiveDateTime>,
    pub status: TourStatus,
    pub approval_type: ApprovalType,
    #[serde(default)]
    pub bills_submitted: bool,
    #[serde(default)]
    pub remarks: Option<String>,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TourValidationError {
    #[error("End date must be after start date.")]
    EndBeforeStart,
    #[error("End time must be after start time on the same day.")]
    EndTimeBeforeStart,
    #[error("Extended end {requested} must be after the current end {current}.")]
    ExtensionNotLater {
        requested: NaiveDateTime,
        current: NaiveDateTime,
    },
}

/// Hours spent on tour for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourSegment {
    pub date: NaiveDate,
    pub short_code: String,
    pub minutes: i64,
}

/// Status change record kept for every tour action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourStatusLog {
    pub tour: TourId,
    pub actor: EmployeeId,
    pub action: String,
    pub status: TourStatus,
    #[serde(default)]
    pub comments: String,
    pub at: NaiveDateTime,
}

pub(crate) fn validate_window(
    start_date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_date: NaiveDate,
    end_time: Option<NaiveTime>,
) -> Result<(), TourValidationError> {
    if start_date > end_date {
        return Err(TourValidationError::EndBeforeStart);
    }
    if start_date == end_date {
        if let (Some(start), Some(end)) = (start_time, end_time) {
            if start >= end {
                return Err(TourValidationError::EndTimeBeforeStart);
            }
        }
    }
    Ok(())
}

impl Tour {
    pub fn validate(&self) -> Result<(), TourValidationError> {
        validate_window(self.start_date, self.start_time, self.end_date, self.end_time)
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.start_date
            .and_time(self.start_time.unwrap_or(NaiveTime::MIN))
    }

    /// Without an end time the tour runs to the close of its end date.
    pub fn planned_end(&self) -> NaiveDateTime {
        match self.end_time {
            Some(time) => self.end_date.and_time(time),
            None => self
                .end_date
                .succ_opt()
                .map(|next| next.and_time(NaiveTime::MIN))
                .unwrap_or_else(|| self.end_date.and_time(NaiveTime::MIN)),
        }
    }

    /// Extended end when one was granted, otherwise the planned end.
    pub fn effective_end(&self) -> NaiveDateTime {
        self.extended_end.unwrap_or_else(|| self.planned_end())
    }

    pub fn total_duration(&self) -> Duration {
        self.effective_end() - self.starts_at()
    }

    pub fn extend(&mut self, new_end: NaiveDateTime) -> Result<(), TourValidationError> {
        let current = self.effective_end();
        if new_end <= current {
            return Err(TourValidationError::ExtensionNotLater {
                requested: new_end,
                current,
            });
        }
        self.extended_end = Some(new_end);
        Ok(())
    }

    /// Split the tour into per-day durations, coding a day "T" once it
    /// reaches `full_day_hours` and "TH" otherwise.
    pub fn daily_segments(&self, full_day_hours: u32) -> Vec<TourSegment> {
        let end = self.effective_end();
        let threshold = Duration::hours(i64::from(full_day_hours));
        let half_code = format!("{}H", self.short_code);
        let mut cursor = self.starts_at();
        let mut segments = Vec::new();

        while cursor.date() <= end.date() {
            let Some(next_day) = cursor.date().succ_opt() else {
                break;
            };
            let day_end = next_day.and_time(NaiveTime::MIN).min(end);
            if day_end <= cursor {
                break;
            }
            let spent = day_end - cursor;
            segments.push(TourSegment {
                date: cursor.date(),
                short_code: if spent >= threshold {
                    self.short_code.clone()
                } else {
                    half_code.clone()
                },
                minutes: spent.num_minutes(),
            });
            cursor = next_day.and_time(NaiveTime::MIN);
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).expect("valid date")
    }

    fn time(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).expect("valid time")
    }

    fn tour(start: (u32, u32), end: (u32, u32)) -> Tour {
        Tour {
            id: TourId("tour-1".to_string()),
            applied_by: EmployeeId("emp-1".to_string()),
            short_code: "T".to_string(),
            from_destination: "Pune".to_string(),
            to_destination: "Mumbai".to_string(),
            start_date: date(start.0),
            start_time: Some(time(start.1)),
            end_date: date(end.0),
            end_time: Some(time(end.1)),
            extended_end: None,
            status: TourStatus::Pending,
            approval_type: ApprovalType::Pre,
            bills_submitted: false,
            remarks: None,
            slug: "asha-pune-mumbai".to_string(),
        }
    }

    #[test]
    fn same_day_tour_needs_increasing_times() {
        assert_eq!(tour((2, 9), (2, 18)).validate(), Ok(()));
        assert_eq!(
            tour((2, 18), (2, 9)).validate(),
            Err(TourValidationError::EndTimeBeforeStart)
        );
        assert_eq!(
            tour((3, 9), (2, 18)).validate(),
            Err(TourValidationError::EndBeforeStart)
        );
    }

    #[test]
    fn segments_split_at_midnight() {
        let segments = tour((2, 14), (4, 6)).daily_segments(8);
        let codes: Vec<_> = segments.iter().map(|s| s.short_code.as_str()).collect();
        assert_eq!(codes, vec!["T", "T", "TH"]);
        assert_eq!(segments[0].minutes, 600);
        assert_eq!(segments[1].minutes, 1440);
        assert_eq!(segments[2].minutes, 360);
    }

    #[test]
    fn open_ended_day_counts_as_full_day() {
        let mut trip = tour((2, 0), (2, 0));
        trip.start_time = None;
        trip.end_time = None;
        let segments = trip.daily_segments(8);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].short_code, "T");
    }

    #[test]
    fn extension_moves_total_duration() {
        let mut trip = tour((2, 9), (2, 18));
        assert_eq!(trip.total_duration(), Duration::hours(9));

        let later = date(3).and_time(time(12));
        trip.extend(later).expect("extended");
        assert_eq!(trip.total_duration(), Duration::hours(27));
        assert!(trip.extend(date(2).and_time(time(20))).is_err());
    }

    #[test]
    fn transitions_follow_table() {
        assert_eq!(
            TourAction::Approve.target(TourStatus::Extended),
            Some(TourStatus::Approved)
        );
        assert_eq!(TourAction::Complete.target(TourStatus::Pending), None);
        assert_eq!(
            TourAction::RequestCancellation.target(TourStatus::Approved),
            Some(TourStatus::PendingCancellation)
        );
        assert_eq!(TourAction::Extend.target(TourStatus::Completed), None);
    }
}
