//! Daily attendance: punch import, status classification and regularization approvals.

pub mod classifier;
pub mod domain;
pub mod punches;
pub mod regularization;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use classifier::{AttendanceClassifier, Classification};
pub use domain::{
    ApprovalStatus, AttendanceLog, AttendanceLogAction, AttendanceLogId, AttendanceSnapshot,
    AttendanceStatus, AttendanceStatusPalette, RegularizationKind, RegularizationWindow,
    ShiftError, ShiftTiming,
};
pub use punches::{
    group_daily, parse_csv, parse_csv_path, parse_device_lines, DailyPunches, Punch, PunchBatch,
    PunchImportError,
};
pub use regularization::{RegularizationAction, RegularizationError};
pub use repository::AttendanceRepository;
pub use router::attendance_router;
pub use service::{AttendanceService, AttendanceServiceError, IngestReport};
