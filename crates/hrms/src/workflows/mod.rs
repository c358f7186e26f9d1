pub mod approvals;
pub mod attendance;
pub mod calendar;
pub mod comp_off;
pub mod directory;
pub mod leave;
pub mod lock;
pub mod memory;
pub mod notifications;
pub mod report;
pub mod repository;
pub mod slug;
pub mod tour;

pub use approvals::{approvals_router, queues_for, ApprovalQueues};
pub use attendance::{attendance_router, AttendanceClassifier, AttendanceService};
pub use calendar::{Holiday, HolidayCalendar};
pub use comp_off::CompOffService;
pub use directory::{Employee, EmployeeDirectory, EmployeeId};
pub use leave::{leave_router, LeaveApplicationService, LeavePolicy};
pub use lock::{LockPeriod, LockRegistry};
pub use memory::{InMemoryHrStore, InMemoryNotifier};
pub use notifications::{NotificationPublisher, Outbound};
pub use report::{reports_router, ReportData, ReportState};
pub use repository::RepositoryError;
pub use tour::{tour_router, TourService};
