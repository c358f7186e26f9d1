use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::workflows::directory::EmployeeId;
use crate::workflows::lock::LockRegistry;
use crate::workflows::memory::{InMemoryHrStore, InMemoryNotifier};
use crate::workflows::tour::{ApprovalType, TourRequest, TourService};

pub(super) type Service = TourService<InMemoryHrStore, InMemoryNotifier>;

pub(super) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

pub(super) fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

pub(super) fn at(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(month, day).and_time(time(hour, minute))
}

pub(super) fn employee(id: &str) -> EmployeeId {
    EmployeeId(id.to_string())
}

/// Asha travels Pune to Mumbai from Tuesday 14:00 to Thursday 06:00.
pub(super) fn mumbai_trip() -> TourRequest {
    TourRequest {
        applied_by: employee("emp-asha"),
        from_destination: "Pune".to_string(),
        to_destination: "Mumbai".to_string(),
        start_date: date(6, 3),
        start_time: Some(time(14, 0)),
        end_date: date(6, 5),
        end_time: Some(time(6, 0)),
        approval_type: ApprovalType::Pre,
        remarks: Some("client workshop".to_string()),
    }
}

pub(super) struct Harness {
    pub(super) service: Arc<Service>,
    pub(super) notifier: Arc<InMemoryNotifier>,
    pub(super) locks: Arc<LockRegistry>,
}

pub(super) fn build_service() -> Harness {
    let store = Arc::new(InMemoryHrStore::seeded());
    let notifier = Arc::new(InMemoryNotifier::default());
    let locks = Arc::new(LockRegistry::default());
    let service = Arc::new(TourService::new(store, notifier.clone(), locks.clone()));
    Harness {
        service,
        notifier,
        locks,
    }
}
