use std::sync::Arc;

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::workflows::attendance::{AttendanceClassifier, AttendanceService, Punch};
use crate::workflows::directory::EmployeeId;
use crate::workflows::lock::LockRegistry;
use crate::workflows::memory::{InMemoryHrStore, InMemoryNotifier};

pub(super) type Service = AttendanceService<InMemoryHrStore, InMemoryNotifier>;

pub(super) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

pub(super) fn at(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(month, day)
        .and_hms_opt(hour, minute, 0)
        .expect("valid time")
}

pub(super) fn punch(code: &str, month: u32, day: u32, hour: u32, minute: u32) -> Punch {
    Punch {
        employee_code: code.to_string(),
        at: at(month, day, hour, minute),
    }
}

pub(super) fn employee(id: &str) -> EmployeeId {
    EmployeeId(id.to_string())
}

/// Monday 2 June 2025: John leaves at 15:00, Asha works a full day.
pub(super) fn monday_punches() -> Vec<Punch> {
    vec![
        punch("E003", 6, 2, 9, 0),
        punch("E002", 6, 2, 9, 2),
        punch("E003", 6, 2, 15, 0),
        punch("E002", 6, 2, 13, 10),
        punch("E002", 6, 2, 17, 40),
    ]
}

pub(super) struct Harness {
    pub(super) service: Arc<Service>,
    pub(super) store: Arc<InMemoryHrStore>,
    pub(super) notifier: Arc<InMemoryNotifier>,
    pub(super) locks: Arc<LockRegistry>,
}

pub(super) fn build_service() -> Harness {
    let store = Arc::new(InMemoryHrStore::seeded());
    let notifier = Arc::new(InMemoryNotifier::default());
    let locks = Arc::new(LockRegistry::default());
    let service = Arc::new(AttendanceService::new(
        store.clone(),
        notifier.clone(),
        AttendanceClassifier::default(),
        locks.clone(),
    ));
    Harness {
        service,
        store,
        notifier,
        locks,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
