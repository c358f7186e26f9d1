use std::sync::Arc;

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::workflows::directory::EmployeeId;
use crate::workflows::leave::{
    DayChoice, LeaveApplication, LeaveApplicationId, LeaveApplicationService, LeavePolicy,
    LeaveRequest, LeaveStatus, LeaveTypeId,
};
use crate::workflows::lock::LockRegistry;
use crate::workflows::memory::{demo_calendar, InMemoryHrStore, InMemoryNotifier};

pub(super) type Service = LeaveApplicationService<InMemoryHrStore, InMemoryNotifier>;

pub(super) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

/// Monday 2 June 2025, 09:00.
pub(super) fn now() -> NaiveDateTime {
    date(6, 2).and_hms_opt(9, 0, 0).expect("valid time")
}

pub(super) fn asha() -> EmployeeId {
    EmployeeId("emp-asha".to_string())
}

pub(super) fn ravi() -> EmployeeId {
    EmployeeId("emp-ravi".to_string())
}

pub(super) fn request(
    leave_type: &str,
    start: NaiveDate,
    end: NaiveDate,
    start_choice: DayChoice,
    end_choice: DayChoice,
) -> LeaveRequest {
    LeaveRequest {
        employee: asha(),
        leave_type: LeaveTypeId(leave_type.to_string()),
        start_date: start,
        end_date: end,
        start_day_choice: start_choice,
        end_day_choice: end_choice,
        reason: "family function".to_string(),
    }
}

pub(super) fn full_days(leave_type: &str, start: NaiveDate, end: NaiveDate) -> LeaveRequest {
    request(leave_type, start, end, DayChoice::FullDay, DayChoice::FullDay)
}

/// Stored application used as pre-existing history in policy tests.
pub(super) fn stored(
    number: &str,
    leave_type: &str,
    start: NaiveDate,
    end: NaiveDate,
    status: LeaveStatus,
) -> LeaveApplication {
    LeaveApplication {
        id: LeaveApplicationId(format!("leave-{number}")),
        application_no: format!("LV/{number}"),
        slug: format!("asha-{number}"),
        employee: asha(),
        leave_type: LeaveTypeId(leave_type.to_string()),
        start_date: start,
        end_date: end,
        start_day_choice: DayChoice::FullDay,
        end_day_choice: DayChoice::FullDay,
        used_leave: (end - start).num_days() as f64 + 1.0,
        balance_after: None,
        reason: String::new(),
        status,
        applied_on: start,
        leave_days: Vec::new(),
    }
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
    let service = Arc::new(LeaveApplicationService::new(
        store.clone(),
        notifier.clone(),
        LeavePolicy::default(),
        Arc::new(demo_calendar(2025)),
        locks.clone(),
    ));
    service
        .initialize_balances(&asha(), 2025)
        .expect("balances initialised");
    Harness {
        service,
        store,
        notifier,
        locks,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
