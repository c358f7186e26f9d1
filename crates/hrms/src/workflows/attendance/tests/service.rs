use super::common::*;
use crate::workflows::attendance::{
    ApprovalStatus, AttendanceLog, AttendanceRepository, AttendanceServiceError,
    AttendanceStatus, RegularizationAction, RegularizationError, RegularizationKind,
};
use crate::workflows::directory::{Employee, ShiftId};
use crate::workflows::lock::LockPeriod;
use crate::workflows::memory::{demo_employees, demo_night_shift};

fn johns_monday(harness: &Harness) -> AttendanceLog {
    harness
        .service
        .ingest(&monday_punches())
        .expect("ingest succeeds");
    harness
        .store
        .log_on(&employee("emp-john"), date(6, 2))
        .expect("log lookup")
        .expect("john has a log")
}

#[test]
fn ingest_classifies_each_employee_day() {
    let harness = build_service();
    let mut punches = monday_punches();
    punches.push(punch("E001", 6, 2, 9, 5));
    punches.push(punch("E999", 6, 2, 9, 0));

    let report = harness.service.ingest(&punches).expect("ingest succeeds");

    assert_eq!(report.unknown_codes, ["E999"]);
    assert_eq!(report.logs.len(), 3);

    let ravi = &report.logs[0];
    assert_eq!(ravi.employee, employee("emp-ravi"));
    assert_eq!(ravi.status, AttendanceStatus::Absent);
    assert_eq!(
        ravi.regularization.map(|window| window.kind),
        Some(RegularizationKind::MisPunching)
    );

    let asha = &report.logs[1];
    assert_eq!(asha.status, AttendanceStatus::Present);
    assert_eq!(asha.duration_minutes, 518);
    assert_eq!(asha.color_hex, "#28a745");
    assert_eq!(asha.slug, "asha-nair-2025-06-02");
    assert!(!asha.needs_regularization());

    let john = &report.logs[2];
    assert_eq!(john.status, AttendanceStatus::HalfDay);
    let window = john.regularization.expect("early going window");
    assert_eq!(window.kind, RegularizationKind::EarlyGoing);
    assert_eq!(window.from, at(6, 2, 15, 0));
    assert_eq!(window.to, at(6, 2, 17, 30));
    assert_eq!(john.reg_status, Some(ApprovalStatus::Pending));
}

#[test]
fn reingest_updates_open_logs_in_place() {
    let harness = build_service();
    let first = johns_monday(&harness);

    let report = harness
        .service
        .ingest(&[punch("E003", 6, 2, 17, 45)])
        .expect("second import");
    let updated = &report.logs[0];

    assert_eq!(updated.id, first.id);
    assert_eq!(updated.status, AttendanceStatus::Absent);
    assert_eq!(report.preserved, 0);
    assert_eq!(
        harness
            .store
            .logs_between(date(6, 2), date(6, 2))
            .expect("logs load")
            .len(),
        2
    );
}

#[test]
fn submitted_and_locked_days_are_left_alone() {
    let harness = build_service();
    let log = johns_monday(&harness);
    harness
        .service
        .submit_regularization(&log.id, &employee("emp-john"), "client visit", at(6, 3, 10, 0))
        .expect("submitted");

    harness.locks.add(LockPeriod {
        from: date(6, 3),
        to: date(6, 3),
        is_locked: true,
        reason: Some("Payroll processed".to_string()),
    });

    let report = harness
        .service
        .ingest(&[
            punch("E003", 6, 2, 9, 0),
            punch("E003", 6, 2, 18, 0),
            punch("E003", 6, 3, 9, 0),
            punch("E003", 6, 3, 18, 0),
        ])
        .expect("import runs");

    assert_eq!(report.preserved, 1);
    assert_eq!(report.locked_days, 1);
    assert!(report.logs.is_empty());

    let kept = harness.service.get(&log.id).expect("log present");
    assert_eq!(kept.end, at(6, 2, 15, 0));
    assert_eq!(kept.reason.as_deref(), Some("client visit"));
}

#[test]
fn approved_regularization_rewrites_punches_and_can_be_reverted() {
    let harness = build_service();
    let log = johns_monday(&harness);

    let submitted = harness
        .service
        .submit_regularization(&log.id, &employee("emp-john"), "client visit", at(6, 3, 10, 0))
        .expect("submitted");
    assert!(submitted.is_submitted);
    assert_eq!(harness.notifier.inbox(&employee("emp-ravi")).len(), 1);

    let approved = harness
        .service
        .act(
            &log.id,
            RegularizationAction::Approve,
            &employee("emp-ravi"),
            "verified with client",
            at(6, 3, 12, 0),
        )
        .expect("approved");
    assert_eq!(approved.reg_status, Some(ApprovalStatus::Approved));
    assert_eq!(approved.end, at(6, 2, 17, 30));
    assert_eq!(approved.status, AttendanceStatus::Present);
    assert_eq!(approved.duration_minutes, 510);
    assert_eq!(approved.grid_code(), "PR");
    assert_eq!(approved.history.len(), 1);

    let john_inbox = harness.notifier.inbox(&employee("emp-john"));
    assert_eq!(john_inbox.len(), 1);
    assert_eq!(
        john_inbox[0].message,
        "Attendance regularization for 2025-06-02 has been approved."
    );

    let reverted = harness
        .service
        .revert(&log.id, &employee("emp-admin"), at(6, 4, 9, 0))
        .expect("reverted");
    assert_eq!(reverted.status, AttendanceStatus::HalfDay);
    assert_eq!(reverted.end, at(6, 2, 15, 0));
    assert!(!reverted.regularized);
    assert_eq!(reverted.grid_code(), "H");

    let actions: Vec<_> = harness
        .service
        .actions(&log.id)
        .expect("actions load")
        .into_iter()
        .map(|action| action.action)
        .collect();
    assert_eq!(actions, ["submitted", "approve", "revert"]);

    assert!(matches!(
        harness
            .service
            .revert(&log.id, &employee("emp-admin"), at(6, 4, 9, 5)),
        Err(AttendanceServiceError::Regularization(
            RegularizationError::NothingToRevert
        ))
    ));
}

#[test]
fn only_the_owner_submits_and_only_others_decide() {
    let harness = build_service();
    let log = johns_monday(&harness);

    assert!(matches!(
        harness.service.submit_regularization(
            &log.id,
            &employee("emp-ravi"),
            "on behalf",
            at(6, 3, 10, 0)
        ),
        Err(AttendanceServiceError::NotOwner(_))
    ));

    assert!(matches!(
        harness.service.act(
            &log.id,
            RegularizationAction::Approve,
            &employee("emp-ravi"),
            "",
            at(6, 3, 10, 0)
        ),
        Err(AttendanceServiceError::Regularization(
            RegularizationError::NotSubmitted(_)
        ))
    ));

    harness
        .service
        .submit_regularization(&log.id, &employee("emp-john"), "client visit", at(6, 3, 10, 0))
        .expect("submitted");
    assert!(matches!(
        harness.service.act(
            &log.id,
            RegularizationAction::Approve,
            &employee("emp-john"),
            "",
            at(6, 3, 11, 0)
        ),
        Err(AttendanceServiceError::SelfApproval("approve"))
    ));
}

#[test]
fn recommendation_moves_the_request_to_the_admin_desk() {
    let harness = build_service();
    let log = johns_monday(&harness);
    harness
        .service
        .submit_regularization(&log.id, &employee("emp-john"), "client visit", at(6, 3, 10, 0))
        .expect("submitted");

    let pending = |id: &str| {
        harness
            .service
            .pending_for(&employee(id))
            .expect("queue loads")
            .len()
    };
    assert_eq!(pending("emp-ravi"), 1);
    assert_eq!(pending("emp-admin"), 1);
    assert_eq!(pending("emp-meera"), 0);

    harness
        .service
        .act(
            &log.id,
            RegularizationAction::Recommend,
            &employee("emp-ravi"),
            "",
            at(6, 3, 11, 0),
        )
        .expect("recommended");
    assert_eq!(pending("emp-ravi"), 0);
    assert_eq!(pending("emp-meera"), 1);

    let approved = harness
        .service
        .act(
            &log.id,
            RegularizationAction::Approve,
            &employee("emp-meera"),
            "",
            at(6, 3, 12, 0),
        )
        .expect("admin approves");
    assert!(approved.regularized);
    assert_eq!(pending("emp-meera"), 0);
}

#[test]
fn employees_are_classified_against_their_own_shift() {
    let harness = build_service();
    harness.store.add_shift(demo_night_shift());
    let mut nisha: Employee = demo_employees()
        .into_iter()
        .find(|candidate| candidate.id == employee("emp-asha"))
        .expect("seed employee");
    nisha.id = employee("emp-nisha");
    nisha.employee_code = "E005".to_string();
    nisha.full_name = "Nisha Rao".to_string();
    nisha.shift = Some(ShiftId("night".to_string()));
    harness.store.add_employee(nisha);

    let report = harness
        .service
        .ingest(&[punch("E005", 6, 2, 14, 5), punch("E005", 6, 2, 22, 30)])
        .expect("ingest succeeds");
    assert_eq!(report.logs[0].status, AttendanceStatus::Present);

    // The same punches against the general shift are a late coming half day.
    let general = harness
        .service
        .classify(at(6, 2, 14, 5), at(6, 2, 22, 30));
    assert_eq!(general.status, AttendanceStatus::HalfDay);
    assert_eq!(
        general.regularization.map(|window| window.kind),
        Some(RegularizationKind::LateComing)
    );
}
