use super::common::*;
use crate::workflows::lock::LockPeriod;
use crate::workflows::tour::{TourAction, TourServiceError, TourStatus, TourValidationError};

#[test]
fn apply_stores_pending_tour_and_notifies_manager() {
    let harness = build_service();
    let tour = harness
        .service
        .apply(mumbai_trip(), at(6, 2, 10, 0))
        .expect("tour accepted");

    assert_eq!(tour.status, TourStatus::Pending);
    assert_eq!(tour.slug, "asha-pune-mumbai-2025-06-03");
    assert_eq!(tour.total_duration().num_hours(), 40);

    let inbox = harness.notifier.inbox(&employee("emp-ravi"));
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].message, "Tour 'Pune to Mumbai' has been pending.");

    let second = harness
        .service
        .apply(mumbai_trip(), at(6, 2, 11, 0))
        .expect("same trip again");
    assert_eq!(second.slug, "asha-pune-mumbai-2025-06-03-1");
}

#[test]
fn inverted_window_is_rejected() {
    let harness = build_service();
    let mut request = mumbai_trip();
    request.end_date = date(6, 3);
    request.end_time = Some(time(9, 0));

    assert!(matches!(
        harness.service.apply(request, at(6, 2, 10, 0)),
        Err(TourServiceError::Validation(
            TourValidationError::EndTimeBeforeStart
        ))
    ));
}

#[test]
fn manager_approves_and_traveller_extends_and_completes() {
    let harness = build_service();
    let tour = harness
        .service
        .apply(mumbai_trip(), at(6, 2, 10, 0))
        .expect("accepted");

    assert!(matches!(
        harness.service.act(
            &tour.id,
            TourAction::Approve,
            &employee("emp-asha"),
            "",
            None,
            at(6, 2, 11, 0)
        ),
        Err(TourServiceError::SelfApproval("approve"))
    ));

    let approved = harness
        .service
        .act(
            &tour.id,
            TourAction::Approve,
            &employee("emp-ravi"),
            "go ahead",
            None,
            at(6, 2, 12, 0),
        )
        .expect("approved");
    assert_eq!(approved.status, TourStatus::Approved);

    assert!(matches!(
        harness.service.act(
            &tour.id,
            TourAction::Extend,
            &employee("emp-asha"),
            "workshop overran",
            None,
            at(6, 4, 18, 0)
        ),
        Err(TourServiceError::MissingExtension)
    ));
    assert!(matches!(
        harness.service.act(
            &tour.id,
            TourAction::Extend,
            &employee("emp-asha"),
            "earlier",
            Some(at(6, 4, 20, 0)),
            at(6, 4, 18, 0)
        ),
        Err(TourServiceError::Validation(
            TourValidationError::ExtensionNotLater { .. }
        ))
    ));

    let extended = harness
        .service
        .act(
            &tour.id,
            TourAction::Extend,
            &employee("emp-asha"),
            "workshop overran",
            Some(at(6, 5, 20, 0)),
            at(6, 4, 18, 0),
        )
        .expect("extended");
    assert_eq!(extended.status, TourStatus::Extended);
    assert_eq!(extended.effective_end(), at(6, 5, 20, 0));

    let reapproved = harness
        .service
        .act(
            &tour.id,
            TourAction::Approve,
            &employee("emp-ravi"),
            "",
            None,
            at(6, 4, 19, 0),
        )
        .expect("extension approved");
    assert_eq!(reapproved.status, TourStatus::Approved);

    let completed = harness
        .service
        .act(
            &tour.id,
            TourAction::Complete,
            &employee("emp-asha"),
            "",
            None,
            at(6, 6, 9, 0),
        )
        .expect("completed");
    assert_eq!(completed.status, TourStatus::Completed);

    let comments: Vec<_> = harness
        .service
        .logs(&tour.id)
        .expect("logs load")
        .into_iter()
        .map(|entry| (entry.action, entry.comments))
        .collect();
    assert_eq!(comments.len(), 5);
    assert_eq!(
        comments[2].1,
        "Tour extended to 2025-06-05 20:00:00. Reason: workshop overran"
    );

    assert!(matches!(
        harness.service.act(
            &tour.id,
            TourAction::Cancel,
            &employee("emp-asha"),
            "",
            None,
            at(6, 6, 10, 0)
        ),
        Err(TourServiceError::InvalidTransition {
            from: TourStatus::Completed,
            action: "cancel",
        })
    ));
}

#[test]
fn approved_tour_cancels_through_a_request() {
    let harness = build_service();
    let tour = harness
        .service
        .apply(mumbai_trip(), at(6, 2, 10, 0))
        .expect("accepted");
    harness
        .service
        .act(&tour.id, TourAction::Approve, &employee("emp-ravi"), "", None, at(6, 2, 12, 0))
        .expect("approved");

    assert!(matches!(
        harness.service.act(
            &tour.id,
            TourAction::Cancel,
            &employee("emp-asha"),
            "",
            None,
            at(6, 2, 13, 0)
        ),
        Err(TourServiceError::InvalidTransition { .. })
    ));

    let requested = harness
        .service
        .act(
            &tour.id,
            TourAction::RequestCancellation,
            &employee("emp-asha"),
            "client postponed",
            None,
            at(6, 2, 13, 0),
        )
        .expect("cancellation requested");
    assert_eq!(requested.status, TourStatus::PendingCancellation);

    let cancelled = harness
        .service
        .act(&tour.id, TourAction::Cancel, &employee("emp-ravi"), "", None, at(6, 2, 14, 0))
        .expect("cancelled");
    assert_eq!(cancelled.status, TourStatus::Cancelled);
    assert!(!cancelled.status.counts_as_travel());
}

#[test]
fn locked_start_date_blocks_tours() {
    let harness = build_service();
    harness.locks.add(LockPeriod {
        from: date(6, 1),
        to: date(6, 30),
        is_locked: true,
        reason: None,
    });

    assert!(matches!(
        harness.service.apply(mumbai_trip(), at(6, 2, 10, 0)),
        Err(TourServiceError::Lock(_))
    ));
}

#[test]
fn bills_can_be_marked_submitted() {
    let harness = build_service();
    let tour = harness
        .service
        .apply(mumbai_trip(), at(6, 2, 10, 0))
        .expect("accepted");

    let updated = harness
        .service
        .mark_bills_submitted(&tour.id)
        .expect("bills recorded");
    assert!(updated.bills_submitted);
    assert!(harness.service.get(&tour.id).expect("stored").bills_submitted);
}
