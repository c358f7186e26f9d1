use super::common::*;
use crate::workflows::leave::{
    DayChoice, LeaveApplication, LeaveBalance, LeavePolicy, LeavePolicyViolation,
    LeaveRequest, LeaveRequestContext, LeaveStatus, LeaveType, LeaveTypeId, PolicyOutcome,
};
use crate::workflows::memory::{demo_calendar, demo_leave_types};
use chrono::NaiveDate;

fn evaluate(
    request: &LeaveRequest,
    existing: &[LeaveApplication],
    balance: Option<&LeaveBalance>,
) -> Result<PolicyOutcome, LeavePolicyViolation> {
    evaluate_with(&demo_leave_types(), now().date(), request, existing, balance)
}

fn evaluate_with(
    catalogue: &[LeaveType],
    today: NaiveDate,
    request: &LeaveRequest,
    existing: &[LeaveApplication],
    balance: Option<&LeaveBalance>,
) -> Result<PolicyOutcome, LeavePolicyViolation> {
    let leave_type = catalogue
        .iter()
        .find(|leave_type| leave_type.id == request.leave_type)
        .expect("leave type seeded")
        .clone();
    let calendar = demo_calendar(2025);
    LeavePolicy::default().validate(&LeaveRequestContext {
        request,
        leave_type: &leave_type,
        catalogue,
        existing,
        balance,
        calendar: &calendar,
        today,
    })
}

/// Demo catalogue where casual leave may not directly follow casual leave.
fn self_restricted_casual_catalogue() -> Vec<LeaveType> {
    let mut catalogue = demo_leave_types();
    for leave_type in catalogue.iter_mut().filter(|leave_type| leave_type.id.0 == "cl") {
        leave_type.restricted_after.push(LeaveTypeId("cl".to_string()));
    }
    catalogue
}

fn opening(leave_type: &str, remaining: f64) -> LeaveBalance {
    let catalogue = demo_leave_types();
    let leave_type = catalogue
        .iter()
        .find(|candidate| candidate.id.0 == leave_type)
        .expect("leave type seeded");
    LeaveBalance {
        remaining,
        ..LeaveBalance::opening(asha(), leave_type, 2025)
    }
}

#[test]
fn inverted_range_is_rejected_first() {
    let request = full_days("sl", date(6, 12), date(6, 10));
    assert_eq!(
        evaluate(&request, &[], None),
        Err(LeavePolicyViolation::InvalidRange {
            start: date(6, 12),
            end: date(6, 10),
        })
    );
}

#[test]
fn overlapping_active_application_is_reported() {
    let existing = [stored("001", "cl", date(6, 10), date(6, 10), LeaveStatus::Approved)];
    let request = full_days("sl", date(6, 9), date(6, 11));

    assert_eq!(
        evaluate(&request, &existing, None),
        Err(LeavePolicyViolation::Overlap {
            application_no: "LV/001".to_string(),
        })
    );
}

#[test]
fn cancelled_and_rejected_applications_free_their_dates() {
    let existing = [
        stored("001", "sl", date(6, 10), date(6, 10), LeaveStatus::Cancelled),
        stored("002", "sl", date(6, 11), date(6, 11), LeaveStatus::Rejected),
    ];
    let request = full_days("sl", date(6, 10), date(6, 11));

    let outcome = evaluate(&request, &existing, None).expect("dates are free");
    assert_eq!(outcome.booked_days, 2.0);
}

#[test]
fn morning_and_afternoon_halves_of_one_day_do_not_overlap() {
    let mut morning = stored("001", "sl", date(6, 10), date(6, 10), LeaveStatus::Approved);
    morning.start_day_choice = DayChoice::FirstHalf;
    morning.end_day_choice = DayChoice::FirstHalf;
    let afternoon = request(
        "sl",
        date(6, 10),
        date(6, 10),
        DayChoice::SecondHalf,
        DayChoice::SecondHalf,
    );

    let outcome = evaluate(&afternoon, &[morning.clone()], None).expect("halves are disjoint");
    assert_eq!(outcome.booked_days, 0.5);

    let full_day = full_days("sl", date(6, 10), date(6, 10));
    assert!(matches!(
        evaluate(&full_day, &[morning], None),
        Err(LeavePolicyViolation::Overlap { .. })
    ));
}

#[test]
fn earned_leave_cannot_follow_casual_leave_directly() {
    let existing = [stored("001", "cl", date(6, 9), date(6, 10), LeaveStatus::Approved)];
    let request = full_days("el", date(6, 11), date(6, 13));

    assert_eq!(
        evaluate(&request, &existing, None),
        Err(LeavePolicyViolation::RestrictedAfter {
            current: "Earned Leave".to_string(),
            previous: "Casual Leave".to_string(),
        })
    );
}

#[test]
fn casual_leave_cannot_precede_earned_leave_directly() {
    let existing = [stored("001", "el", date(6, 16), date(6, 18), LeaveStatus::Pending)];
    let request = full_days("cl", date(6, 13), date(6, 15));

    let error = evaluate(&request, &existing, None).expect_err("touches the earned leave");
    assert_eq!(
        error,
        LeavePolicyViolation::RestrictedBefore {
            current: "Casual Leave".to_string(),
            next: "Earned Leave".to_string(),
        }
    );
    assert!(error.to_string().contains("immediately before Earned Leave"));
}

#[test]
fn weekly_off_between_earned_and_casual_leave_counts_as_a_gap() {
    // Earned leave ends on Saturday; Sunday is the weekly off.
    let existing = [stored("001", "el", date(6, 5), date(6, 7), LeaveStatus::Approved)];
    let request = full_days("cl", date(6, 9), date(6, 9));

    let outcome = evaluate(&request, &existing, None).expect("one free day separates them");
    assert_eq!(outcome.booked_days, 1.0);
}

#[test]
fn weekly_off_alone_does_not_separate_two_casual_leaves() {
    // Saturday then Monday; the Sunday between them is not a free day.
    let catalogue = self_restricted_casual_catalogue();
    let existing = [stored("001", "cl", date(6, 7), date(6, 7), LeaveStatus::Approved)];
    let request = full_days("cl", date(6, 9), date(6, 9));

    assert_eq!(
        evaluate_with(&catalogue, now().date(), &request, &existing, None),
        Err(LeavePolicyViolation::RestrictedAfter {
            current: "Casual Leave".to_string(),
            previous: "Casual Leave".to_string(),
        })
    );
}

#[test]
fn working_day_between_two_casual_leaves_counts_as_a_gap() {
    // Thursday then Monday; Friday and Saturday are working days.
    let catalogue = self_restricted_casual_catalogue();
    let existing = [stored("001", "cl", date(6, 5), date(6, 5), LeaveStatus::Approved)];
    let request = full_days("cl", date(6, 9), date(6, 9));

    let outcome = evaluate_with(&catalogue, now().date(), &request, &existing, None)
        .expect("working days separate them");
    assert_eq!(outcome.booked_days, 1.0);
}

#[test]
fn casual_leave_needs_a_day_of_notice() {
    let request = full_days("cl", date(6, 2), date(6, 2));
    let error = evaluate(&request, &[], None).expect_err("same-day casual leave");
    assert_eq!(
        error,
        LeavePolicyViolation::NoticeTooShort {
            code: "CL".to_string(),
            days: 1,
        }
    );
    assert_eq!(
        error.to_string(),
        "CL should be applied at least 1 days in advance."
    );
}

#[test]
fn casual_leave_is_capped_at_three_days() {
    let full = full_days("cl", date(6, 9), date(6, 12));
    assert_eq!(
        evaluate(&full, &[], None),
        Err(LeavePolicyViolation::AboveMaximum {
            code: "CL".to_string(),
            max: 3.0,
        })
    );

    let trimmed = request(
        "cl",
        date(6, 9),
        date(6, 12),
        DayChoice::SecondHalf,
        DayChoice::FirstHalf,
    );
    let outcome = evaluate(&trimmed, &[], None).expect("three days fit the cap");
    assert_eq!(outcome.booked_days, 3.0);
}

#[test]
fn earned_leave_needs_at_least_three_days() {
    let request = full_days("el", date(6, 9), date(6, 10));
    assert_eq!(
        evaluate(&request, &[], None),
        Err(LeavePolicyViolation::BelowMinimum {
            code: "EL".to_string(),
            min: 3.0,
        })
    );
}

#[test]
fn earned_leave_is_limited_per_financial_year() {
    let existing = [
        stored("001", "el", date(4, 7), date(4, 9), LeaveStatus::Approved),
        stored("002", "el", date(4, 21), date(4, 23), LeaveStatus::Approved),
        stored("003", "el", date(5, 5), date(5, 7), LeaveStatus::PendingCancellation),
    ];
    let request = full_days("el", date(7, 7), date(7, 9));

    assert_eq!(
        evaluate(&request, &existing, None),
        Err(LeavePolicyViolation::AnnualLimitReached {
            code: "EL".to_string(),
            allowed: 3,
        })
    );

    // Applications from the previous financial year do not count.
    let mut earlier = existing.clone();
    earlier[0] = stored("000", "el", date(3, 3), date(3, 5), LeaveStatus::Approved);
    evaluate(&request, &earlier, None).expect("only two earned leaves this year");
}

#[test]
fn earned_leave_limit_counts_the_financial_year_of_today() {
    // Applied in March 2026 for April 2026: the cap still counts April 2025 to March 2026.
    let today = NaiveDate::from_ymd_opt(2026, 3, 20).expect("valid date");
    let start = NaiveDate::from_ymd_opt(2026, 4, 13).expect("valid date");
    let end = NaiveDate::from_ymd_opt(2026, 4, 15).expect("valid date");
    let existing = [
        stored("001", "el", date(4, 7), date(4, 9), LeaveStatus::Approved),
        stored("002", "el", date(7, 7), date(7, 9), LeaveStatus::Approved),
        stored("003", "el", date(11, 3), date(11, 5), LeaveStatus::Approved),
    ];
    let request = full_days("el", start, end);

    assert_eq!(
        evaluate_with(&demo_leave_types(), today, &request, &existing, None),
        Err(LeavePolicyViolation::AnnualLimitReached {
            code: "EL".to_string(),
            allowed: 3,
        })
    );
}

#[test]
fn insufficient_balance_is_refused() {
    let balance = opening("sl", 1.0);
    let request = full_days("sl", date(6, 9), date(6, 10));

    assert_eq!(
        evaluate(&request, &[], Some(&balance)),
        Err(LeavePolicyViolation::InsufficientBalance {
            code: "SL".to_string(),
            requested: 2.0,
            remaining: 1.0,
        })
    );
}

#[test]
fn outcome_reports_remaining_balance() {
    let balance = opening("sl", 7.0);
    let request = request(
        "sl",
        date(6, 9),
        date(6, 10),
        DayChoice::FullDay,
        DayChoice::FirstHalf,
    );

    let outcome = evaluate(&request, &[], Some(&balance)).expect("balance covers request");
    assert_eq!(
        outcome,
        PolicyOutcome {
            booked_days: 1.5,
            remaining_after: Some(5.5),
        }
    );
}

#[test]
fn unpaid_leave_ignores_the_balance() {
    let balance = opening("lwp", 0.0);
    let request = full_days("lwp", date(6, 9), date(6, 13));

    let outcome = evaluate(&request, &[], Some(&balance)).expect("unpaid leave is uncapped");
    assert_eq!(outcome.booked_days, 5.0);
    assert_eq!(outcome.remaining_after, Some(0.0));
}
