use chrono::{Duration, NaiveDate};

use super::super::days::HalfDaySpan;
use super::super::domain::{LeaveApplication, LeaveKind, LeaveRequest, LeaveStatus, LeaveType};
use super::{LeavePolicyViolation, LeaveRequestContext};
use crate::workflows::calendar::{FinancialYear, HolidayCalendar};

pub(crate) fn check_range(request: &LeaveRequest) -> Result<(), LeavePolicyViolation> {
    if request.start_date > request.end_date {
        return Err(LeavePolicyViolation::InvalidRange {
            start: request.start_date,
            end: request.end_date,
        });
    }
    Ok(())
}

fn active(existing: &[LeaveApplication]) -> impl Iterator<Item = &LeaveApplication> {
    existing
        .iter()
        .filter(|application| application.status.is_active())
}

pub(crate) fn check_overlap(
    context: &LeaveRequestContext<'_>,
) -> Result<(), LeavePolicyViolation> {
    let span = context.request.span();
    match active(context.existing).find(|application| application.span().overlaps(&span)) {
        Some(clash) => Err(LeavePolicyViolation::Overlap {
            application_no: clash.application_no.clone(),
        }),
        None => Ok(()),
    }
}

fn lookup<'a>(
    context: &LeaveRequestContext<'a>,
    application: &LeaveApplication,
) -> Option<&'a LeaveType> {
    context
        .catalogue
        .iter()
        .find(|leave_type| leave_type.id == application.leave_type)
}

/// Non-working days strictly between two dates.
fn non_working_strictly_between(
    calendar: &HolidayCalendar,
    earlier: NaiveDate,
    later: NaiveDate,
) -> f64 {
    let from = earlier + Duration::days(1);
    let to = later - Duration::days(1);
    if from > to {
        return 0.0;
    }
    f64::from(calendar.non_working_days_between(from, to))
}

/// Free days between two leaves; weekly offs and holidays do not count between two casual leaves.
fn effective_gap(
    calendar: &HolidayCalendar,
    earlier: &LeaveApplicationBounds,
    later: &LeaveApplicationBounds,
) -> f64 {
    let raw_gap = earlier.span.gap_to(&later.span);
    if earlier.kind == LeaveKind::Casual && later.kind == LeaveKind::Casual {
        raw_gap - non_working_strictly_between(calendar, earlier.end_date, later.start_date)
    } else {
        raw_gap
    }
}

struct LeaveApplicationBounds {
    span: HalfDaySpan,
    kind: LeaveKind,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl LeaveApplicationBounds {
    fn of_application(application: &LeaveApplication, kind: LeaveKind) -> Self {
        Self {
            span: application.span(),
            kind,
            start_date: application.start_date,
            end_date: application.end_date,
        }
    }

    fn of_request(request: &LeaveRequest, kind: LeaveKind) -> Self {
        Self {
            span: request.span(),
            kind,
            start_date: request.start_date,
            end_date: request.end_date,
        }
    }
}

/// Restricted pairs of leave types may not touch, checked against both neighbours.
pub(crate) fn check_consecutive(
    context: &LeaveRequestContext<'_>,
) -> Result<(), LeavePolicyViolation> {
    let current = context.leave_type;
    let requested = LeaveApplicationBounds::of_request(context.request, current.kind);

    let previous = active(context.existing)
        .filter(|application| application.span().last < requested.span.first)
        .max_by_key(|application| application.span().last);
    if let Some(previous) = previous {
        if current.is_restricted_after(&previous.leave_type) {
            let previous_type = lookup(context, previous);
            let previous_kind = previous_type
                .map(|leave_type| leave_type.kind)
                .unwrap_or(LeaveKind::Other);
            let bounds = LeaveApplicationBounds::of_application(previous, previous_kind);
            if effective_gap(context.calendar, &bounds, &requested) <= 0.0 {
                return Err(LeavePolicyViolation::RestrictedAfter {
                    current: current.name.clone(),
                    previous: previous_type
                        .map(|leave_type| leave_type.name.clone())
                        .unwrap_or_else(|| previous.leave_type.0.clone()),
                });
            }
        }
    }

    let next = active(context.existing)
        .filter(|application| application.span().first > requested.span.last)
        .min_by_key(|application| application.span().first);
    if let Some(next) = next {
        if let Some(next_type) = lookup(context, next) {
            if next_type.is_restricted_after(&current.id) {
                let bounds = LeaveApplicationBounds::of_application(next, next_type.kind);
                if effective_gap(context.calendar, &requested, &bounds) <= 0.0 {
                    return Err(LeavePolicyViolation::RestrictedBefore {
                        current: current.name.clone(),
                        next: next_type.name.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}

pub(crate) fn check_notice(
    context: &LeaveRequestContext<'_>,
) -> Result<(), LeavePolicyViolation> {
    let leave_type = context.leave_type;
    if let Some(days) = leave_type.min_notice_days {
        let notice = (context.request.start_date - context.today).num_days();
        if notice < days {
            return Err(LeavePolicyViolation::NoticeTooShort {
                code: leave_type.short_code.clone(),
                days,
            });
        }
    }
    Ok(())
}

pub(crate) fn check_day_limits(
    leave_type: &LeaveType,
    booked_days: f64,
) -> Result<(), LeavePolicyViolation> {
    if let Some(min) = leave_type.min_days_limit.filter(|min| *min > 0.0) {
        if booked_days < min {
            return Err(LeavePolicyViolation::BelowMinimum {
                code: leave_type.short_code.clone(),
                min,
            });
        }
    }
    if let Some(max) = leave_type.max_days_limit.filter(|max| *max > 0.0) {
        if booked_days > max {
            return Err(LeavePolicyViolation::AboveMaximum {
                code: leave_type.short_code.clone(),
                max,
            });
        }
    }
    Ok(())
}

/// Counts granted applications of the same type whose start falls in the current financial year.
pub(crate) fn check_annual_applications(
    context: &LeaveRequestContext<'_>,
    financial_year_start_month: u32,
) -> Result<(), LeavePolicyViolation> {
    let leave_type = context.leave_type;
    let Some(allowed) = leave_type.allowed_days_per_year else {
        return Ok(());
    };

    let year = FinancialYear::containing(context.today, financial_year_start_month);
    let taken = context
        .existing
        .iter()
        .filter(|application| application.leave_type == leave_type.id)
        .filter(|application| {
            matches!(
                application.status,
                LeaveStatus::Approved | LeaveStatus::PendingCancellation
            )
        })
        .filter(|application| year.contains(application.start_date))
        .count();

    if taken >= allowed as usize {
        return Err(LeavePolicyViolation::AnnualLimitReached {
            code: leave_type.short_code.clone(),
            allowed,
        });
    }
    Ok(())
}

pub(crate) fn check_balance(
    context: &LeaveRequestContext<'_>,
    booked_days: f64,
) -> Result<Option<f64>, LeavePolicyViolation> {
    let leave_type = context.leave_type;
    let Some(balance) = context.balance else {
        return Ok(None);
    };
    if !leave_type.kind.tracks_balance() {
        return Ok(Some(balance.remaining));
    }
    if booked_days > balance.remaining {
        return Err(LeavePolicyViolation::InsufficientBalance {
            code: leave_type.short_code.clone(),
            requested: booked_days,
            remaining: balance.remaining,
        });
    }
    Ok(Some(balance.remaining - booked_days))
}
