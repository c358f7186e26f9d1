use crate::infra::{parse_date, parse_datetime, HrmsStack};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;
use hrms::config::PolicySettings;
use hrms::error::AppError;
use hrms::workflows::approvals::queues_for;
use hrms::workflows::attendance::{
    parse_csv_path, parse_device_lines, AttendanceLog, PunchBatch, RegularizationAction,
};
use hrms::workflows::directory::EmployeeId;
use hrms::workflows::leave::{DayChoice, LeaveAction, LeaveRequest, LeaveTypeId};
use hrms::workflows::lock::LockPeriod;
use hrms::workflows::report::{presence_grid, top_employees, working_summary, ReportData};
use hrms::workflows::tour::{ApprovalType, TourAction, TourRequest};
use std::error::Error;
use std::path::PathBuf;

type StepResult = Result<(), Box<dyn Error>>;

#[derive(Args, Debug)]
pub(crate) struct LeaveCheckArgs {
    /// Employee id from the demo organisation (e.g. emp-asha)
    #[arg(long)]
    pub(crate) employee: String,
    /// Leave type id (cl, sl, el, lwp, co)
    #[arg(long = "type")]
    pub(crate) leave_type: String,
    /// First day of leave (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: NaiveDate,
    /// Last day of leave (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) end: NaiveDate,
    /// Portion of the first day: 1 full, 2 first half, 3 second half
    #[arg(long, default_value = "1")]
    pub(crate) start_choice: DayChoice,
    /// Portion of the last day: 1 full, 2 first half, 3 second half
    #[arg(long, default_value = "1")]
    pub(crate) end_choice: DayChoice,
    /// Evaluation date for notice rules (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// First punch of the day (YYYY-MM-DD HH:MM)
    #[arg(long, value_parser = parse_datetime)]
    pub(crate) login: NaiveDateTime,
    /// Last punch of the day (YYYY-MM-DD HH:MM)
    #[arg(long, value_parser = parse_datetime)]
    pub(crate) logout: NaiveDateTime,
}

#[derive(Args, Debug)]
pub(crate) struct AttendanceImportArgs {
    /// Punch export to read
    pub(crate) file: PathBuf,
    /// Treat the file as CSV with `Employee Code` and `Punch Time` columns
    #[arg(long)]
    pub(crate) csv: bool,
    /// Keep seconds from device lines instead of truncating to the minute
    #[arg(long)]
    pub(crate) include_seconds: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Monday of the demo week (YYYY-MM-DD). Defaults to the Monday two weeks out.
    #[arg(long, value_parser = parse_date)]
    pub(crate) week_start: Option<NaiveDate>,
}

pub(crate) fn run_leave_check(args: LeaveCheckArgs) -> Result<(), AppError> {
    let settings = PolicySettings::from_env()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let stack = HrmsStack::seeded(&settings, args.start.year());
    let employee = EmployeeId(args.employee);

    if let Err(err) = stack
        .leave
        .initialize_balances(&employee, args.start.year())
    {
        println!("Leave check unavailable: {err}");
        return Ok(());
    }

    let request = LeaveRequest {
        employee,
        leave_type: LeaveTypeId(args.leave_type),
        start_date: args.start,
        end_date: args.end,
        start_day_choice: args.start_choice,
        end_day_choice: args.end_choice,
        reason: String::new(),
    };

    println!(
        "Leave check for {} ({}) {} {} -> {} {}",
        request.employee.0,
        request.leave_type.0,
        request.start_date,
        request.start_day_choice.label(),
        request.end_date,
        request.end_day_choice.label()
    );
    match stack.leave.check(&request, today) {
        Ok(outcome) => {
            println!("- Allowed: {} day(s) booked", outcome.booked_days);
            if let Some(remaining) = outcome.remaining_after {
                println!("- Balance after approval: {remaining}");
            }
        }
        Err(err) => println!("- Refused: {err}"),
    }
    Ok(())
}

pub(crate) fn run_attendance_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let settings = PolicySettings::from_env()?;
    let stack = HrmsStack::seeded(&settings, args.login.year());
    let shift = stack.attendance.default_shift();

    println!(
        "Classifying {} -> {} against {} ({} - {}, grace {} min)",
        args.login,
        args.logout,
        shift.name,
        shift.start_time,
        shift.end_time,
        shift.grace_minutes
    );
    let classification = stack.attendance.classify(args.login, args.logout);
    println!(
        "- Status: {} ({}) after {} minutes",
        classification.status.label(),
        classification.color_hex,
        classification.duration_minutes
    );
    match &classification.regularization {
        Some(window) => println!(
            "- Needs regularization: {} {} -> {}",
            window.kind.label(),
            window.from.time(),
            window.to.time()
        ),
        None => println!("- No regularization required"),
    }
    Ok(())
}

pub(crate) fn run_attendance_import(args: AttendanceImportArgs) -> Result<(), AppError> {
    let settings = PolicySettings::from_env()?;
    let batch = if args.csv {
        parse_csv_path(&args.file)?
    } else {
        let text = std::fs::read_to_string(&args.file)?;
        parse_device_lines(&text, args.include_seconds)
    };
    let PunchBatch { punches, rejected } = batch;

    println!(
        "Read {} punches from {} ({} line(s) rejected)",
        punches.len(),
        args.file.display(),
        rejected
    );
    let Some(first) = punches.iter().map(|punch| punch.at).min() else {
        return Ok(());
    };

    let stack = HrmsStack::seeded(&settings, first.year());
    let report = match stack.attendance.ingest(&punches) {
        Ok(report) => report,
        Err(err) => {
            println!("Import stopped: {err}");
            return Ok(());
        }
    };
    for log in &report.logs {
        print_log(log);
    }
    if !report.unknown_codes.is_empty() {
        println!("Unknown employee codes: {}", report.unknown_codes.join(", "));
    }
    Ok(())
}

fn print_log(log: &AttendanceLog) {
    let window = log
        .regularization
        .as_ref()
        .map(|window| {
            format!(
                " | {} {} -> {}",
                window.kind.label(),
                window.from.time(),
                window.to.time()
            )
        })
        .unwrap_or_default();
    println!(
        "  - {} {} {} -> {} | {} ({} min){}",
        log.employee.0,
        log.date,
        log.start.time(),
        log.end.time(),
        log.status.label(),
        log.duration_minutes,
        window
    );
}

fn default_week_start(today: NaiveDate) -> NaiveDate {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    monday + Duration::weeks(2)
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN))
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let settings = PolicySettings::from_env()?;
    let requested = args
        .week_start
        .unwrap_or_else(|| default_week_start(Local::now().date_naive()));
    let week_start = requested
        - Duration::days(i64::from(requested.weekday().num_days_from_monday()));
    let now = at(week_start - Duration::days(7), 9, 0);
    let stack = HrmsStack::seeded(&settings, week_start.year());

    println!("HRMS workflow demo for the week of {week_start}");

    let steps: [(&str, fn(&HrmsStack, NaiveDate, NaiveDateTime) -> StepResult); 6] = [
        ("Leave", demo_leave),
        ("Attendance", demo_attendance),
        ("Tour", demo_tour),
        ("Compensatory off", demo_comp_off),
        ("Reports", demo_reports),
        ("Payroll lock", demo_lock),
    ];
    for (title, step) in steps {
        println!("\n{title}");
        if let Err(err) = step(&stack, week_start, now) {
            println!("  {title} walk-through stopped: {err}");
        }
    }

    println!("\nNotifications");
    for employee in ["emp-admin", "emp-ravi", "emp-asha", "emp-john", "emp-meera"] {
        let id = EmployeeId(employee.to_string());
        println!(
            "  - {}: {} unread of {}",
            employee,
            stack.notifier.unread(&id),
            stack.notifier.inbox(&id).len()
        );
    }
    println!("  - {} email(s) queued", stack.notifier.emails().len());
    Ok(())
}

fn demo_leave(stack: &HrmsStack, week_start: NaiveDate, now: NaiveDateTime) -> StepResult {
    let asha = EmployeeId("emp-asha".to_string());
    let john = EmployeeId("emp-john".to_string());
    let ravi = EmployeeId("emp-ravi".to_string());
    let admin = EmployeeId("emp-admin".to_string());
    for employee in [&asha, &john] {
        stack.leave.initialize_balances(employee, week_start.year())?;
    }

    let tuesday = week_start + Duration::days(1);
    let casual = stack.leave.apply(
        LeaveRequest {
            employee: asha.clone(),
            leave_type: LeaveTypeId("cl".to_string()),
            start_date: tuesday,
            end_date: tuesday,
            start_day_choice: DayChoice::FullDay,
            end_day_choice: DayChoice::FullDay,
            reason: "Family function".to_string(),
        },
        now,
    )?;
    println!(
        "- {} applied {} for {} day(s) -> {}",
        casual.employee.0, casual.application_no, casual.used_leave, casual.status
    );
    let approved = stack
        .leave
        .transition(&casual.id, LeaveAction::Approve, &ravi, "Enjoy", now)?;
    println!("  Ravi approved -> {}", approved.status);

    let thursday = week_start + Duration::days(3);
    let half_day = stack.leave.apply(
        LeaveRequest {
            employee: john.clone(),
            leave_type: LeaveTypeId("sl".to_string()),
            start_date: thursday,
            end_date: thursday,
            start_day_choice: DayChoice::FirstHalf,
            end_day_choice: DayChoice::FirstHalf,
            reason: "Dentist".to_string(),
        },
        now,
    )?;
    let recommended =
        stack
            .leave
            .transition(&half_day.id, LeaveAction::Recommend, &ravi, "", now)?;
    println!(
        "- {} applied {} for {} day(s); Ravi recommended -> {}",
        half_day.employee.0, half_day.application_no, half_day.used_leave, recommended.status
    );
    let queues = queues_for(stack.store.as_ref(), &admin)?;
    println!("  Admin queue holds {} item(s)", queues.total());
    let approved = stack
        .leave
        .transition(&half_day.id, LeaveAction::Approve, &admin, "", now)?;
    println!("  Admin approved -> {}", approved.status);

    for employee in [&asha, &john] {
        let summary: Vec<String> = stack
            .leave
            .balances(employee, week_start.year())?
            .into_iter()
            .filter(|balance| balance.no_of_leaves > 0.0)
            .map(|balance| format!("{} {}", balance.leave_type.0, balance.remaining))
            .collect();
        println!("  {} balances: {}", employee.0, summary.join(", "));
    }
    Ok(())
}

fn demo_attendance(stack: &HrmsStack, week_start: NaiveDate, now: NaiveDateTime) -> StepResult {
    let day = week_start;
    let lines = [
        format!("E001 {day} 09:10:12"),
        format!("E002 {day} 09:02:40"),
        format!("E002 {day} 13:10:05"),
        format!("E002 {day} 17:40:51"),
        format!("E003 {day} 09:00:00"),
        format!("E003 {day} 15:00:30"),
        "garbled line".to_string(),
    ]
    .join("\n");
    let batch = parse_device_lines(&lines, false);
    println!(
        "- Parsed {} punches ({} rejected)",
        batch.punches.len(),
        batch.rejected
    );

    let report = stack.attendance.ingest(&batch.punches)?;
    for log in &report.logs {
        print_log(log);
    }

    let john = EmployeeId("emp-john".to_string());
    let ravi = EmployeeId("emp-ravi".to_string());
    let Some(early_exit) = report.logs.iter().find(|log| log.employee == john) else {
        return Ok(());
    };
    let submitted = stack.attendance.submit_regularization(
        &early_exit.id,
        &john,
        "Client visit in the afternoon",
        now,
    )?;
    println!(
        "- {} asked to regularize {}",
        submitted.employee.0, submitted.date
    );
    let approved = stack.attendance.act(
        &submitted.id,
        RegularizationAction::Approve,
        &ravi,
        "Confirmed with client",
        now,
    )?;
    println!(
        "  Ravi approved -> {} ({})",
        approved.status.label(),
        approved.grid_code()
    );
    Ok(())
}

fn demo_tour(stack: &HrmsStack, week_start: NaiveDate, now: NaiveDateTime) -> StepResult {
    let ravi = EmployeeId("emp-ravi".to_string());
    let admin = EmployeeId("emp-admin".to_string());
    let wednesday = week_start + Duration::days(2);
    let tour = stack.tours.apply(
        TourRequest {
            applied_by: ravi.clone(),
            from_destination: "Pune".to_string(),
            to_destination: "Mumbai".to_string(),
            start_date: wednesday,
            start_time: NaiveTime::from_hms_opt(14, 0, 0),
            end_date: wednesday + Duration::days(1),
            end_time: NaiveTime::from_hms_opt(13, 0, 0),
            approval_type: ApprovalType::Pre,
            remarks: Some("Vendor review".to_string()),
        },
        now,
    )?;
    println!(
        "- {} applied tour {} ({} hours)",
        tour.applied_by.0,
        tour.slug,
        tour.total_duration().num_hours()
    );
    let approved = stack
        .tours
        .act(&tour.id, TourAction::Approve, &admin, "", None, now)?;
    println!("  Admin approved -> {}", approved.status);
    for segment in approved.daily_segments(stack.full_day_hours) {
        println!(
            "  - {} {} ({} min)",
            segment.date, segment.short_code, segment.minutes
        );
    }
    Ok(())
}

fn demo_comp_off(stack: &HrmsStack, week_start: NaiveDate, now: NaiveDateTime) -> StepResult {
    let meera = EmployeeId("emp-meera".to_string());
    let sunday = now.date() - Duration::days(1);
    let credit = stack.comp_offs.record(
        &meera,
        sunday,
        Some(8.0),
        Some("Office move".to_string()),
        now,
    )?;
    println!(
        "- {} earned {} hours for {} (expires {})",
        credit.employee.0, credit.hours_earned, credit.worked_on, credit.expiry
    );
    println!(
        "  Available: {} hours",
        stack.comp_offs.available_balance(&meera, now.date())?
    );
    let claimed = stack.comp_offs.claim(&credit.id, &meera, "", now)?;
    println!(
        "  Claimed -> {}; available now {} hours",
        claimed.status.label(),
        stack.comp_offs.available_balance(&meera, now.date())?
    );
    Ok(())
}

fn demo_reports(stack: &HrmsStack, week_start: NaiveDate, _now: NaiveDateTime) -> StepResult {
    let week_end = week_start + Duration::days(6);
    let data = ReportData::load(stack.store.as_ref(), week_start, week_end)?;
    let grid = presence_grid(
        &data,
        &stack.calendar,
        week_start,
        week_end,
        stack.full_day_hours,
    );
    println!("- Presence {} -> {}", grid.from, grid.to);
    for row in &grid.rows {
        let cells: Vec<&str> = (0..7)
            .map(|offset| row.code_on(week_start + Duration::days(offset)).unwrap_or("-"))
            .collect();
        println!("  {} {:<12} {}", row.employee_code, row.full_name, cells.join(" "));
    }

    let summaries = working_summary(
        &data,
        &stack.calendar,
        week_start,
        week_end,
        stack.full_day_hours,
    );
    println!("- Top working hours");
    for summary in top_employees(summaries, 3) {
        println!(
            "  {} {:.1}h of {:.1}h expected (short {:.1}h)",
            summary.employee_code,
            summary.actual_hours,
            summary.expected_hours,
            summary.shortfall_hours()
        );
    }
    Ok(())
}

fn demo_lock(stack: &HrmsStack, week_start: NaiveDate, now: NaiveDateTime) -> StepResult {
    let week_end = week_start + Duration::days(6);
    stack.locks.add(LockPeriod {
        from: week_start,
        to: week_end,
        is_locked: true,
        reason: Some("Payroll closed".to_string()),
    });
    println!("- Locked {week_start} -> {week_end}");

    let friday = week_start + Duration::days(4);
    let request = LeaveRequest {
        employee: EmployeeId("emp-john".to_string()),
        leave_type: LeaveTypeId("lwp".to_string()),
        start_date: friday,
        end_date: friday,
        start_day_choice: DayChoice::FullDay,
        end_day_choice: DayChoice::FullDay,
        reason: "Personal".to_string(),
    };
    match stack.leave.apply(request.clone(), now) {
        Ok(application) => println!("  Unexpectedly accepted {}", application.application_no),
        Err(err) => println!("  Refused: {err}"),
    }

    let released = stack.locks.unlock(friday);
    println!("- Released {released} lock period(s)");
    let application = stack.leave.apply(request, now)?;
    println!(
        "  {} accepted -> {}",
        application.application_no, application.status
    );
    Ok(())
}
