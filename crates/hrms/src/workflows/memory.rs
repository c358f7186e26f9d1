//! Mutex-guarded in-memory store implementing every workflow repository, plus seed data.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveTime, Weekday};

use super::attendance::{
    AttendanceLog, AttendanceLogAction, AttendanceLogId, AttendanceRepository, ShiftTiming,
};
use super::calendar::{Holiday, HolidayCalendar};
use super::comp_off::{CompOffId, CompOffLog, CompOffRepository, CompensatoryOff};
use super::directory::{Employee, EmployeeDirectory, EmployeeId, ShiftId};
use super::leave::{
    BalanceKey, LeaveApplication, LeaveApplicationId, LeaveBalance, LeaveLogEntry,
    LeaveRepository, LeaveType, LeaveTypeId,
};
use super::notifications::{EmailMessage, Notification, NotificationError, NotificationPublisher};
use super::repository::RepositoryError;
use super::tour::{Tour, TourId, TourRepository, TourStatusLog};

#[derive(Debug, Default)]
struct HrState {
    employees: BTreeMap<EmployeeId, Employee>,
    shifts: BTreeMap<ShiftId, ShiftTiming>,
    leave_types: BTreeMap<LeaveTypeId, LeaveType>,
    applications: BTreeMap<LeaveApplicationId, LeaveApplication>,
    leave_logs: Vec<LeaveLogEntry>,
    balances: BTreeMap<BalanceKey, LeaveBalance>,
    attendance: BTreeMap<AttendanceLogId, AttendanceLog>,
    attendance_actions: Vec<AttendanceLogAction>,
    tours: BTreeMap<TourId, Tour>,
    tour_logs: Vec<TourStatusLog>,
    comp_offs: BTreeMap<CompOffId, CompensatoryOff>,
    comp_off_logs: Vec<CompOffLog>,
}

/// Store used by the API service, the demo walk-through and the tests.
#[derive(Debug, Default)]
pub struct InMemoryHrStore {
    state: Mutex<HrState>,
}

impl InMemoryHrStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees(employees: Vec<Employee>) -> Self {
        let store = Self::default();
        for employee in employees {
            store.add_employee(employee);
        }
        store
    }

    /// Employees, leave types and the general shift from the demo seed.
    pub fn seeded() -> Self {
        let store = Self::with_employees(demo_employees());
        for leave_type in demo_leave_types() {
            store.add_leave_type(leave_type);
        }
        store.add_shift(ShiftTiming::general());
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, HrState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }

    pub fn add_employee(&self, employee: Employee) {
        if let Ok(mut state) = self.lock() {
            state.employees.insert(employee.id.clone(), employee);
        }
    }

    pub fn add_leave_type(&self, leave_type: LeaveType) {
        if let Ok(mut state) = self.lock() {
            state.leave_types.insert(leave_type.id.clone(), leave_type);
        }
    }

    pub fn add_shift(&self, shift: ShiftTiming) {
        if let Ok(mut state) = self.lock() {
            state.shifts.insert(shift.id.clone(), shift);
        }
    }
}

impl EmployeeDirectory for InMemoryHrStore {
    fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        Ok(self.lock()?.employees.get(id).cloned())
    }

    fn reports_of(&self, manager: &EmployeeId) -> Result<Vec<Employee>, RepositoryError> {
        Ok(self
            .lock()?
            .employees
            .values()
            .filter(|employee| employee.reports_to.as_ref() == Some(manager))
            .cloned()
            .collect())
    }

    fn by_code(&self, employee_code: &str) -> Result<Option<Employee>, RepositoryError> {
        Ok(self
            .lock()?
            .employees
            .values()
            .find(|employee| employee.employee_code == employee_code)
            .cloned())
    }

    fn all(&self) -> Result<Vec<Employee>, RepositoryError> {
        Ok(self.lock()?.employees.values().cloned().collect())
    }
}

impl LeaveRepository for InMemoryHrStore {
    fn insert(&self, application: LeaveApplication) -> Result<LeaveApplication, RepositoryError> {
        let mut state = self.lock()?;
        if state.applications.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        state
            .applications
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: LeaveApplication) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if !state.applications.contains_key(&application.id) {
            return Err(RepositoryError::NotFound);
        }
        state.applications.insert(application.id.clone(), application);
        Ok(())
    }

    fn fetch(&self, id: &LeaveApplicationId) -> Result<Option<LeaveApplication>, RepositoryError> {
        Ok(self.lock()?.applications.get(id).cloned())
    }

    fn for_employee(&self, employee: &EmployeeId) -> Result<Vec<LeaveApplication>, RepositoryError> {
        Ok(self
            .lock()?
            .applications
            .values()
            .filter(|application| &application.employee == employee)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<LeaveApplication>, RepositoryError> {
        Ok(self.lock()?.applications.values().cloned().collect())
    }

    fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .lock()?
            .applications
            .values()
            .any(|application| application.slug == slug))
    }

    fn append_log(&self, entry: LeaveLogEntry) -> Result<(), RepositoryError> {
        self.lock()?.leave_logs.push(entry);
        Ok(())
    }

    fn logs(&self, id: &LeaveApplicationId) -> Result<Vec<LeaveLogEntry>, RepositoryError> {
        Ok(self
            .lock()?
            .leave_logs
            .iter()
            .filter(|entry| &entry.application == id)
            .cloned()
            .collect())
    }

    fn leave_type(&self, id: &LeaveTypeId) -> Result<Option<LeaveType>, RepositoryError> {
        Ok(self.lock()?.leave_types.get(id).cloned())
    }

    fn leave_types(&self) -> Result<Vec<LeaveType>, RepositoryError> {
        Ok(self.lock()?.leave_types.values().cloned().collect())
    }

    fn balance(&self, key: &BalanceKey) -> Result<Option<LeaveBalance>, RepositoryError> {
        Ok(self.lock()?.balances.get(key).cloned())
    }

    fn balances(&self) -> Result<Vec<LeaveBalance>, RepositoryError> {
        Ok(self.lock()?.balances.values().cloned().collect())
    }

    fn upsert_balance(&self, balance: LeaveBalance) -> Result<(), RepositoryError> {
        self.lock()?.balances.insert(balance.key(), balance);
        Ok(())
    }
}

impl AttendanceRepository for InMemoryHrStore {
    fn upsert_log(&self, log: AttendanceLog) -> Result<AttendanceLog, RepositoryError> {
        self.lock()?.attendance.insert(log.id.clone(), log.clone());
        Ok(log)
    }

    fn fetch_log(&self, id: &AttendanceLogId) -> Result<Option<AttendanceLog>, RepositoryError> {
        Ok(self.lock()?.attendance.get(id).cloned())
    }

    fn log_on(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceLog>, RepositoryError> {
        Ok(self
            .lock()?
            .attendance
            .values()
            .find(|log| &log.employee == employee && log.date == date)
            .cloned())
    }

    fn logs_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceLog>, RepositoryError> {
        Ok(self
            .lock()?
            .attendance
            .values()
            .filter(|log| log.date >= from && log.date <= to)
            .cloned()
            .collect())
    }

    fn submitted_logs(&self) -> Result<Vec<AttendanceLog>, RepositoryError> {
        Ok(self
            .lock()?
            .attendance
            .values()
            .filter(|log| log.is_submitted)
            .cloned()
            .collect())
    }

    fn append_action(&self, action: AttendanceLogAction) -> Result<(), RepositoryError> {
        self.lock()?.attendance_actions.push(action);
        Ok(())
    }

    fn actions(&self, id: &AttendanceLogId) -> Result<Vec<AttendanceLogAction>, RepositoryError> {
        Ok(self
            .lock()?
            .attendance_actions
            .iter()
            .filter(|action| &action.log == id)
            .cloned()
            .collect())
    }

    fn shift(&self, id: &ShiftId) -> Result<Option<ShiftTiming>, RepositoryError> {
        Ok(self.lock()?.shifts.get(id).cloned())
    }
}

impl TourRepository for InMemoryHrStore {
    fn insert_tour(&self, tour: Tour) -> Result<Tour, RepositoryError> {
        let mut state = self.lock()?;
        if state.tours.contains_key(&tour.id) {
            return Err(RepositoryError::Conflict);
        }
        state.tours.insert(tour.id.clone(), tour.clone());
        Ok(tour)
    }

    fn update_tour(&self, tour: Tour) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if !state.tours.contains_key(&tour.id) {
            return Err(RepositoryError::NotFound);
        }
        state.tours.insert(tour.id.clone(), tour);
        Ok(())
    }

    fn fetch_tour(&self, id: &TourId) -> Result<Option<Tour>, RepositoryError> {
        Ok(self.lock()?.tours.get(id).cloned())
    }

    fn tours_for(&self, employee: &EmployeeId) -> Result<Vec<Tour>, RepositoryError> {
        Ok(self
            .lock()?
            .tours
            .values()
            .filter(|tour| &tour.applied_by == employee)
            .cloned()
            .collect())
    }

    fn all_tours(&self) -> Result<Vec<Tour>, RepositoryError> {
        Ok(self.lock()?.tours.values().cloned().collect())
    }

    fn tours_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Tour>, RepositoryError> {
        Ok(self
            .lock()?
            .tours
            .values()
            .filter(|tour| tour.start_date <= to && tour.effective_end().date() >= from)
            .cloned()
            .collect())
    }

    fn tour_slug_exists(&self, slug: &str) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.tours.values().any(|tour| tour.slug == slug))
    }

    fn append_tour_log(&self, entry: TourStatusLog) -> Result<(), RepositoryError> {
        self.lock()?.tour_logs.push(entry);
        Ok(())
    }

    fn tour_logs(&self, id: &TourId) -> Result<Vec<TourStatusLog>, RepositoryError> {
        Ok(self
            .lock()?
            .tour_logs
            .iter()
            .filter(|entry| &entry.tour == id)
            .cloned()
            .collect())
    }
}

impl CompOffRepository for InMemoryHrStore {
    fn insert_comp_off(&self, entry: CompensatoryOff) -> Result<CompensatoryOff, RepositoryError> {
        let mut state = self.lock()?;
        if state.comp_offs.contains_key(&entry.id) {
            return Err(RepositoryError::Conflict);
        }
        state.comp_offs.insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    fn update_comp_off(&self, entry: CompensatoryOff) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if !state.comp_offs.contains_key(&entry.id) {
            return Err(RepositoryError::NotFound);
        }
        state.comp_offs.insert(entry.id.clone(), entry);
        Ok(())
    }

    fn fetch_comp_off(&self, id: &CompOffId) -> Result<Option<CompensatoryOff>, RepositoryError> {
        Ok(self.lock()?.comp_offs.get(id).cloned())
    }

    fn comp_offs_for(
        &self,
        employee: &EmployeeId,
    ) -> Result<Vec<CompensatoryOff>, RepositoryError> {
        Ok(self
            .lock()?
            .comp_offs
            .values()
            .filter(|entry| &entry.employee == employee)
            .cloned()
            .collect())
    }

    fn all_comp_offs(&self) -> Result<Vec<CompensatoryOff>, RepositoryError> {
        Ok(self.lock()?.comp_offs.values().cloned().collect())
    }

    fn append_comp_off_log(&self, entry: CompOffLog) -> Result<(), RepositoryError> {
        self.lock()?.comp_off_logs.push(entry);
        Ok(())
    }

    fn comp_off_logs(&self, id: &CompOffId) -> Result<Vec<CompOffLog>, RepositoryError> {
        Ok(self
            .lock()?
            .comp_off_logs
            .iter()
            .filter(|entry| &entry.comp_off == id)
            .cloned()
            .collect())
    }
}

/// Notification sink that keeps every in-app notice and email in memory.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    notifications: Mutex<Vec<Notification>>,
    emails: Mutex<Vec<EmailMessage>>,
}

impl InMemoryNotifier {
    pub fn inbox(&self, receiver: &EmployeeId) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|guard| {
                guard
                    .iter()
                    .filter(|notification| &notification.receiver == receiver)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn unread(&self, receiver: &EmployeeId) -> usize {
        self.inbox(receiver)
            .iter()
            .filter(|notification| !notification.is_read)
            .count()
    }

    /// Mark one notification read; returns whether it was found.
    pub fn mark_read(&self, id: &str) -> bool {
        let Ok(mut guard) = self.notifications.lock() else {
            return false;
        };
        match guard.iter_mut().find(|notification| notification.id == id) {
            Some(notification) => {
                notification.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn emails(&self) -> Vec<EmailMessage> {
        self.emails
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NotificationPublisher for InMemoryNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        self.notifications
            .lock()
            .map_err(|_| NotificationError::Transport("inbox mutex poisoned".to_string()))?
            .push(notification);
        Ok(())
    }

    fn email(&self, message: EmailMessage) -> Result<(), NotificationError> {
        self.emails
            .lock()
            .map_err(|_| NotificationError::Transport("outbox mutex poisoned".to_string()))?
            .push(message);
        Ok(())
    }
}

fn employee(
    id: &str,
    code: &str,
    full_name: &str,
    reports_to: Option<&str>,
    department: &str,
) -> Employee {
    let username = full_name
        .split_whitespace()
        .next()
        .unwrap_or(id)
        .to_ascii_lowercase();
    Employee {
        id: EmployeeId(id.to_string()),
        email: format!("{username}@example.com"),
        official_email: Some(format!("{username}@hrms.example.com")),
        username,
        full_name: full_name.to_string(),
        employee_code: code.to_string(),
        reports_to: reports_to.map(|manager| EmployeeId(manager.to_string())),
        department: Some(department.to_string()),
        is_superuser: false,
        shift: Some(ShiftId("general".to_string())),
    }
}

/// Small organisation: a superuser, an engineering manager with two reports and an admin officer.
pub fn demo_employees() -> Vec<Employee> {
    let mut admin = employee("emp-admin", "E000", "Priya Menon", None, "HR");
    admin.is_superuser = true;
    vec![
        admin,
        employee("emp-ravi", "E001", "Ravi Kumar", Some("emp-admin"), "Engineering"),
        employee("emp-asha", "E002", "Asha Nair", Some("emp-ravi"), "Engineering"),
        employee("emp-john", "E003", "John Dsouza", Some("emp-ravi"), "Engineering"),
        employee("emp-meera", "E004", "Meera Shah", Some("emp-admin"), "Admin"),
    ]
}

/// Casual, sick, earned, unpaid and comp-off leave with typical limits.
pub fn demo_leave_types() -> Vec<LeaveType> {
    let mut casual = LeaveType::new("cl", "Casual Leave", "CL");
    casual.half_day_short_code = Some("HCL".to_string());
    casual.default_allocation = Some(12.0);
    casual.min_notice_days = Some(1);
    casual.max_days_limit = Some(3.0);
    casual.restricted_after = vec![LeaveTypeId("el".to_string())];
    casual.color_hex = "#3498db".to_string();

    let mut sick = LeaveType::new("sl", "Sick Leave", "SL");
    sick.half_day_short_code = Some("HSL".to_string());
    sick.default_allocation = Some(7.0);
    sick.color_hex = "#e67e22".to_string();

    let mut earned = LeaveType::new("el", "Earned Leave", "EL");
    earned.default_allocation = Some(18.0);
    earned.min_days_limit = Some(3.0);
    earned.allowed_days_per_year = Some(3);
    earned.restricted_after = vec![LeaveTypeId("cl".to_string())];
    earned.color_hex = "#9b59b6".to_string();

    let mut unpaid = LeaveType::new("lwp", "Leave Without Pay", "LWP");
    unpaid.color_hex = "#7f8c8d".to_string();

    let mut comp_off = LeaveType::new("co", "Compensatory Off", "CO");
    comp_off.default_allocation = Some(0.0);
    comp_off.color_hex = "#16a085".to_string();

    vec![casual, sick, earned, unpaid, comp_off]
}

/// Sunday weekly off plus the national holidays of `year`.
pub fn demo_calendar(year: i32) -> HolidayCalendar {
    let mut calendar = HolidayCalendar::with_weekly_offs(&[Weekday::Sun]);
    let holidays = [
        ("Republic Day", "RD", 1, 26),
        ("Independence Day", "ID", 8, 15),
        ("Gandhi Jayanti", "GJ", 10, 2),
    ];
    for (title, code, month, day) in holidays {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            // Single-day holidays cannot be inverted.
            let _ = calendar.add_holiday(Holiday::single(title, code, date));
        }
    }
    calendar
}

/// Night shift used to exercise shifts other than the general one.
pub fn demo_night_shift() -> ShiftTiming {
    ShiftTiming {
        id: ShiftId("night".to_string()),
        name: "Night Shift".to_string(),
        start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap_or(NaiveTime::MIN),
        end_time: NaiveTime::from_hms_opt(22, 30, 0).unwrap_or(NaiveTime::MIN),
        grace_minutes: 10,
        grace_start: None,
        grace_end: None,
        break_start: None,
        break_end: None,
    }
}
