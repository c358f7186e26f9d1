use chrono::{Datelike, NaiveDate, NaiveDateTime};
use hrms::config::PolicySettings;
use hrms::workflows::attendance::AttendanceClassifier;
use hrms::workflows::calendar::HolidayCalendar;
use hrms::workflows::comp_off::CompOffService;
use hrms::workflows::leave::{LeaveApplicationService, LeavePolicy, LeavePolicyConfig};
use hrms::workflows::lock::LockRegistry;
use hrms::workflows::memory::{demo_calendar, demo_night_shift, InMemoryHrStore, InMemoryNotifier};
use hrms::workflows::report::ReportState;
use hrms::workflows::{AttendanceService, TourService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type Store = InMemoryHrStore;
pub(crate) type Notifier = InMemoryNotifier;

/// Seeded store plus every workflow service wired from the policy settings.
pub(crate) struct HrmsStack {
    pub(crate) store: Arc<Store>,
    pub(crate) notifier: Arc<Notifier>,
    pub(crate) locks: Arc<LockRegistry>,
    pub(crate) calendar: Arc<HolidayCalendar>,
    pub(crate) full_day_hours: u32,
    pub(crate) leave: Arc<LeaveApplicationService<Store, Notifier>>,
    pub(crate) attendance: Arc<AttendanceService<Store, Notifier>>,
    pub(crate) tours: Arc<TourService<Store, Notifier>>,
    pub(crate) comp_offs: Arc<CompOffService<Store, Notifier>>,
}

impl HrmsStack {
    pub(crate) fn seeded(settings: &PolicySettings, year: i32) -> Self {
        let store = Arc::new(InMemoryHrStore::seeded());
        store.add_shift(demo_night_shift());
        let notifier = Arc::new(InMemoryNotifier::default());
        let locks = Arc::new(LockRegistry::default());
        let calendar = Arc::new(demo_calendar(year));

        let leave = Arc::new(LeaveApplicationService::new(
            store.clone(),
            notifier.clone(),
            LeavePolicy::new(LeavePolicyConfig::from(settings)),
            calendar.clone(),
            locks.clone(),
        ));
        let attendance = Arc::new(AttendanceService::new(
            store.clone(),
            notifier.clone(),
            AttendanceClassifier::new(settings.full_day_hours),
            locks.clone(),
        ));
        let tours = Arc::new(TourService::new(
            store.clone(),
            notifier.clone(),
            locks.clone(),
        ));
        let comp_offs = Arc::new(CompOffService::new(
            store.clone(),
            notifier.clone(),
            i64::from(settings.comp_off_expiry_days),
        ));

        Self {
            store,
            notifier,
            locks,
            calendar,
            full_day_hours: settings.full_day_hours,
            leave,
            attendance,
            tours,
            comp_offs,
        }
    }

    /// Stack seeded for the calendar year of `today`.
    pub(crate) fn for_today(settings: &PolicySettings, today: NaiveDate) -> Self {
        Self::seeded(settings, today.year())
    }

    pub(crate) fn report_state(&self) -> Arc<ReportState<Store>> {
        Arc::new(ReportState {
            store: self.store.clone(),
            calendar: self.calendar.clone(),
            full_day_hours: self.full_day_hours,
        })
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Accepts `YYYY-MM-DD HH:MM[:SS]` with either a space or `T` separator.
pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    let normalized = raw.trim().replacen('T', " ", 1);
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M"))
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD HH:MM ({err})"))
}
