//! Shared fixtures for the scenario and concurrency suites: an in-memory
//! store pre-seeded with a small reporting line, wired into the service.

// each suite uses a different subset of the fixtures
#![allow(dead_code)]

use chrono::{Datelike, Duration, NaiveDate, Utc};
use hrm_leave::model::employee::EmployeeRef;
use hrm_leave::notifier::RecordingNotifier;
use hrm_leave::store::MemoryStore;
use hrm_leave::{LeaveBalance, LeaveCandidate, LeaveService, LeaveType};

pub const EMPLOYEE: u64 = 1000;
pub const COWORKER: u64 = 1001;
pub const MANAGER: u64 = 2000;
pub const OTHER_MANAGER: u64 = 2001;

pub struct Harness {
    pub service: LeaveService<MemoryStore, MemoryStore, RecordingNotifier>,
    pub store: MemoryStore,
    pub notifier: RecordingNotifier,
}

pub async fn harness() -> Harness {
    hrm_leave::logging::init_for_tests();

    let store = MemoryStore::new();
    store
        .add_employee(EmployeeRef {
            id: MANAGER,
            first_name: "Mora".into(),
            last_name: Some("Khan".into()),
            manager_id: None,
        })
        .await;
    store
        .add_employee(EmployeeRef {
            id: OTHER_MANAGER,
            first_name: "Selim".into(),
            last_name: None,
            manager_id: None,
        })
        .await;
    store
        .add_employee(EmployeeRef {
            id: EMPLOYEE,
            first_name: "Arif".into(),
            last_name: Some("Hossain".into()),
            manager_id: Some(MANAGER),
        })
        .await;
    store
        .add_employee(EmployeeRef {
            id: COWORKER,
            first_name: "Nadia".into(),
            last_name: Some("Rahman".into()),
            manager_id: Some(MANAGER),
        })
        .await;

    let notifier = RecordingNotifier::default();
    let service = LeaveService::new(store.clone(), store.clone(), notifier.clone());
    Harness {
        service,
        store,
        notifier,
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Dates in tests are relative to the submission day so the
/// "start not in the past" check never trips.
pub fn in_days(n: i64) -> NaiveDate {
    today() + Duration::days(n)
}

pub fn this_year() -> i32 {
    today().year()
}

pub async fn seed_balance(
    store: &MemoryStore,
    employee_id: u64,
    annual_total: u32,
    annual_used: u32,
    sick_total: u32,
    sick_used: u32,
) {
    store
        .put_balance(LeaveBalance {
            employee_id,
            year: this_year(),
            annual_total,
            annual_used,
            sick_total,
            sick_used,
            updated_at: Utc::now(),
        })
        .await;
}

pub fn candidate(
    employee_id: u64,
    leave_type: LeaveType,
    start: NaiveDate,
    end: NaiveDate,
) -> LeaveCandidate {
    LeaveCandidate {
        employee_id,
        leave_type,
        start_date: start,
        end_date: end,
        reason: "family travel".into(),
    }
}
