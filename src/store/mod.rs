//! Persistence ports and backends for the leave engine.
//!
//! The engine talks to storage through `LeaveStore`/`LeaveTx`; backends are
//! swappable. `MySqlLeaveStore` is the production backend, `MemoryStore` a
//! deterministic in-process one used by the test suite.

pub mod memory;
pub mod mysql;

pub use self::memory::MemoryStore;
pub use self::mysql::MySqlLeaveStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LeaveError;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{LeaveCandidate, LeaveRequest, LeaveStatus, LeaveType};

/// Team listing row: a leave request joined with the owning employee's
/// display name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamLeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_count: u32,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
}

/// Storage port for requests and balances.
#[async_trait]
pub trait LeaveStore: Send + Sync {
    type Tx: LeaveTx;

    /// Open a transaction for the approval state machine. All multi-step
    /// mutations go through the returned handle and commit as one unit.
    async fn begin(&self) -> Result<Self::Tx, LeaveError>;

    /// Single atomic insert of a Pending row; no balance is reserved.
    async fn insert_request(
        &self,
        candidate: &LeaveCandidate,
        days_count: u32,
    ) -> Result<LeaveRequest, LeaveError>;

    async fn list_approved(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, LeaveError>;

    async fn get_balance(
        &self,
        employee_id: u64,
        year: i32,
    ) -> Result<Option<LeaveBalance>, LeaveError>;

    /// Own requests, newest first.
    async fn list_by_employee(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, LeaveError>;

    /// Requests of everyone reporting to `manager_id`, newest first.
    async fn list_by_manager(
        &self,
        manager_id: u64,
    ) -> Result<Vec<TeamLeaveRequest>, LeaveError>;
}

/// An open transaction. Reads marked `for_update` hold row-level write locks
/// until commit; dropping the handle without committing rolls everything
/// back.
#[async_trait]
pub trait LeaveTx: Send {
    async fn request_for_update(&mut self, id: u64) -> Result<Option<LeaveRequest>, LeaveError>;

    /// Transaction-consistent view of the employee's Approved rows.
    async fn list_approved(&mut self, employee_id: u64) -> Result<Vec<LeaveRequest>, LeaveError>;

    async fn balance_for_update(
        &mut self,
        employee_id: u64,
        year: i32,
    ) -> Result<Option<LeaveBalance>, LeaveError>;

    async fn update_request_status(
        &mut self,
        id: u64,
        status: LeaveStatus,
        approver_id: u64,
        decided_at: DateTime<Utc>,
        rejection_reason: Option<&str>,
    ) -> Result<(), LeaveError>;

    async fn update_balance_used(
        &mut self,
        employee_id: u64,
        year: i32,
        leave_type: LeaveType,
        new_used: u32,
    ) -> Result<(), LeaveError>;

    async fn commit(self) -> Result<(), LeaveError>;
}
