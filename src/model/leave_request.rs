use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Leave categories. Annual and Sick draw down a per-year balance; Unpaid and
/// Other are untracked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Sick,
    Unpaid,
    Other,
}

impl LeaveType {
    pub fn tracks_balance(&self) -> bool {
        matches!(self, LeaveType::Annual | LeaveType::Sick)
    }
}

/// Request workflow status. Approved and Rejected are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// Transition table: the only legal moves are Pending -> Approved and
    /// Pending -> Rejected.
    pub fn can_become(self, next: LeaveStatus) -> bool {
        matches!(
            (self, next),
            (LeaveStatus::Pending, LeaveStatus::Approved)
                | (LeaveStatus::Pending, LeaveStatus::Rejected)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LeaveStatus::Approved | LeaveStatus::Rejected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive day span of [start_date, end_date].
    pub days_count: u32,
    pub reason: String,
    pub status: LeaveStatus,
    pub approver_id: Option<u64>,
    /// Decision timestamp, set on either terminal transition.
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A submission candidate, before validation and persistence assign it an id
/// and a day count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveCandidate {
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}
