use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::leave_request::LeaveType;

/// Per-employee, per-year counters of allotted vs. used leave days.
///
/// Mutated exclusively by the approval state machine, inside the same
/// transaction that flips the request status. Invariant after every committed
/// mutation: used <= total for each tracked pair.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveBalance {
    pub employee_id: u64,
    pub year: i32,
    pub annual_total: u32,
    pub annual_used: u32,
    pub sick_total: u32,
    pub sick_used: u32,
    pub updated_at: DateTime<Utc>,
}

/// What is left of a balance for a given leave type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Days(u32),
    /// Unpaid/Other leave is not tracked against any counter.
    Unbounded,
}

impl Remaining {
    pub fn covers(&self, days: u32) -> bool {
        match self {
            Remaining::Days(remaining) => *remaining >= days,
            Remaining::Unbounded => true,
        }
    }
}

impl LeaveBalance {
    /// (total, used) for a tracked leave type; None for Unpaid/Other.
    pub fn quota(&self, leave_type: LeaveType) -> Option<(u32, u32)> {
        match leave_type {
            LeaveType::Annual => Some((self.annual_total, self.annual_used)),
            LeaveType::Sick => Some((self.sick_total, self.sick_used)),
            LeaveType::Unpaid | LeaveType::Other => None,
        }
    }

    /// Pure reader: never mutates, never touches storage.
    pub fn remaining(&self, leave_type: LeaveType) -> Remaining {
        match self.quota(leave_type) {
            Some((total, used)) => Remaining::Days(total.saturating_sub(used)),
            None => Remaining::Unbounded,
        }
    }
}

/// Read-only projection returned by the balance query surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub employee_id: u64,
    pub year: i32,
    pub annual_total: u32,
    pub annual_used: u32,
    pub annual_remaining: u32,
    pub sick_total: u32,
    pub sick_used: u32,
    pub sick_remaining: u32,
}

impl From<&LeaveBalance> for BalanceSummary {
    fn from(balance: &LeaveBalance) -> Self {
        Self {
            employee_id: balance.employee_id,
            year: balance.year,
            annual_total: balance.annual_total,
            annual_used: balance.annual_used,
            annual_remaining: balance.annual_total.saturating_sub(balance.annual_used),
            sick_total: balance.sick_total,
            sick_used: balance.sick_used,
            sick_remaining: balance.sick_total.saturating_sub(balance.sick_used),
        }
    }
}
