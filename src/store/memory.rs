//! In-process backend. A transaction holds the state mutex for its whole
//! lifetime and stages its writes, applying them on commit; dropping an
//! uncommitted transaction discards them. Writers therefore serialize exactly
//! the way the SQL backend's row locks make them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::directory::Directory;
use crate::error::LeaveError;
use crate::model::employee::EmployeeRef;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{LeaveCandidate, LeaveRequest, LeaveStatus, LeaveType};
use crate::store::{LeaveStore, LeaveTx, TeamLeaveRequest};

#[derive(Default)]
struct MemState {
    next_id: u64,
    requests: HashMap<u64, LeaveRequest>,
    balances: HashMap<(u64, i32), LeaveBalance>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemState>>,
    // Directory data sits behind its own lock: the manager lookup is a read
    // against another system and must not contend with an open transaction.
    employees: Arc<Mutex<HashMap<u64, EmployeeRef>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_employee(&self, employee: EmployeeRef) {
        self.employees.lock().await.insert(employee.id, employee);
    }

    pub async fn put_balance(&self, balance: LeaveBalance) {
        self.state
            .lock()
            .await
            .balances
            .insert((balance.employee_id, balance.year), balance);
    }

    /// Direct row lookup for test assertions.
    pub async fn request(&self, id: u64) -> Option<LeaveRequest> {
        self.state.lock().await.requests.get(&id).cloned()
    }
}

fn newest_first(a: &LeaveRequest, b: &LeaveRequest) -> std::cmp::Ordering {
    (b.created_at, b.id).cmp(&(a.created_at, a.id))
}

#[async_trait]
impl LeaveStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, LeaveError> {
        let guard = self.state.clone().lock_owned().await;
        Ok(MemoryTx {
            guard,
            staged: Vec::new(),
        })
    }

    async fn insert_request(
        &self,
        candidate: &LeaveCandidate,
        days_count: u32,
    ) -> Result<LeaveRequest, LeaveError> {
        let now = Utc::now();
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let request = LeaveRequest {
            id: state.next_id,
            employee_id: candidate.employee_id,
            leave_type: candidate.leave_type,
            start_date: candidate.start_date,
            end_date: candidate.end_date,
            days_count,
            reason: candidate.reason.trim().to_string(),
            status: LeaveStatus::Pending,
            approver_id: None,
            approved_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        state.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn list_approved(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, LeaveError> {
        let state = self.state.lock().await;
        Ok(state
            .requests
            .values()
            .filter(|r| r.employee_id == employee_id && r.status == LeaveStatus::Approved)
            .cloned()
            .collect())
    }

    async fn get_balance(
        &self,
        employee_id: u64,
        year: i32,
    ) -> Result<Option<LeaveBalance>, LeaveError> {
        let state = self.state.lock().await;
        Ok(state.balances.get(&(employee_id, year)).cloned())
    }

    async fn list_by_employee(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, LeaveError> {
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .requests
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        rows.sort_by(newest_first);
        Ok(rows)
    }

    async fn list_by_manager(
        &self,
        manager_id: u64,
    ) -> Result<Vec<TeamLeaveRequest>, LeaveError> {
        let team: HashMap<u64, EmployeeRef> = self
            .employees
            .lock()
            .await
            .values()
            .filter(|e| e.manager_id == Some(manager_id))
            .map(|e| (e.id, e.clone()))
            .collect();

        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .requests
            .values()
            .filter(|r| team.contains_key(&r.employee_id))
            .cloned()
            .collect();
        rows.sort_by(newest_first);

        Ok(rows
            .into_iter()
            .map(|r| {
                let employee = &team[&r.employee_id];
                TeamLeaveRequest {
                    id: r.id,
                    employee_id: r.employee_id,
                    first_name: employee.first_name.clone(),
                    last_name: employee.last_name.clone(),
                    leave_type: r.leave_type,
                    start_date: r.start_date,
                    end_date: r.end_date,
                    days_count: r.days_count,
                    status: r.status,
                    created_at: r.created_at,
                }
            })
            .collect())
    }
}

#[async_trait]
impl Directory for MemoryStore {
    async fn manager_of(&self, employee_id: u64) -> Result<Option<u64>, LeaveError> {
        let employees = self.employees.lock().await;
        Ok(employees.get(&employee_id).and_then(|e| e.manager_id))
    }
}

enum StagedWrite {
    RequestStatus {
        id: u64,
        status: LeaveStatus,
        approver_id: u64,
        decided_at: DateTime<Utc>,
        rejection_reason: Option<String>,
    },
    BalanceUsed {
        employee_id: u64,
        year: i32,
        leave_type: LeaveType,
        new_used: u32,
    },
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemState>,
    staged: Vec<StagedWrite>,
}

#[async_trait]
impl LeaveTx for MemoryTx {
    async fn request_for_update(&mut self, id: u64) -> Result<Option<LeaveRequest>, LeaveError> {
        Ok(self.guard.requests.get(&id).cloned())
    }

    async fn list_approved(&mut self, employee_id: u64) -> Result<Vec<LeaveRequest>, LeaveError> {
        Ok(self
            .guard
            .requests
            .values()
            .filter(|r| r.employee_id == employee_id && r.status == LeaveStatus::Approved)
            .cloned()
            .collect())
    }

    async fn balance_for_update(
        &mut self,
        employee_id: u64,
        year: i32,
    ) -> Result<Option<LeaveBalance>, LeaveError> {
        Ok(self.guard.balances.get(&(employee_id, year)).cloned())
    }

    async fn update_request_status(
        &mut self,
        id: u64,
        status: LeaveStatus,
        approver_id: u64,
        decided_at: DateTime<Utc>,
        rejection_reason: Option<&str>,
    ) -> Result<(), LeaveError> {
        self.staged.push(StagedWrite::RequestStatus {
            id,
            status,
            approver_id,
            decided_at,
            rejection_reason: rejection_reason.map(str::to_string),
        });
        Ok(())
    }

    async fn update_balance_used(
        &mut self,
        employee_id: u64,
        year: i32,
        leave_type: LeaveType,
        new_used: u32,
    ) -> Result<(), LeaveError> {
        self.staged.push(StagedWrite::BalanceUsed {
            employee_id,
            year,
            leave_type,
            new_used,
        });
        Ok(())
    }

    async fn commit(mut self) -> Result<(), LeaveError> {
        let staged = std::mem::take(&mut self.staged);
        for write in staged {
            match write {
                StagedWrite::RequestStatus {
                    id,
                    status,
                    approver_id,
                    decided_at,
                    rejection_reason,
                } => {
                    if let Some(request) = self.guard.requests.get_mut(&id) {
                        request.status = status;
                        request.approver_id = Some(approver_id);
                        request.approved_at = Some(decided_at);
                        request.rejection_reason = rejection_reason;
                        request.updated_at = decided_at;
                    }
                }
                StagedWrite::BalanceUsed {
                    employee_id,
                    year,
                    leave_type,
                    new_used,
                } => {
                    if let Some(balance) = self.guard.balances.get_mut(&(employee_id, year)) {
                        match leave_type {
                            LeaveType::Annual => balance.annual_used = new_used,
                            LeaveType::Sick => balance.sick_used = new_used,
                            LeaveType::Unpaid | LeaveType::Other => {}
                        }
                        balance.updated_at = Utc::now();
                    }
                }
            }
        }
        Ok(())
    }
}
