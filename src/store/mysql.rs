//! MySQL backend. Row locks are taken with `SELECT ... FOR UPDATE` inside a
//! single transaction, so a racing approve/reject blocks until the first
//! transaction ends and then sees the flipped status.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, Transaction};

use crate::error::LeaveError;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{LeaveCandidate, LeaveRequest, LeaveStatus, LeaveType};
use crate::store::{LeaveStore, LeaveTx, TeamLeaveRequest};

const REQUEST_COLUMNS: &str = "id, employee_id, leave_type, start_date, end_date, days_count, \
     reason, status, approver_id, approved_at, rejection_reason, created_at, updated_at";

fn transient(context: &'static str) -> impl FnOnce(sqlx::Error) -> LeaveError {
    move |e| {
        tracing::error!(error = %e, context, "database operation failed");
        LeaveError::Transient(e)
    }
}

#[derive(Clone)]
pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    type Tx = MySqlLeaveTx;

    async fn begin(&self) -> Result<MySqlLeaveTx, LeaveError> {
        let tx = self.pool.begin().await.map_err(transient("begin"))?;
        Ok(MySqlLeaveTx { tx })
    }

    async fn insert_request(
        &self,
        candidate: &LeaveCandidate,
        days_count: u32,
    ) -> Result<LeaveRequest, LeaveError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, leave_type, start_date, end_date, days_count, reason, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(candidate.employee_id)
        .bind(candidate.leave_type)
        .bind(candidate.start_date)
        .bind(candidate.end_date)
        .bind(days_count)
        .bind(candidate.reason.trim())
        .bind(LeaveStatus::Pending)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(transient("insert leave request"))?;

        Ok(LeaveRequest {
            id: result.last_insert_id(),
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
        })
    }

    async fn list_approved(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, LeaveError> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE employee_id = ? AND status = 'approved'"
        );
        sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await
            .map_err(transient("list approved requests"))
    }

    async fn get_balance(
        &self,
        employee_id: u64,
        year: i32,
    ) -> Result<Option<LeaveBalance>, LeaveError> {
        sqlx::query_as::<_, LeaveBalance>(
            "SELECT employee_id, `year`, annual_total, annual_used, sick_total, sick_used, updated_at \
             FROM leave_balances WHERE employee_id = ? AND `year` = ?",
        )
        .bind(employee_id)
        .bind(year)
        .fetch_optional(&self.pool)
        .await
        .map_err(transient("get balance"))
    }

    async fn list_by_employee(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, LeaveError> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE employee_id = ? \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await
            .map_err(transient("list requests by employee"))
    }

    async fn list_by_manager(
        &self,
        manager_id: u64,
    ) -> Result<Vec<TeamLeaveRequest>, LeaveError> {
        sqlx::query_as::<_, TeamLeaveRequest>(
            r#"
            SELECT lr.id, lr.employee_id, e.first_name, e.last_name,
                   lr.leave_type, lr.start_date, lr.end_date, lr.days_count,
                   lr.status, lr.created_at
            FROM leave_requests lr
            JOIN employees e ON e.id = lr.employee_id
            WHERE e.manager_id = ?
            ORDER BY lr.created_at DESC, lr.id DESC
            "#,
        )
        .bind(manager_id)
        .fetch_all(&self.pool)
        .await
        .map_err(transient("list requests by manager"))
    }
}

pub struct MySqlLeaveTx {
    tx: Transaction<'static, MySql>,
}

#[async_trait]
impl LeaveTx for MySqlLeaveTx {
    async fn request_for_update(&mut self, id: u64) -> Result<Option<LeaveRequest>, LeaveError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE id = ? FOR UPDATE");
        sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(transient("lock leave request"))
    }

    async fn list_approved(&mut self, employee_id: u64) -> Result<Vec<LeaveRequest>, LeaveError> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE employee_id = ? AND status = 'approved'"
        );
        sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(employee_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(transient("list approved requests in tx"))
    }

    async fn balance_for_update(
        &mut self,
        employee_id: u64,
        year: i32,
    ) -> Result<Option<LeaveBalance>, LeaveError> {
        sqlx::query_as::<_, LeaveBalance>(
            "SELECT employee_id, `year`, annual_total, annual_used, sick_total, sick_used, updated_at \
             FROM leave_balances WHERE employee_id = ? AND `year` = ? FOR UPDATE",
        )
        .bind(employee_id)
        .bind(year)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(transient("lock balance"))
    }

    async fn update_request_status(
        &mut self,
        id: u64,
        status: LeaveStatus,
        approver_id: u64,
        decided_at: DateTime<Utc>,
        rejection_reason: Option<&str>,
    ) -> Result<(), LeaveError> {
        sqlx::query(
            "UPDATE leave_requests \
             SET status = ?, approver_id = ?, approved_at = ?, rejection_reason = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(status)
        .bind(approver_id)
        .bind(decided_at)
        .bind(rejection_reason)
        .bind(decided_at)
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .map_err(transient("update request status"))?;
        Ok(())
    }

    async fn update_balance_used(
        &mut self,
        employee_id: u64,
        year: i32,
        leave_type: LeaveType,
        new_used: u32,
    ) -> Result<(), LeaveError> {
        let column = match leave_type {
            LeaveType::Annual => "annual_used",
            LeaveType::Sick => "sick_used",
            // untracked types carry no counters
            LeaveType::Unpaid | LeaveType::Other => return Ok(()),
        };
        let sql = format!(
            "UPDATE leave_balances SET {column} = ?, updated_at = ? WHERE employee_id = ? AND `year` = ?"
        );
        sqlx::query(&sql)
            .bind(new_used)
            .bind(Utc::now())
            .bind(employee_id)
            .bind(year)
            .execute(&mut *self.tx)
            .await
            .map_err(transient("update balance used"))?;
        Ok(())
    }

    async fn commit(self) -> Result<(), LeaveError> {
        self.tx.commit().await.map_err(transient("commit"))
    }
}
