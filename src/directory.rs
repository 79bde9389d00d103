//! Directory port: who manages whom. Employee CRUD itself is another
//! service's job; the engine only ever asks for the current manager.

use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::error::LeaveError;

#[async_trait]
pub trait Directory: Send + Sync {
    /// Current manager of `employee_id`, or None when the employee is
    /// unknown or has no manager on record. No caching is assumed.
    async fn manager_of(&self, employee_id: u64) -> Result<Option<u64>, LeaveError>;
}

/// Reads the reporting line from the shared `employees` table.
#[derive(Clone)]
pub struct MySqlDirectory {
    pool: MySqlPool,
}

impl MySqlDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for MySqlDirectory {
    async fn manager_of(&self, employee_id: u64) -> Result<Option<u64>, LeaveError> {
        let manager = sqlx::query_scalar::<_, Option<u64>>(
            "SELECT manager_id FROM employees WHERE id = ?",
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "manager lookup failed");
            LeaveError::Transient(e)
        })?;
        Ok(manager.flatten())
    }
}
