use serde::{Deserialize, Serialize};

/// Slim employee view the engine reads: identity, display name and the
/// reporting line. Full employee CRUD lives in the directory service.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmployeeRef {
    pub id: u64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub manager_id: Option<u64>,
}
