use chrono::NaiveDate;
use serde_json::json;

use crate::model::leave_request::LeaveType;

/// A single failed submission check. All checks are evaluated, so a caller
/// may receive several of these at once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("start_date cannot be after end_date")]
    InvalidDateRange,
    #[error("start_date cannot be in the past")]
    StartDateInPast,
    #[error("reason must not be empty")]
    EmptyReason,
    #[error("reason must be at most {max} characters")]
    ReasonTooLong { max: usize },
    #[error("rejection reason must not be empty")]
    EmptyRejectionReason,
    #[error("requested range overlaps approved leave from {start} to {end}")]
    OverlapsApproved { start: NaiveDate, end: NaiveDate },
    #[error("insufficient {leave_type} balance: requested {requested}, remaining {remaining}")]
    InsufficientBalance {
        leave_type: LeaveType,
        requested: u32,
        remaining: u32,
    },
}

impl ValidationFailure {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationFailure::OverlapsApproved { .. } => "OVERLAPPING_REQUEST",
            ValidationFailure::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            _ => "VALIDATION_ERROR",
        }
    }
}

/// Why a terminal transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConflictKind {
    #[error("invalid transition")]
    InvalidTransition,
    #[error("overlapping approved leave")]
    OverlappingLeave,
    #[error("insufficient balance")]
    InsufficientBalance,
}

/// Error surface of the engine. Every variant carries a stable machine code
/// for the service layer; messages never include storage internals.
#[derive(Debug, thiserror::Error)]
pub enum LeaveError {
    #[error("validation failed")]
    Validation(Vec<ValidationFailure>),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(ConflictKind),
    #[error("actor is not the employee's current manager")]
    Authorization,
    #[error("storage temporarily unavailable")]
    Transient(#[source] sqlx::Error),
}

impl LeaveError {
    pub fn code(&self) -> &'static str {
        match self {
            LeaveError::Validation(_) => "VALIDATION_ERROR",
            LeaveError::NotFound(_) => "NOT_FOUND",
            LeaveError::Conflict(ConflictKind::InvalidTransition) => "INVALID_TRANSITION",
            LeaveError::Conflict(ConflictKind::OverlappingLeave) => "OVERLAPPING_REQUEST",
            LeaveError::Conflict(ConflictKind::InsufficientBalance) => "INSUFFICIENT_BALANCE",
            LeaveError::Authorization => "FORBIDDEN",
            LeaveError::Transient(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Stable `{code, message}` payload for the HTTP layer. Validation errors
    /// additionally carry the full failure list.
    pub fn to_body(&self) -> serde_json::Value {
        match self {
            LeaveError::Validation(failures) => json!({
                "code": self.code(),
                "message": self.to_string(),
                "errors": failures
                    .iter()
                    .map(|f| json!({ "code": f.code(), "message": f.to_string() }))
                    .collect::<Vec<_>>(),
            }),
            _ => json!({ "code": self.code(), "message": self.to_string() }),
        }
    }
}
