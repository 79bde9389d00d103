//! Leave request lifecycle & balance consistency engine.
//!
//! Guarantees that a per-employee, per-year leave balance is never debited
//! incorrectly under concurrent approvals, that overlapping leave cannot be
//! double-approved, and that the Pending -> Approved/Rejected state machine
//! holds even when managers race on the same request. Storage, directory
//! lookup and notification delivery are ports with swappable backends.

pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod logging;
pub mod model;
pub mod notifier;
pub mod service;
pub mod store;
pub mod utils;
pub mod validate;

pub use config::Config;
pub use error::{ConflictKind, LeaveError, ValidationFailure};
pub use model::leave_balance::{BalanceSummary, LeaveBalance, Remaining};
pub use model::leave_request::{LeaveCandidate, LeaveRequest, LeaveStatus, LeaveType};
pub use service::LeaveService;
