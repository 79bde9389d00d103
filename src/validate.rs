//! Submission validation: every check runs, failures accumulate, and the
//! caller sees the full set at once.

use chrono::NaiveDate;

use crate::error::ValidationFailure;
use crate::model::leave_balance::{LeaveBalance, Remaining};
use crate::model::leave_request::{LeaveCandidate, LeaveRequest};
use crate::utils::date_range::{days_between, ranges_overlap};

pub const MAX_REASON_LEN: usize = 500;

/// Validate a candidate against the submission date, the employee's existing
/// Approved requests and the current-year balance. The balance check here is
/// advisory; approval re-validates under the row lock.
///
/// The leave type itself needs no check: it is a closed enum, so unrecognized
/// wire values fail decoding before a candidate exists.
///
/// Returns the inclusive day count on success.
pub fn validate_candidate(
    candidate: &LeaveCandidate,
    today: NaiveDate,
    approved: &[LeaveRequest],
    balance: Option<&LeaveBalance>,
) -> Result<u32, Vec<ValidationFailure>> {
    let mut failures = Vec::new();

    let days = match days_between(candidate.start_date, candidate.end_date) {
        Ok(days) => Some(days),
        Err(failure) => {
            failures.push(failure);
            None
        }
    };

    if candidate.start_date < today {
        failures.push(ValidationFailure::StartDateInPast);
    }

    let reason = candidate.reason.trim();
    if reason.is_empty() {
        failures.push(ValidationFailure::EmptyReason);
    } else if reason.chars().count() > MAX_REASON_LEN {
        failures.push(ValidationFailure::ReasonTooLong {
            max: MAX_REASON_LEN,
        });
    }

    for existing in approved {
        if ranges_overlap(
            candidate.start_date,
            candidate.end_date,
            existing.start_date,
            existing.end_date,
        ) {
            failures.push(ValidationFailure::OverlapsApproved {
                start: existing.start_date,
                end: existing.end_date,
            });
        }
    }

    // Balance sufficiency needs a day count, so it is skipped when the range
    // itself is malformed. A missing balance row counts as zero remaining.
    if let Some(days) = days {
        if candidate.leave_type.tracks_balance() {
            let remaining = balance
                .map(|b| b.remaining(candidate.leave_type))
                .unwrap_or(Remaining::Days(0));
            if let Remaining::Days(remaining) = remaining {
                if remaining < days {
                    failures.push(ValidationFailure::InsufficientBalance {
                        leave_type: candidate.leave_type,
                        requested: days,
                        remaining,
                    });
                }
            }
        }
    }

    match (failures.is_empty(), days) {
        (true, Some(days)) => Ok(days),
        _ => Err(failures),
    }
}
