//! The upward surface of the engine: submit, approve, reject and the
//! read-only projections. Approve/reject run the three-state machine under a
//! single transaction with row locks; notifications happen after commit.

use chrono::{Datelike, Utc};
use tracing::{info, warn};

use crate::directory::Directory;
use crate::error::{ConflictKind, LeaveError, ValidationFailure};
use crate::model::leave_balance::BalanceSummary;
use crate::model::leave_request::{LeaveCandidate, LeaveRequest, LeaveStatus};
use crate::notifier::Notifier;
use crate::store::{LeaveStore, LeaveTx, TeamLeaveRequest};
use crate::utils::date_range::ranges_overlap;
use crate::validate::validate_candidate;

pub struct LeaveService<S, D, N> {
    store: S,
    directory: D,
    notifier: N,
}

impl<S, D, N> LeaveService<S, D, N>
where
    S: LeaveStore,
    D: Directory,
    N: Notifier,
{
    pub fn new(store: S, directory: D, notifier: N) -> Self {
        Self {
            store,
            directory,
            notifier,
        }
    }

    /// Validate and persist a new Pending request. The balance check at this
    /// point is advisory only; nothing is reserved or pre-debited. The
    /// manager notification is attempted after the insert and its outcome
    /// never affects the result.
    pub async fn submit(&self, candidate: LeaveCandidate) -> Result<LeaveRequest, LeaveError> {
        let today = Utc::now().date_naive();
        let approved = self.store.list_approved(candidate.employee_id).await?;
        let balance = self
            .store
            .get_balance(candidate.employee_id, today.year())
            .await?;

        let days_count = validate_candidate(&candidate, today, &approved, balance.as_ref())
            .map_err(LeaveError::Validation)?;

        let request = self.store.insert_request(&candidate, days_count).await?;
        info!(
            request_id = request.id,
            employee_id = request.employee_id,
            days = request.days_count,
            "leave request submitted"
        );

        self.notify_manager(&request).await;
        Ok(request)
    }

    /// Pending -> Approved. Status flip and balance debit commit as one unit;
    /// a concurrent approve/reject of the same request blocks on the row lock
    /// and then fails the Pending check.
    pub async fn approve(
        &self,
        request_id: u64,
        approver_id: u64,
    ) -> Result<LeaveRequest, LeaveError> {
        let mut tx = self.store.begin().await?;
        let mut request = self
            .locked_pending(&mut tx, request_id, approver_id, LeaveStatus::Approved)
            .await?;

        // Submission only warns about overlap; this is the authoritative gate
        // keeping two approved requests from sharing a day.
        let approved = tx.list_approved(request.employee_id).await?;
        let overlapping = approved.iter().any(|other| {
            other.id != request.id
                && ranges_overlap(
                    request.start_date,
                    request.end_date,
                    other.start_date,
                    other.end_date,
                )
        });
        if overlapping {
            return Err(LeaveError::Conflict(ConflictKind::OverlappingLeave));
        }

        let now = Utc::now();
        if request.leave_type.tracks_balance() {
            let year = now.date_naive().year();
            let balance = tx
                .balance_for_update(request.employee_id, year)
                .await?
                .ok_or(LeaveError::NotFound("leave balance"))?;
            if let Some((total, used)) = balance.quota(request.leave_type) {
                let new_used = used + request.days_count;
                if new_used > total {
                    return Err(LeaveError::Conflict(ConflictKind::InsufficientBalance));
                }
                tx.update_balance_used(request.employee_id, year, request.leave_type, new_used)
                    .await?;
            }
        }

        tx.update_request_status(request_id, LeaveStatus::Approved, approver_id, now, None)
            .await?;
        tx.commit().await?;
        info!(request_id, approver_id, "leave request approved");

        request.status = LeaveStatus::Approved;
        request.approver_id = Some(approver_id);
        request.approved_at = Some(now);
        request.updated_at = now;

        self.notify_employee(&request, "approved", None).await;
        Ok(request)
    }

    /// Pending -> Rejected. Never touches the balance.
    pub async fn reject(
        &self,
        request_id: u64,
        approver_id: u64,
        rejection_reason: &str,
    ) -> Result<LeaveRequest, LeaveError> {
        let rejection_reason = rejection_reason.trim();
        if rejection_reason.is_empty() {
            return Err(LeaveError::Validation(vec![
                ValidationFailure::EmptyRejectionReason,
            ]));
        }

        let mut tx = self.store.begin().await?;
        let mut request = self
            .locked_pending(&mut tx, request_id, approver_id, LeaveStatus::Rejected)
            .await?;

        let now = Utc::now();
        tx.update_request_status(
            request_id,
            LeaveStatus::Rejected,
            approver_id,
            now,
            Some(rejection_reason),
        )
        .await?;
        tx.commit().await?;
        info!(request_id, approver_id, "leave request rejected");

        request.status = LeaveStatus::Rejected;
        request.approver_id = Some(approver_id);
        request.approved_at = Some(now);
        request.rejection_reason = Some(rejection_reason.to_string());
        request.updated_at = now;

        self.notify_employee(&request, "rejected", Some(rejection_reason))
            .await;
        Ok(request)
    }

    pub async fn get_balance(
        &self,
        employee_id: u64,
        year: i32,
    ) -> Result<BalanceSummary, LeaveError> {
        let balance = self
            .store
            .get_balance(employee_id, year)
            .await?
            .ok_or(LeaveError::NotFound("leave balance"))?;
        Ok(BalanceSummary::from(&balance))
    }

    pub async fn my_requests(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, LeaveError> {
        self.store.list_by_employee(employee_id).await
    }

    pub async fn team_requests(
        &self,
        manager_id: u64,
    ) -> Result<Vec<TeamLeaveRequest>, LeaveError> {
        self.store.list_by_manager(manager_id).await
    }

    /// Shared head of approve/reject: lock the row, check the transition is
    /// legal and that the actor is the employee's current manager.
    async fn locked_pending(
        &self,
        tx: &mut S::Tx,
        request_id: u64,
        approver_id: u64,
        next: LeaveStatus,
    ) -> Result<LeaveRequest, LeaveError> {
        let request = tx
            .request_for_update(request_id)
            .await?
            .ok_or(LeaveError::NotFound("leave request"))?;
        if !request.status.can_become(next) {
            return Err(LeaveError::Conflict(ConflictKind::InvalidTransition));
        }
        match self.directory.manager_of(request.employee_id).await? {
            Some(manager) if manager == approver_id => Ok(request),
            _ => Err(LeaveError::Authorization),
        }
    }

    async fn notify_manager(&self, request: &LeaveRequest) {
        let manager = match self.directory.manager_of(request.employee_id).await {
            Ok(Some(manager)) => manager,
            Ok(None) => {
                warn!(
                    employee_id = request.employee_id,
                    "no manager on record, skipping submission notification"
                );
                return;
            }
            Err(e) => {
                warn!(
                    error = %e,
                    employee_id = request.employee_id,
                    "manager lookup failed, skipping submission notification"
                );
                return;
            }
        };

        let subject = format!("Leave request #{} awaiting review", request.id);
        let body = format!(
            "Employee {} requested {} leave from {} to {} ({} days).",
            request.employee_id,
            request.leave_type,
            request.start_date,
            request.end_date,
            request.days_count
        );
        if let Err(e) = self.notifier.notify(manager, &subject, &body).await {
            warn!(error = %e, request_id = request.id, "submission notification failed");
        }
    }

    async fn notify_employee(&self, request: &LeaveRequest, decision: &str, note: Option<&str>) {
        let subject = format!("Leave request #{} {}", request.id, decision);
        let mut body = format!(
            "Your {} leave from {} to {} was {}.",
            request.leave_type, request.start_date, request.end_date, decision
        );
        if let Some(note) = note {
            body.push_str(&format!(" Reason: {note}"));
        }
        if let Err(e) = self.notifier.notify(request.employee_id, &subject, &body).await {
            warn!(error = %e, request_id = request.id, "decision notification failed");
        }
    }
}
