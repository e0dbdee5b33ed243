//! The approval workflow
//!
//! Moves financial requests through the admin-gated lifecycle and applies
//! the matching wallet effect:
//!
//! | Kind        | Approve                         | Reject             |
//! |-------------|---------------------------------|--------------------|
//! | deposit     | credit amount, completed        | rejected           |
//! | buy / trade | debit reservation, approved or completed | release, rejected |
//! | sell        | credit total, completed         | rejected           |
//!
//! Resolution first claims the request (pending and not in flight) under
//! the store lock, applies the ledger effect without holding it, then
//! commits the new status. A second resolver sees the claim and gets
//! `AlreadyResolved` without touching the ledger. If the ledger refuses the
//! effect the claim is dropped and the request stays pending.
//!
//! Opening and resolving run on a spawned task. Once started they finish
//! even if the caller's future is dropped, so a reservation always has a
//! record and a ledger effect always has its status change.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{instrument, Instrument};

use core_kernel::{
    notify_best_effort, ApprovalStatus, Decision, NotificationSink, NotificationSubject,
    Principal, RequestId, StatusNotification, UserId,
};
use domain_wallet::{FinalizeDirection, WalletLedger};

use crate::error::RequestError;
use crate::request::{FinancialRequest, RequestDraft, RequestKind};

/// Note recorded when a user withdraws their own request
pub const USER_CANCELLED_NOTE: &str = "user_cancelled";

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub notification_timeout: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            notification_timeout: Duration::from_secs(2),
        }
    }
}

/// Store and ledger shared with the spawned tasks
struct WorkflowCore {
    requests: RwLock<HashMap<RequestId, FinancialRequest>>,
    in_flight: Mutex<HashSet<RequestId>>,
    ledger: Arc<WalletLedger>,
}

/// A resolution in progress; dropping it frees the request again
struct Claim {
    core: Arc<WorkflowCore>,
    request_id: RequestId,
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.core.in_flight().remove(&self.request_id);
    }
}

/// Lifecycle owner for deposits and orders
pub struct ApprovalWorkflow {
    core: Arc<WorkflowCore>,
    notifier: Arc<dyn NotificationSink>,
    config: WorkflowConfig,
}

impl ApprovalWorkflow {
    pub fn new(
        ledger: Arc<WalletLedger>,
        notifier: Arc<dyn NotificationSink>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            core: Arc::new(WorkflowCore {
                requests: RwLock::new(HashMap::new()),
                in_flight: Mutex::new(HashSet::new()),
                ledger,
            }),
            notifier,
            config,
        }
    }

    /// Records a pending request, reserving its total first when needed
    ///
    /// Either both the reservation and the record exist afterwards, or
    /// neither does.
    ///
    /// # Errors
    ///
    /// * `InsufficientFunds` - The wallet cannot cover a buy or trade
    #[instrument(skip_all, fields(user_id = %draft.user_id, kind = %draft.kind))]
    pub async fn open(&self, draft: RequestDraft) -> Result<FinancialRequest, RequestError> {
        let request = FinancialRequest::from_draft(RequestId::new_v7(), draft);
        let core = Arc::clone(&self.core);
        let request = detached(async move { core.record(request).await }).await?;

        tracing::info!(request_id = %request.id, total = request.total_value_tmn().value(), "request opened");
        self.notify(&request).await;
        Ok(request)
    }

    /// Approves or rejects a pending request
    ///
    /// # Errors
    ///
    /// * `NotAuthorized` - The principal is not an admin
    /// * `Validation` - Rejection without a note
    /// * `AlreadyResolved` - The request is no longer pending or another
    ///   resolution is in flight
    /// * `Ledger` - The wallet refused the effect; the request stays pending
    #[instrument(skip_all, fields(request_id = %request_id, ?decision, admin = %principal.subject))]
    pub async fn resolve(
        &self,
        request_id: RequestId,
        decision: Decision,
        note: Option<String>,
        principal: &Principal,
    ) -> Result<FinancialRequest, RequestError> {
        if !principal.is_admin() {
            return Err(RequestError::not_authorized("only admins resolve requests"));
        }
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        if decision == Decision::Reject && note.is_none() {
            return Err(RequestError::validation("a note is required when rejecting"));
        }

        self.settle(request_id, decision, note, principal.subject.clone(), None)
            .await
    }

    /// Withdraws the user's own pending request
    ///
    /// Same effect as an admin rejection with the note `user_cancelled`.
    #[instrument(skip_all, fields(request_id = %request_id, user_id = %user_id))]
    pub async fn cancel(
        &self,
        request_id: RequestId,
        user_id: UserId,
    ) -> Result<FinancialRequest, RequestError> {
        self.settle(
            request_id,
            Decision::Reject,
            Some(USER_CANCELLED_NOTE.to_string()),
            user_id.to_string(),
            Some(user_id),
        )
        .await
    }

    /// Marks an approved request's off-system transfer as done
    ///
    /// # Errors
    ///
    /// * `NotPending` - The request is not in the approved state
    #[instrument(skip_all, fields(request_id = %request_id, admin = %principal.subject))]
    pub async fn mark_completed(
        &self,
        request_id: RequestId,
        note: Option<String>,
        principal: &Principal,
    ) -> Result<FinancialRequest, RequestError> {
        if !principal.is_admin() {
            return Err(RequestError::not_authorized("only admins complete requests"));
        }

        let completed = {
            let mut requests = self.core.requests.write().await;
            let request = requests
                .get_mut(&request_id)
                .ok_or(RequestError::NotFound(request_id))?;

            if request.status != ApprovalStatus::Approved {
                return Err(RequestError::NotPending {
                    id: request_id,
                    status: request.status,
                });
            }
            request
                .status
                .transition_to(ApprovalStatus::Completed)
                .map_err(|e| RequestError::validation(e.to_string()))?;
            request.completed_at = Some(Utc::now());
            if let Some(note) = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
                request.admin_note = Some(note);
            }
            request.clone()
        };

        tracing::info!("request completed");
        self.notify(&completed).await;
        Ok(completed)
    }

    pub async fn get(&self, request_id: RequestId) -> Result<FinancialRequest, RequestError> {
        self.core
            .requests
            .read()
            .await
            .get(&request_id)
            .cloned()
            .ok_or(RequestError::NotFound(request_id))
    }

    /// The admin queue, oldest first, optionally narrowed to one kind
    pub async fn list_pending(&self, kind: Option<RequestKind>) -> Vec<FinancialRequest> {
        let mut pending: Vec<_> = self
            .core
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.is_pending())
            .filter(|r| kind.map_or(true, |k| r.kind == k))
            .cloned()
            .collect();
        pending.sort_by_key(|r| (r.created_at, r.id));
        pending
    }

    /// A user's requests, newest first
    pub async fn list_for_user(&self, user_id: UserId) -> Vec<FinancialRequest> {
        let mut found: Vec<_> = self
            .core
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| std::cmp::Reverse((r.created_at, r.id)));
        found
    }

    async fn settle(
        &self,
        request_id: RequestId,
        decision: Decision,
        note: Option<String>,
        resolved_by: String,
        owner: Option<UserId>,
    ) -> Result<FinancialRequest, RequestError> {
        let core = Arc::clone(&self.core);
        let resolved = detached(async move {
            core.resolve_claimed(request_id, decision, note, resolved_by, owner)
                .await
        })
        .await?;

        tracing::info!(status = %resolved.status, "request resolved");
        self.notify(&resolved).await;
        Ok(resolved)
    }

    async fn notify(&self, request: &FinancialRequest) {
        let notification = StatusNotification::new(
            request.user_id,
            NotificationSubject::Request(request.id),
            request.status,
            request.admin_note.clone(),
        );
        notify_best_effort(self.notifier.as_ref(), notification, self.config.notification_timeout)
            .await;
    }
}

/// Runs a store mutation to completion regardless of the caller
async fn detached<F>(task: F) -> Result<FinancialRequest, RequestError>
where
    F: Future<Output = Result<FinancialRequest, RequestError>> + Send + 'static,
{
    tokio::spawn(task.in_current_span())
        .await
        .map_err(|error| {
            tracing::error!(%error, "workflow task aborted");
            RequestError::TaskAborted(error.to_string())
        })?
}

impl WorkflowCore {
    fn in_flight(&self) -> MutexGuard<'_, HashSet<RequestId>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn record(&self, mut request: FinancialRequest) -> Result<FinancialRequest, RequestError> {
        if request.kind.is_reserve_backed() {
            let reservation = self
                .ledger
                .reserve(request.user_id, request.total_value_tmn(), Some(request.id))
                .await?;
            request.reservation_id = Some(reservation);
        }

        self.requests
            .write()
            .await
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn resolve_claimed(
        self: &Arc<Self>,
        request_id: RequestId,
        decision: Decision,
        note: Option<String>,
        resolved_by: String,
        owner: Option<UserId>,
    ) -> Result<FinancialRequest, RequestError> {
        let (request, _claim) = self.claim(request_id, owner).await?;

        let target = match self.apply_effect(&request, decision).await {
            Ok(target) => target,
            Err(error) => {
                if error.is_internal() {
                    tracing::error!(%error, "ledger effect failed, request left pending");
                }
                return Err(error);
            }
        };

        let mut requests = self.requests.write().await;
        let stored = requests
            .get_mut(&request_id)
            .ok_or(RequestError::NotFound(request_id))?;

        stored
            .status
            .transition_to(target)
            .map_err(|_| RequestError::AlreadyResolved {
                id: request_id,
                status: stored.status,
            })?;
        let now = Utc::now();
        stored.admin_note = note;
        stored.resolved_at = Some(now);
        stored.resolved_by = Some(resolved_by);
        if target == ApprovalStatus::Completed {
            stored.completed_at = Some(now);
        }
        if decision == Decision::Reject || request.kind.is_reserve_backed() {
            stored.reservation_id = None;
        }
        Ok(stored.clone())
    }

    /// Marks a pending request as in flight, returning a copy of it
    async fn claim(
        self: &Arc<Self>,
        request_id: RequestId,
        owner: Option<UserId>,
    ) -> Result<(FinancialRequest, Claim), RequestError> {
        let requests = self.requests.read().await;
        let request = requests
            .get(&request_id)
            .cloned()
            .ok_or(RequestError::NotFound(request_id))?;

        if let Some(owner) = owner {
            if request.user_id != owner {
                return Err(RequestError::not_authorized("request belongs to another user"));
            }
        }
        if !request.is_pending() || !self.in_flight().insert(request_id) {
            tracing::warn!(status = %request.status, "request already resolved");
            return Err(RequestError::AlreadyResolved {
                id: request_id,
                status: request.status,
            });
        }

        let claim = Claim {
            core: Arc::clone(self),
            request_id,
        };
        Ok((request, claim))
    }

    /// Applies the wallet side of a decision and returns the target status
    async fn apply_effect(
        &self,
        request: &FinancialRequest,
        decision: Decision,
    ) -> Result<ApprovalStatus, RequestError> {
        let reference = request.id.to_string();
        match (decision, request.kind) {
            (Decision::Approve, RequestKind::Deposit) => {
                self.ledger
                    .credit(request.user_id, request.amount_tmn, reference)
                    .await?;
            }
            (Decision::Approve, RequestKind::Sell) => {
                self.ledger
                    .credit(request.user_id, request.total_value_tmn(), reference)
                    .await?;
            }
            (Decision::Approve, RequestKind::Buy | RequestKind::Trade) => {
                let reservation = request.reservation_id.ok_or_else(|| {
                    RequestError::validation(format!("{} has no reservation", request.id))
                })?;
                self.ledger
                    .finalize(reservation, FinalizeDirection::Debit)
                    .await?;
            }
            (Decision::Reject, _) => {
                if let Some(reservation) = request.reservation_id {
                    self.ledger
                        .finalize(reservation, FinalizeDirection::Release)
                        .await?;
                }
                return Ok(ApprovalStatus::Rejected);
            }
        }
        Ok(request.approved_status())
    }
}
