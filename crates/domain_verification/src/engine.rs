//! The verification tier engine
//!
//! Owns user identity profiles and KYC submissions. Each profile sits behind
//! its own mutex; `submit` and `resolve` hold it for the whole
//! check-then-write, so the single-pending rule and level monotonicity hold
//! under concurrent callers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

use core_kernel::{
    bounded, notify_best_effort, ApprovalStatus, Decision, DocumentStore, NotificationSink,
    NotificationSubject, Principal, StatusNotification, SubmissionId, UserId,
};

use crate::error::VerificationError;
use crate::level::{GatedAction, KycLevel};
use crate::profile::UserProfile;
use crate::submission::{SubmissionPayload, VerificationSubmission};
use crate::validation::SubmissionValidator;

/// Timeouts for the engine's collaborator calls
#[derive(Debug, Clone)]
pub struct VerificationConfig {
    pub document_timeout: Duration,
    pub notification_timeout: Duration,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            document_timeout: Duration::from_secs(5),
            notification_timeout: Duration::from_secs(2),
        }
    }
}

/// Advances users through KYC levels and answers permission queries
pub struct VerificationTierEngine {
    profiles: RwLock<HashMap<UserId, Arc<Mutex<UserProfile>>>>,
    submissions: RwLock<HashMap<SubmissionId, VerificationSubmission>>,
    documents: Arc<dyn DocumentStore>,
    notifier: Arc<dyn NotificationSink>,
    config: VerificationConfig,
}

impl VerificationTierEngine {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        notifier: Arc<dyn NotificationSink>,
        config: VerificationConfig,
    ) -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            submissions: RwLock::new(HashMap::new()),
            documents,
            notifier,
            config,
        }
    }

    /// Creates a level 0 profile; registering twice returns the existing one
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn register(&self, user_id: UserId) -> UserProfile {
        let handle = {
            let mut profiles = self.profiles.write().await;
            profiles
                .entry(user_id)
                .or_insert_with(|| {
                    tracing::info!("profile registered");
                    Arc::new(Mutex::new(UserProfile::new(user_id)))
                })
                .clone()
        };
        let profile = handle.lock().await;
        profile.clone()
    }

    /// Files a submission for the next level
    ///
    /// # Errors
    ///
    /// * `UserNotFound` - The user is not registered
    /// * `InvalidLevelSequence` - `target_level` is not current + 1
    /// * `AlreadyPending` - A submission is awaiting review
    /// * `Validation` - The payload is malformed or references unknown documents
    /// * `DocumentStore` - The document store failed or timed out
    #[instrument(skip_all, fields(user_id = %user_id, target_level = target_level))]
    pub async fn submit(
        &self,
        user_id: UserId,
        target_level: u8,
        payload: SubmissionPayload,
    ) -> Result<VerificationSubmission, VerificationError> {
        let handle = self.profile_handle(user_id).await?;
        let mut profile = handle.lock().await;

        let current = profile.kyc_level();
        let target = match KycLevel::try_from(target_level) {
            Ok(level) if current.next() == Some(level) => level,
            _ => {
                tracing::warn!(%current, "out of sequence submission refused");
                return Err(VerificationError::InvalidLevelSequence {
                    current,
                    requested: target_level,
                });
            }
        };

        if profile.pending_submission().is_some() {
            return Err(VerificationError::AlreadyPending { user_id, level: target });
        }

        let result = SubmissionValidator::validate(target, &payload, Utc::now().date_naive());
        if !result.is_valid {
            tracing::warn!(errors = ?result.errors, "submission failed validation");
            return Err(VerificationError::validation_failed(result.errors));
        }
        if let SubmissionPayload::Documents { documents } = &payload {
            for document in documents {
                let exists = bounded(
                    "document_exists",
                    self.config.document_timeout,
                    self.documents.exists(*document),
                )
                .await?;
                if !exists {
                    return Err(VerificationError::validation(format!(
                        "unknown document: {document}"
                    )));
                }
            }
        }

        let submission = VerificationSubmission::new(user_id, target, payload);
        self.submissions
            .write()
            .await
            .insert(submission.id, submission.clone());
        profile.mark_pending(submission.id);
        drop(profile);

        tracing::info!(submission_id = %submission.id, "verification submitted");
        self.notify(&submission).await;
        Ok(submission)
    }

    /// Approves or rejects a pending submission
    ///
    /// Approval raises the user's level and copies the verified data onto the
    /// profile. Rejection requires a note; the user may resubmit the level.
    ///
    /// # Errors
    ///
    /// * `NotAuthorized` - The principal is not an admin
    /// * `Validation` - Rejection without a note
    /// * `NotPending` - The submission was already resolved
    #[instrument(skip_all, fields(submission_id = %submission_id, ?decision, admin = %principal.subject))]
    pub async fn resolve(
        &self,
        submission_id: SubmissionId,
        decision: Decision,
        note: Option<String>,
        principal: &Principal,
    ) -> Result<VerificationSubmission, VerificationError> {
        if !principal.is_admin() {
            return Err(VerificationError::not_authorized(
                "only admins resolve verification submissions",
            ));
        }
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        if decision == Decision::Reject && note.is_none() {
            return Err(VerificationError::validation("a note is required when rejecting"));
        }

        let user_id = self
            .submissions
            .read()
            .await
            .get(&submission_id)
            .map(|s| s.user_id)
            .ok_or(VerificationError::SubmissionNotFound(submission_id))?;

        let handle = self.profile_handle(user_id).await?;
        let mut profile = handle.lock().await;

        let resolved = {
            let mut submissions = self.submissions.write().await;
            let submission = submissions
                .get_mut(&submission_id)
                .ok_or(VerificationError::SubmissionNotFound(submission_id))?;

            if !submission.is_pending() {
                tracing::warn!(status = %submission.status, "submission already resolved");
                return Err(VerificationError::NotPending {
                    id: submission_id,
                    status: submission.status,
                });
            }
            if decision == Decision::Approve
                && profile.kyc_level().next() != Some(submission.target_level)
            {
                return Err(VerificationError::InvalidLevelSequence {
                    current: profile.kyc_level(),
                    requested: submission.target_level.value(),
                });
            }

            submission
                .resolve(decision, note, &principal.subject)
                .map_err(|e| VerificationError::validation(e.to_string()))?;
            submission.clone()
        };

        match decision {
            Decision::Approve => profile.apply_approval(&resolved),
            Decision::Reject => profile.apply_rejection(),
        }
        drop(profile);

        tracing::info!(%user_id, status = %resolved.status, "verification resolved");
        self.notify(&resolved).await;
        Ok(resolved)
    }

    /// Returns true if the user's level allows the action
    ///
    /// Unknown users are never permitted.
    pub async fn permits(&self, user_id: UserId, action: GatedAction) -> bool {
        match self.profile_handle(user_id).await {
            Ok(handle) => handle.lock().await.permits(action),
            Err(_) => false,
        }
    }

    pub async fn profile(&self, user_id: UserId) -> Result<UserProfile, VerificationError> {
        let handle = self.profile_handle(user_id).await?;
        let profile = handle.lock().await;
        Ok(profile.clone())
    }

    pub async fn submission(
        &self,
        submission_id: SubmissionId,
    ) -> Result<VerificationSubmission, VerificationError> {
        self.submissions
            .read()
            .await
            .get(&submission_id)
            .cloned()
            .ok_or(VerificationError::SubmissionNotFound(submission_id))
    }

    /// A user's submissions, oldest first
    pub async fn submissions_for(&self, user_id: UserId) -> Vec<VerificationSubmission> {
        let mut found: Vec<_> = self
            .submissions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|s| (s.submitted_at, s.id));
        found
    }

    /// The admin review queue, oldest first
    pub async fn list_pending(&self) -> Vec<VerificationSubmission> {
        let mut pending: Vec<_> = self
            .submissions
            .read()
            .await
            .values()
            .filter(|s| s.status == ApprovalStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|s| (s.submitted_at, s.id));
        pending
    }

    async fn profile_handle(
        &self,
        user_id: UserId,
    ) -> Result<Arc<Mutex<UserProfile>>, VerificationError> {
        self.profiles
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or(VerificationError::UserNotFound(user_id))
    }

    async fn notify(&self, submission: &VerificationSubmission) {
        let notification = StatusNotification::new(
            submission.user_id,
            NotificationSubject::Submission(submission.id),
            submission.status,
            submission.admin_note.clone(),
        );
        notify_best_effort(self.notifier.as_ref(), notification, self.config.notification_timeout)
            .await;
    }
}
