//! KYC submissions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ApprovalStatus, CoreError, Decision, DocumentRef, SubmissionId, UserId};

use crate::level::KycLevel;

/// Identity details supplied for level 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDetails {
    pub full_name: String,
    pub national_code: String,
    pub birth_date: NaiveDate,
    pub card_number: String,
}

/// What the user submits for review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmissionPayload {
    /// Level 1
    Identity(IdentityDetails),
    /// Level 2
    Documents { documents: Vec<DocumentRef> },
}

impl SubmissionPayload {
    /// The level this kind of payload verifies
    pub fn level(&self) -> KycLevel {
        match self {
            SubmissionPayload::Identity(_) => KycLevel::Basic,
            SubmissionPayload::Documents { .. } => KycLevel::Advanced,
        }
    }
}

/// A request to move a user one KYC level up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSubmission {
    pub id: SubmissionId,
    pub user_id: UserId,
    pub target_level: KycLevel,
    pub payload: SubmissionPayload,
    pub status: ApprovalStatus,
    pub admin_note: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
}

impl VerificationSubmission {
    pub fn new(user_id: UserId, target_level: KycLevel, payload: SubmissionPayload) -> Self {
        Self {
            id: SubmissionId::new_v7(),
            user_id,
            target_level,
            payload,
            status: ApprovalStatus::Pending,
            admin_note: None,
            submitted_at: Utc::now(),
            resolved_at: None,
            resolved_by: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Records an admin decision
    ///
    /// Submissions end at approved or rejected; they never complete.
    pub fn resolve(
        &mut self,
        decision: Decision,
        note: Option<String>,
        resolved_by: &str,
    ) -> Result<(), CoreError> {
        let target = match decision {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        };
        self.status.transition_to(target)?;
        self.admin_note = note;
        self.resolved_at = Some(Utc::now());
        self.resolved_by = Some(resolved_by.to_string());
        Ok(())
    }
}
