//! User identity profiles

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use core_kernel::{DocumentRef, SubmissionId, UserId};

use crate::level::{GatedAction, KycLevel, KycStatus};
use crate::submission::{SubmissionPayload, VerificationSubmission};

/// The identity half of a user
///
/// # Invariants
///
/// - `kyc_level` only rises, one step at a time, through an approved submission
/// - `kyc_status == Pending` iff `pending_submission` is set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    kyc_level: KycLevel,
    kyc_status: KycStatus,
    pending_submission: Option<SubmissionId>,
    pub full_name: Option<String>,
    pub national_code: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub bank_card_number: Option<String>,
    pub kyc_documents: BTreeSet<DocumentRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            kyc_level: KycLevel::Unverified,
            kyc_status: KycStatus::None,
            pending_submission: None,
            full_name: None,
            national_code: None,
            birth_date: None,
            bank_card_number: None,
            kyc_documents: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn kyc_level(&self) -> KycLevel {
        self.kyc_level
    }

    pub fn kyc_status(&self) -> KycStatus {
        self.kyc_status
    }

    pub fn pending_submission(&self) -> Option<SubmissionId> {
        self.pending_submission
    }

    pub fn permits(&self, action: GatedAction) -> bool {
        action.permitted_at(self.kyc_level)
    }

    pub(crate) fn mark_pending(&mut self, submission: SubmissionId) {
        self.pending_submission = Some(submission);
        self.kyc_status = KycStatus::Pending;
        self.updated_at = Utc::now();
    }

    /// Raises the level and copies the verified data onto the profile
    pub(crate) fn apply_approval(&mut self, submission: &VerificationSubmission) {
        match &submission.payload {
            SubmissionPayload::Identity(details) => {
                self.full_name = Some(details.full_name.trim().to_string());
                self.national_code = Some(details.national_code.clone());
                self.birth_date = Some(details.birth_date);
                self.bank_card_number = Some(details.card_number.clone());
            }
            SubmissionPayload::Documents { documents } => {
                self.kyc_documents.extend(documents.iter().copied());
            }
        }
        self.kyc_level = submission.target_level;
        self.kyc_status = KycStatus::Approved;
        self.pending_submission = None;
        self.updated_at = Utc::now();
    }

    pub(crate) fn apply_rejection(&mut self) {
        self.kyc_status = KycStatus::Rejected;
        self.pending_submission = None;
        self.updated_at = Utc::now();
    }

    /// Card number with all but the last four digits hidden
    pub fn masked_card_number(&self) -> Option<String> {
        self.bank_card_number.as_ref().map(|card| {
            let hidden = card.chars().count().saturating_sub(4);
            card.chars()
                .enumerate()
                .map(|(i, c)| if i < hidden { '*' } else { c })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_is_level_zero() {
        let profile = UserProfile::new(UserId::new());
        assert_eq!(profile.kyc_level(), KycLevel::Unverified);
        assert_eq!(profile.kyc_status(), KycStatus::None);
        assert!(!profile.permits(GatedAction::Deposit));
    }

    #[test]
    fn test_masked_card_number() {
        let mut profile = UserProfile::new(UserId::new());
        assert_eq!(profile.masked_card_number(), None);
        profile.bank_card_number = Some("4111111111111111".into());
        assert_eq!(profile.masked_card_number().unwrap(), "************1111");
    }
}
