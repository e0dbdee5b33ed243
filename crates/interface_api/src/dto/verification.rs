//! Verification DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ApprovalStatus, DocumentRef, SubmissionId, UserId};
use domain_verification::{
    IdentityDetails, KycLevel, SubmissionPayload, VerificationSubmission,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct IdentityInput {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,
    #[validate(length(equal = 10))]
    pub national_code: String,
    pub birth_date: NaiveDate,
    #[validate(length(equal = 16))]
    pub card_number: String,
}

/// Level 1 carries `identity`, level 2 carries `documents`
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitVerificationRequest {
    #[validate(range(min = 1, max = 2))]
    pub target_level: u8,
    #[validate(nested)]
    pub identity: Option<IdentityInput>,
    #[validate(length(min = 1, max = 10))]
    pub documents: Option<Vec<DocumentRef>>,
}

impl SubmitVerificationRequest {
    pub fn into_payload(self) -> Result<(u8, SubmissionPayload), ApiError> {
        let payload = match (self.target_level, self.identity, self.documents) {
            (1, Some(identity), None) => SubmissionPayload::Identity(IdentityDetails {
                full_name: identity.full_name,
                national_code: identity.national_code,
                birth_date: identity.birth_date,
                card_number: identity.card_number,
            }),
            (2, None, Some(documents)) => SubmissionPayload::Documents { documents },
            (1, ..) => {
                return Err(ApiError::Validation(
                    "level 1 takes identity details only".into(),
                ))
            }
            _ => return Err(ApiError::Validation("level 2 takes documents only".into())),
        };
        Ok((self.target_level, payload))
    }
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
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

impl From<VerificationSubmission> for SubmissionResponse {
    fn from(submission: VerificationSubmission) -> Self {
        Self {
            id: submission.id,
            user_id: submission.user_id,
            target_level: submission.target_level,
            payload: submission.payload,
            status: submission.status,
            admin_note: submission.admin_note,
            submitted_at: submission.submitted_at,
            resolved_at: submission.resolved_at,
            resolved_by: submission.resolved_by,
        }
    }
}
