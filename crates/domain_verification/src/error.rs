//! Verification domain errors

use thiserror::Error;

use core_kernel::{ApprovalStatus, PortError, SubmissionId, UserId};

use crate::level::KycLevel;

/// Errors that can occur in the verification domain
#[derive(Debug, Error)]
pub enum VerificationError {
    /// A submission for the level is already awaiting review
    #[error("A level {level} submission is already pending for {user_id}")]
    AlreadyPending { user_id: UserId, level: KycLevel },

    /// Levels are climbed one at a time
    #[error("Cannot submit level {requested} from level {current}")]
    InvalidLevelSequence { current: KycLevel, requested: u8 },

    /// Payload fields are missing or malformed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The submission was already resolved
    #[error("Submission {id} is not pending (status: {status})")]
    NotPending { id: SubmissionId, status: ApprovalStatus },

    /// The caller may not perform the operation
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Submission not found: {0}")]
    SubmissionNotFound(SubmissionId),

    /// The document store failed or timed out
    #[error("Document store error: {0}")]
    DocumentStore(#[from] PortError),
}

impl VerificationError {
    pub fn validation(message: impl Into<String>) -> Self {
        VerificationError::Validation(message.into())
    }

    /// Creates a Validation error from a list of failures
    pub fn validation_failed(errors: Vec<String>) -> Self {
        VerificationError::Validation(errors.join("; "))
    }

    pub fn not_authorized(message: impl Into<String>) -> Self {
        VerificationError::NotAuthorized(message.into())
    }
}
