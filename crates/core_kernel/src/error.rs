//! Kernel errors

use thiserror::Error;

use crate::approval::ApprovalStatus;
use crate::money::MoneyError;

/// Errors raised by the shared value types
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The approval lifecycle does not allow the move
    #[error("Illegal status change: {from} -> {to}")]
    IllegalTransition {
        from: ApprovalStatus,
        to: ApprovalStatus,
    },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn illegal_transition(from: ApprovalStatus, to: ApprovalStatus) -> Self {
        CoreError::IllegalTransition { from, to }
    }
}
