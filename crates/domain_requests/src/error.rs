//! Requests domain errors

use thiserror::Error;

use core_kernel::{ApprovalStatus, PortError, RequestId, Tomans};
use domain_wallet::WalletError;

/// Errors that can occur in the requests domain
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request is malformed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The user's verification level does not allow the action
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The wallet cannot cover the order
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Tomans, available: Tomans },

    /// Another resolution got there first
    #[error("Request {id} already resolved (status: {status})")]
    AlreadyResolved { id: RequestId, status: ApprovalStatus },

    /// The request is not in the state the operation needs
    #[error("Request {id} is {status}")]
    NotPending { id: RequestId, status: ApprovalStatus },

    /// The caller may not perform the operation
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Request not found: {0}")]
    NotFound(RequestId),

    /// No usable quote for the symbol
    #[error("Price unavailable for {symbol}: {source}")]
    PriceUnavailable {
        symbol: String,
        #[source]
        source: PortError,
    },

    /// The ledger refused an effect the workflow expected to succeed
    #[error("Ledger error: {0}")]
    Ledger(WalletError),

    /// The task running a store mutation panicked or was shut down
    #[error("Workflow task aborted: {0}")]
    TaskAborted(String),
}

impl RequestError {
    pub fn validation(message: impl Into<String>) -> Self {
        RequestError::Validation(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        RequestError::PermissionDenied(message.into())
    }

    pub fn not_authorized(message: impl Into<String>) -> Self {
        RequestError::NotAuthorized(message.into())
    }

    /// Returns true if the error signals a bug rather than a refused request
    pub fn is_internal(&self) -> bool {
        matches!(self, RequestError::Ledger(_) | RequestError::TaskAborted(_))
    }
}

impl From<WalletError> for RequestError {
    fn from(error: WalletError) -> Self {
        match error {
            WalletError::InsufficientFunds { requested, available, .. } => {
                RequestError::InsufficientFunds { requested, available }
            }
            WalletError::InvalidAmount(message) => RequestError::Validation(message),
            other => RequestError::Ledger(other),
        }
    }
}

