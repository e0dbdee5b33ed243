//! Wallet domain errors

use thiserror::Error;

use core_kernel::{MoneyError, ReservationId, Tomans, UserId};

/// Errors that can occur in the wallet domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    /// The available balance does not cover the requested hold
    #[error("Insufficient funds for {user_id}: requested {requested}, available {available}")]
    InsufficientFunds {
        user_id: UserId,
        requested: Tomans,
        available: Tomans,
    },

    /// The reservation does not exist or was already finalized
    #[error("Unknown reservation: {0}")]
    UnknownReservation(ReservationId),

    /// No wallet account is open for the user
    #[error("Account not found: {0}")]
    AccountNotFound(UserId),

    /// The amount is zero, negative or otherwise unusable
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Balance arithmetic overflowed
    #[error("Balance overflow")]
    Overflow,
}

impl From<MoneyError> for WalletError {
    fn from(error: MoneyError) -> Self {
        match error {
            MoneyError::Overflow => WalletError::Overflow,
            MoneyError::InvalidAmount(message) => WalletError::InvalidAmount(message),
            MoneyError::Underflow => {
                WalletError::InvalidAmount("balance would become negative".to_string())
            }
        }
    }
}
