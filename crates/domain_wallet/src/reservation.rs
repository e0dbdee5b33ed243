//! Reservations held against a wallet balance

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{RequestId, ReservationId, Tomans, UserId};

/// A hold that lowers the available balance without touching the balance
///
/// Lives only while the request it backs is pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletReservation {
    pub id: ReservationId,
    pub user_id: UserId,
    /// The request this hold backs, if any
    pub request_id: Option<RequestId>,
    pub amount: Tomans,
    pub created_at: DateTime<Utc>,
}

impl WalletReservation {
    pub fn new(user_id: UserId, amount: Tomans, request_id: Option<RequestId>) -> Self {
        Self {
            id: ReservationId::new_v7(),
            user_id,
            request_id,
            amount,
            created_at: Utc::now(),
        }
    }
}

/// How a reservation is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalizeDirection {
    /// The held amount leaves the balance for good
    Debit,
    /// The hold is dropped and the balance is untouched
    Release,
}
