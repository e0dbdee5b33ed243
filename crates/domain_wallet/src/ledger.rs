//! The wallet ledger
//!
//! Single point of balance mutation for the whole back office. Accounts are
//! kept in a map guarded by an `RwLock`; each account sits behind its own
//! `tokio::sync::Mutex`, so operations on one user serialize while different
//! users proceed in parallel. A reservation index maps every live
//! reservation to its owner so `finalize` locks only that account.
//!
//! Lock order is account first, index second. The index read in `finalize`
//! is dropped before the account lock is taken.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

use core_kernel::{RequestId, ReservationId, Tomans, UserId};

use crate::account::{BalanceSnapshot, WalletAccount};
use crate::error::WalletError;
use crate::journal::JournalEntry;
use crate::reservation::{FinalizeDirection, WalletReservation};

type AccountHandle = Arc<Mutex<WalletAccount>>;

/// Authoritative store of toman balances and reservations
///
/// # Invariants
///
/// - `available = balance - sum(active reservations) >= 0` for every account
/// - A reservation is finalized at most once
/// - Every effect is journaled under the same lock that applied it
#[derive(Debug, Default)]
pub struct WalletLedger {
    accounts: RwLock<HashMap<UserId, AccountHandle>>,
    reservation_index: RwLock<HashMap<ReservationId, UserId>>,
}

impl WalletLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a zero-balance account; opening twice is a no-op
    ///
    /// Returns true if a new account was created.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn open_account(&self, user_id: UserId) -> bool {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&user_id) {
            return false;
        }
        accounts.insert(user_id, Arc::new(Mutex::new(WalletAccount::open(user_id))));
        tracing::info!("wallet account opened");
        true
    }

    /// Returns true if the user has an account
    pub async fn has_account(&self, user_id: UserId) -> bool {
        self.accounts.read().await.contains_key(&user_id)
    }

    /// Current balance, reserved and available figures
    pub async fn balance(&self, user_id: UserId) -> Result<BalanceSnapshot, WalletError> {
        let account = self.account(user_id).await?;
        let guard = account.lock().await;
        guard.snapshot()
    }

    /// Holds `amount` against the user's available balance
    ///
    /// # Errors
    ///
    /// * `InsufficientFunds` - The available balance is below `amount`
    /// * `InvalidAmount` - `amount` is zero
    /// * `AccountNotFound` - The user has no account
    #[instrument(skip_all, fields(user_id = %user_id, amount = amount.value()))]
    pub async fn reserve(
        &self,
        user_id: UserId,
        amount: Tomans,
        request_id: Option<RequestId>,
    ) -> Result<ReservationId, WalletError> {
        let account = self.account(user_id).await?;
        let mut guard = account.lock().await;
        // account before index; nothing awaits between the two writes
        let mut index = self.reservation_index.write().await;

        let reservation = match guard.reserve(amount, request_id) {
            Ok(reservation) => reservation,
            Err(error) => {
                tracing::warn!(%error, "reservation refused");
                return Err(error);
            }
        };
        index.insert(reservation.id, user_id);

        tracing::info!(reservation_id = %reservation.id, "funds reserved");
        Ok(reservation.id)
    }

    /// Debits or releases a reservation
    ///
    /// # Errors
    ///
    /// * `UnknownReservation` - Never created or already finalized. Callers only
    ///   finalize reservations they hold, so this indicates a bug and is
    ///   logged as an alert.
    #[instrument(skip_all, fields(reservation_id = %reservation_id, ?direction))]
    pub async fn finalize(
        &self,
        reservation_id: ReservationId,
        direction: FinalizeDirection,
    ) -> Result<WalletReservation, WalletError> {
        let owner = self
            .reservation_index
            .read()
            .await
            .get(&reservation_id)
            .copied();

        let Some(user_id) = owner else {
            tracing::error!("finalize of unknown reservation");
            return Err(WalletError::UnknownReservation(reservation_id));
        };

        let account = self.account(user_id).await?;
        let mut guard = account.lock().await;
        let mut index = self.reservation_index.write().await;

        let reservation = match guard.finalize(reservation_id, direction) {
            Ok(reservation) => reservation,
            Err(error) => {
                tracing::error!(%user_id, %error, "reservation finalize failed");
                return Err(error);
            }
        };
        index.remove(&reservation_id);

        tracing::info!(%user_id, amount = reservation.amount.value(), "reservation finalized");
        Ok(reservation)
    }

    /// Unconditionally increases the user's balance
    #[instrument(skip_all, fields(user_id = %user_id, amount = amount.value()))]
    pub async fn credit(
        &self,
        user_id: UserId,
        amount: Tomans,
        reference: impl Into<String>,
    ) -> Result<BalanceSnapshot, WalletError> {
        let account = self.account(user_id).await?;
        let mut guard = account.lock().await;
        guard.credit(amount, Some(reference.into()))?;
        tracing::info!(balance = guard.balance().value(), "wallet credited");
        guard.snapshot()
    }

    /// Looks up a live reservation
    pub async fn reservation(&self, reservation_id: ReservationId) -> Option<WalletReservation> {
        let user_id = self
            .reservation_index
            .read()
            .await
            .get(&reservation_id)
            .copied()?;
        let account = self.account(user_id).await.ok()?;
        let guard = account.lock().await;
        guard.reservation(reservation_id).cloned()
    }

    /// All live reservations of a user
    pub async fn reservations_for(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WalletReservation>, WalletError> {
        let account = self.account(user_id).await?;
        let guard = account.lock().await;
        Ok(guard.reservations().cloned().collect())
    }

    /// The user's journal in application order
    pub async fn journal_for(&self, user_id: UserId) -> Result<Vec<JournalEntry>, WalletError> {
        let account = self.account(user_id).await?;
        let guard = account.lock().await;
        Ok(guard.journal().to_vec())
    }

    async fn account(&self, user_id: UserId) -> Result<AccountHandle, WalletError> {
        self.accounts
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or(WalletError::AccountNotFound(user_id))
    }
}
