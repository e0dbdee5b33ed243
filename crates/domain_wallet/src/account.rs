//! Wallet account state
//!
//! `WalletAccount` is plain data plus the balance rules. It does no locking;
//! [`crate::WalletLedger`] owns each account behind its own mutex and is the
//! only caller of the mutating methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{JournalEntryId, RequestId, ReservationId, Tomans, UserId};

use crate::error::WalletError;
use crate::journal::{EntryKind, JournalEntry};
use crate::reservation::{FinalizeDirection, WalletReservation};

/// Point-in-time view of an account's figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub user_id: UserId,
    pub balance: Tomans,
    pub reserved: Tomans,
    pub available: Tomans,
}

/// A user's toman wallet
///
/// # Invariants
///
/// - `balance >= sum(reservations)`, so the available figure is never negative
/// - The balance only changes through a credit or a debit, each journaled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAccount {
    pub user_id: UserId,
    balance: Tomans,
    reservations: BTreeMap<ReservationId, WalletReservation>,
    journal: Vec<JournalEntry>,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WalletAccount {
    /// Opens an empty account
    pub fn open(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            balance: Tomans::ZERO,
            reservations: BTreeMap::new(),
            journal: Vec::new(),
            opened_at: now,
            updated_at: now,
        }
    }

    pub fn balance(&self) -> Tomans {
        self.balance
    }

    /// Sum of all active reservations
    pub fn reserved(&self) -> Result<Tomans, WalletError> {
        Ok(Tomans::checked_sum(self.reservations.values().map(|r| r.amount))?)
    }

    /// Balance minus active reservations
    pub fn available(&self) -> Result<Tomans, WalletError> {
        Ok(self.balance.checked_sub(self.reserved()?)?)
    }

    pub fn snapshot(&self) -> Result<BalanceSnapshot, WalletError> {
        let reserved = self.reserved()?;
        Ok(BalanceSnapshot {
            user_id: self.user_id,
            balance: self.balance,
            reserved,
            available: self.balance.checked_sub(reserved)?,
        })
    }

    pub fn reservation(&self, id: ReservationId) -> Option<&WalletReservation> {
        self.reservations.get(&id)
    }

    pub fn reservations(&self) -> impl Iterator<Item = &WalletReservation> {
        self.reservations.values()
    }

    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    /// Places a hold if the available balance covers it
    pub fn reserve(
        &mut self,
        amount: Tomans,
        request_id: Option<RequestId>,
    ) -> Result<WalletReservation, WalletError> {
        require_positive(amount)?;
        let available = self.available()?;
        if amount > available {
            return Err(WalletError::InsufficientFunds {
                user_id: self.user_id,
                requested: amount,
                available,
            });
        }

        let reservation = WalletReservation::new(self.user_id, amount, request_id);
        self.reservations.insert(reservation.id, reservation.clone());
        self.record(EntryKind::Reserve, amount, Some(reservation.id), None)?;
        Ok(reservation)
    }

    /// Settles a hold, removing it from the account
    ///
    /// A reservation can be finalized once; a second attempt fails with
    /// `UnknownReservation` and leaves the balance alone.
    pub fn finalize(
        &mut self,
        id: ReservationId,
        direction: FinalizeDirection,
    ) -> Result<WalletReservation, WalletError> {
        let amount = self
            .reservations
            .get(&id)
            .map(|r| r.amount)
            .ok_or(WalletError::UnknownReservation(id))?;

        let kind = match direction {
            FinalizeDirection::Debit => {
                self.balance = self.balance.checked_sub(amount)?;
                EntryKind::Debit
            }
            FinalizeDirection::Release => EntryKind::Release,
        };

        let reservation = self
            .reservations
            .remove(&id)
            .ok_or(WalletError::UnknownReservation(id))?;
        self.record(kind, amount, Some(id), None)?;
        Ok(reservation)
    }

    /// Increases the balance
    pub fn credit(&mut self, amount: Tomans, reference: Option<String>) -> Result<(), WalletError> {
        require_positive(amount)?;
        self.balance = self.balance.checked_add(amount)?;
        self.record(EntryKind::Credit, amount, None, reference)?;
        Ok(())
    }

    fn record(
        &mut self,
        kind: EntryKind,
        amount: Tomans,
        reservation_id: Option<ReservationId>,
        reference: Option<String>,
    ) -> Result<(), WalletError> {
        let now = Utc::now();
        let available_after = self.available()?;
        self.journal.push(JournalEntry {
            id: JournalEntryId::new_v7(),
            user_id: self.user_id,
            kind,
            amount,
            reservation_id,
            reference,
            balance_after: self.balance,
            available_after,
            created_at: now,
        });
        self.updated_at = now;
        Ok(())
    }
}

fn require_positive(amount: Tomans) -> Result<(), WalletError> {
    if !amount.is_positive() {
        return Err(WalletError::InvalidAmount(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(())
}
