//! Append-only wallet journal
//!
//! Every effect the ledger applies leaves one entry. Replaying a user's
//! journal reproduces the balance: credits add, debits subtract, and
//! reserve/release entries only move the available figure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{JournalEntryId, ReservationId, Tomans, UserId};

/// Kind of ledger effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Credit,
    Reserve,
    Debit,
    Release,
}

impl EntryKind {
    /// Returns true if the entry changed the balance itself
    pub fn moves_balance(&self) -> bool {
        matches!(self, EntryKind::Credit | EntryKind::Debit)
    }
}

/// A single journal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalEntryId,
    pub user_id: UserId,
    pub kind: EntryKind,
    pub amount: Tomans,
    pub reservation_id: Option<ReservationId>,
    /// Free-form reference such as the request that caused a credit
    pub reference: Option<String>,
    /// Balance after the entry was applied
    pub balance_after: Tomans,
    /// Available balance after the entry was applied
    pub available_after: Tomans,
    pub created_at: DateTime<Utc>,
}

/// Sums credits minus debits over a journal
///
/// Returns `None` if the running total ever drops below zero or overflows.
pub fn replay_balance<'a, I>(entries: I) -> Option<i64>
where
    I: IntoIterator<Item = &'a JournalEntry>,
{
    entries.into_iter().try_fold(0i64, |balance, entry| {
        let next = match entry.kind {
            EntryKind::Credit => balance.checked_add(entry.amount.value())?,
            EntryKind::Debit => balance.checked_sub(entry.amount.value())?,
            EntryKind::Reserve | EntryKind::Release => balance,
        };
        (next >= 0).then_some(next)
    })
}
