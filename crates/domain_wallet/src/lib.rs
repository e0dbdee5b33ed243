//! Wallet Domain - Toman Balances and Reservations
//!
//! This crate owns every user's toman balance. Nothing else in the back
//! office mutates a balance; the approval workflow goes through the
//! [`WalletLedger`] for each effect.
//!
//! # Reservation model
//!
//! A pending purchase must not spend money the user no longer has, so the
//! ledger distinguishes three figures:
//! - **balance**: tomans owned by the user
//! - **reserved**: sum of holds backing pending requests
//! - **available**: balance minus reserved, never negative
//!
//! A hold is settled exactly once, either as a debit (the purchase went
//! through) or a release (it was rejected or cancelled).
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_wallet::{WalletLedger, FinalizeDirection};
//!
//! let ledger = WalletLedger::new();
//! ledger.open_account(user_id).await;
//! ledger.credit(user_id, Tomans::new(2_000_000)?, "deposit").await?;
//!
//! let hold = ledger.reserve(user_id, Tomans::new(1_000_000)?, Some(request_id)).await?;
//! ledger.finalize(hold, FinalizeDirection::Debit).await?;
//! ```

pub mod account;
pub mod reservation;
pub mod journal;
pub mod ledger;
pub mod error;

pub use account::{BalanceSnapshot, WalletAccount};
pub use reservation::{FinalizeDirection, WalletReservation};
pub use journal::{EntryKind, JournalEntry, replay_balance};
pub use ledger::WalletLedger;
pub use error::WalletError;
