//! Financial requests
//!
//! Deposits and orders share one record shape. The pricing snapshot is taken
//! once at intake and is read-only from then on; admins approve the price the
//! user saw, not whatever the feed says at review time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ApprovalStatus, RequestId, ReservationId, Tomans, UserId};

use crate::error::RequestError;

/// Symbol used for toman deposits
pub const TOMAN_SYMBOL: &str = "TMN";

/// Kind of financial request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Deposit,
    Buy,
    Sell,
    Trade,
}

impl RequestKind {
    /// Kinds whose total is held in the wallet while pending
    pub fn is_reserve_backed(&self) -> bool {
        matches!(self, RequestKind::Buy | RequestKind::Trade)
    }

    pub fn is_order(&self) -> bool {
        !matches!(self, RequestKind::Deposit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Deposit => "deposit",
            RequestKind::Buy => "buy",
            RequestKind::Sell => "sell",
            RequestKind::Trade => "trade",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deposit" => Ok(RequestKind::Deposit),
            "buy" => Ok(RequestKind::Buy),
            "sell" => Ok(RequestKind::Sell),
            "trade" => Ok(RequestKind::Trade),
            other => Err(RequestError::validation(format!("unknown request kind: {other}"))),
        }
    }
}

/// Price and total frozen at request time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    price_at_request: Decimal,
    total_value_tmn: Tomans,
    quoted_at: DateTime<Utc>,
}

impl PriceSnapshot {
    pub fn new(price_at_request: Decimal, total_value_tmn: Tomans, quoted_at: DateTime<Utc>) -> Self {
        Self {
            price_at_request,
            total_value_tmn,
            quoted_at,
        }
    }

    /// Toman price per unit at intake
    pub fn price_at_request(&self) -> Decimal {
        self.price_at_request
    }

    pub fn total_value_tmn(&self) -> Tomans {
        self.total_value_tmn
    }

    pub fn quoted_at(&self) -> DateTime<Utc> {
        self.quoted_at
    }
}

/// A validated request ready to be opened
#[derive(Debug, Clone)]
pub struct RequestDraft {
    pub user_id: UserId,
    pub kind: RequestKind,
    pub coin_symbol: String,
    pub amount_tmn: Tomans,
    pub amount_crypto: Option<Decimal>,
    pub pricing: PriceSnapshot,
    pub wallet_address: Option<String>,
}

/// A deposit or order and its review state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialRequest {
    pub id: RequestId,
    pub user_id: UserId,
    pub kind: RequestKind,
    pub coin_symbol: String,
    /// Toman amount of the request (the order total for orders)
    pub amount_tmn: Tomans,
    pub amount_crypto: Option<Decimal>,
    pricing: PriceSnapshot,
    pub status: ApprovalStatus,
    pub admin_note: Option<String>,
    /// Destination for the owed crypto transfer
    pub wallet_address: Option<String>,
    pub reservation_id: Option<ReservationId>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
}

impl FinancialRequest {
    pub(crate) fn from_draft(id: RequestId, draft: RequestDraft) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            kind: draft.kind,
            coin_symbol: draft.coin_symbol,
            amount_tmn: draft.amount_tmn,
            amount_crypto: draft.amount_crypto,
            pricing: draft.pricing,
            status: ApprovalStatus::Pending,
            admin_note: None,
            wallet_address: draft.wallet_address,
            reservation_id: None,
            created_at: Utc::now(),
            resolved_at: None,
            completed_at: None,
            resolved_by: None,
        }
    }

    pub fn pricing(&self) -> &PriceSnapshot {
        &self.pricing
    }

    pub fn total_value_tmn(&self) -> Tomans {
        self.pricing.total_value_tmn
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Status an approval lands in
    ///
    /// Purchases with a destination address still owe an off-system transfer,
    /// so they stop at approved until an admin marks them completed.
    pub fn approved_status(&self) -> ApprovalStatus {
        if self.kind.is_reserve_backed() && self.wallet_address.is_some() {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Completed
        }
    }
}
