//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::{NaiveDate, Utc};
use core_kernel::{DocumentRef, Tomans, UserId};
use domain_requests::{OrderAmount, OrderRequest, PriceSnapshot, RequestDraft, RequestKind};
use domain_verification::{IdentityDetails, SubmissionPayload};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{IdentityFixtures, PriceFixtures};

/// Builder for level 1 identity details
pub struct IdentityBuilder {
    full_name: String,
    national_code: String,
    birth_date: NaiveDate,
    card_number: String,
}

impl Default for IdentityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityBuilder {
    /// Creates a new builder with values that pass validation
    pub fn new() -> Self {
        Self {
            full_name: IdentityFixtures::full_name().to_string(),
            national_code: IdentityFixtures::national_code().to_string(),
            birth_date: IdentityFixtures::adult_birth_date(),
            card_number: IdentityFixtures::card_number().to_string(),
        }
    }

    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = name.into();
        self
    }

    pub fn with_national_code(mut self, code: impl Into<String>) -> Self {
        self.national_code = code.into();
        self
    }

    pub fn with_birth_date(mut self, date: NaiveDate) -> Self {
        self.birth_date = date;
        self
    }

    pub fn with_card_number(mut self, card: impl Into<String>) -> Self {
        self.card_number = card.into();
        self
    }

    pub fn build(self) -> IdentityDetails {
        IdentityDetails {
            full_name: self.full_name,
            national_code: self.national_code,
            birth_date: self.birth_date,
            card_number: self.card_number,
        }
    }

    /// Builds the level 1 submission payload
    pub fn build_payload(self) -> SubmissionPayload {
        SubmissionPayload::Identity(self.build())
    }
}

/// Level 2 payload over the given documents
pub fn documents_payload(documents: Vec<DocumentRef>) -> SubmissionPayload {
    SubmissionPayload::Documents { documents }
}

/// Builder for user orders
pub struct OrderBuilder {
    kind: RequestKind,
    coin_symbol: String,
    amount: OrderAmount,
    wallet_address: Option<String>,
}

impl OrderBuilder {
    /// A buy of 0.0005 BTC, worth 1,000,000 TMN at the fixture price
    pub fn buy() -> Self {
        Self::new(RequestKind::Buy)
    }

    pub fn sell() -> Self {
        Self::new(RequestKind::Sell)
    }

    pub fn trade() -> Self {
        Self::new(RequestKind::Trade)
    }

    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            coin_symbol: "BTC".to_string(),
            amount: OrderAmount::Crypto(dec!(0.0005)),
            wallet_address: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.coin_symbol = symbol.into();
        self
    }

    /// Orders a quantity of the coin
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.amount = OrderAmount::Crypto(quantity);
        self
    }

    /// Orders by toman budget
    pub fn with_budget(mut self, budget: Tomans) -> Self {
        self.amount = OrderAmount::Tomans(budget);
        self
    }

    pub fn with_wallet_address(mut self, address: impl Into<String>) -> Self {
        self.wallet_address = Some(address.into());
        self
    }

    pub fn build(self) -> OrderRequest {
        OrderRequest {
            kind: self.kind,
            coin_symbol: self.coin_symbol,
            amount: self.amount,
            wallet_address: self.wallet_address,
        }
    }
}

/// Builder for drafts handed straight to the workflow
pub struct DraftBuilder {
    user_id: UserId,
    kind: RequestKind,
    total: Tomans,
    wallet_address: Option<String>,
}

impl DraftBuilder {
    pub fn new(user_id: UserId, kind: RequestKind, total: Tomans) -> Self {
        Self {
            user_id,
            kind,
            total,
            wallet_address: None,
        }
    }

    pub fn with_wallet_address(mut self, address: impl Into<String>) -> Self {
        self.wallet_address = Some(address.into());
        self
    }

    /// Builds a BTC draft priced at the fixture quote
    pub fn build(self) -> RequestDraft {
        let price = PriceFixtures::btc();
        let (coin_symbol, amount_crypto, price) = if self.kind == RequestKind::Deposit {
            ("TMN".to_string(), None, Decimal::ONE)
        } else {
            ("BTC".to_string(), Some(self.total.to_decimal() / price), price)
        };
        RequestDraft {
            user_id: self.user_id,
            kind: self.kind,
            coin_symbol,
            amount_tmn: self.total,
            amount_crypto,
            pricing: PriceSnapshot::new(price, self.total, Utc::now()),
            wallet_address: self.wallet_address,
        }
    }
}
