//! Request intake
//!
//! Validates inbound deposits and orders, checks the user's tier, snapshots
//! the price and hands a draft to the workflow. Every check runs before
//! `ApprovalWorkflow::open`, so a refused request leaves no record and no
//! reservation behind.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use core_kernel::{bounded, PortError, PriceFeed, Tomans, UserId};
use domain_verification::{GatedAction, VerificationTierEngine};

use crate::address::is_valid_address;
use crate::error::RequestError;
use crate::request::{FinancialRequest, PriceSnapshot, RequestDraft, RequestKind, TOMAN_SYMBOL};
use crate::workflow::ApprovalWorkflow;

/// Decimal places kept on crypto quantities
pub const CRYPTO_SCALE: u32 = 8;

#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Upper bound on a price feed call
    pub price_timeout: Duration,
    /// Smallest order total accepted
    pub min_order_value: Tomans,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            price_timeout: Duration::from_secs(3),
            min_order_value: Tomans::ZERO,
        }
    }
}

/// How much the user wants to buy or sell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum OrderAmount {
    /// A quantity of the coin
    Crypto(Decimal),
    /// A toman budget
    Tomans(Tomans),
}

/// An order as submitted by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub kind: RequestKind,
    pub coin_symbol: String,
    pub amount: OrderAmount,
    pub wallet_address: Option<String>,
}

/// Front door for new deposits and orders
pub struct RequestIntake {
    verification: Arc<VerificationTierEngine>,
    workflow: Arc<ApprovalWorkflow>,
    prices: Arc<dyn PriceFeed>,
    config: IntakeConfig,
}

impl RequestIntake {
    pub fn new(
        verification: Arc<VerificationTierEngine>,
        workflow: Arc<ApprovalWorkflow>,
        prices: Arc<dyn PriceFeed>,
        config: IntakeConfig,
    ) -> Self {
        Self {
            verification,
            workflow,
            prices,
            config,
        }
    }

    /// Opens a buy, sell or trade order at the current price
    ///
    /// # Errors
    ///
    /// * `Validation` - Bad kind, symbol, amount or wallet address
    /// * `PermissionDenied` - The user is below the trading tier
    /// * `PriceUnavailable` - The feed failed or timed out
    /// * `InsufficientFunds` - The wallet cannot cover a buy or trade
    #[instrument(skip_all, fields(user_id = %user_id, kind = %order.kind, symbol = %order.coin_symbol))]
    pub async fn create_order(
        &self,
        user_id: UserId,
        order: OrderRequest,
    ) -> Result<FinancialRequest, RequestError> {
        if !order.kind.is_order() {
            return Err(RequestError::validation("orders must be buy, sell or trade"));
        }
        if !self.verification.permits(user_id, GatedAction::Trade).await {
            tracing::warn!("order refused below trading tier");
            return Err(RequestError::permission_denied(
                "trading requires verification level 2",
            ));
        }

        let symbol = normalize_symbol(&order.coin_symbol)?;
        let wallet_address = match order.wallet_address.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(address) if is_valid_address(&symbol, address) => Some(address.to_string()),
            Some(address) => {
                return Err(RequestError::validation(format!(
                    "invalid {symbol} wallet address: {address}"
                )));
            }
        };

        let quote = bounded(
            "get_price",
            self.config.price_timeout,
            self.prices.get_price(&symbol),
        )
        .await
        .map_err(|source| RequestError::PriceUnavailable {
            symbol: symbol.clone(),
            source,
        })?;
        if quote.price_tmn <= Decimal::ZERO {
            return Err(RequestError::PriceUnavailable {
                symbol,
                source: PortError::validation("quoted price is not positive"),
            });
        }

        let (amount_crypto, total) = price_order(order.amount, quote.price_tmn)?;
        if total < self.config.min_order_value {
            return Err(RequestError::validation(format!(
                "order total {total} is below the minimum of {}",
                self.config.min_order_value
            )));
        }

        let draft = RequestDraft {
            user_id,
            kind: order.kind,
            coin_symbol: symbol,
            amount_tmn: total,
            amount_crypto: Some(amount_crypto),
            pricing: PriceSnapshot::new(quote.price_tmn, total, quote.as_of),
            wallet_address,
        };
        self.workflow.open(draft).await
    }

    /// Opens a toman deposit
    ///
    /// # Errors
    ///
    /// * `PermissionDenied` - The user has not reached level 1
    /// * `Validation` - The amount is zero
    #[instrument(skip_all, fields(user_id = %user_id, amount = amount.value()))]
    pub async fn create_deposit(
        &self,
        user_id: UserId,
        amount: Tomans,
    ) -> Result<FinancialRequest, RequestError> {
        if !self.verification.permits(user_id, GatedAction::Deposit).await {
            tracing::warn!("deposit refused below deposit tier");
            return Err(RequestError::permission_denied(
                "deposits require verification level 1",
            ));
        }
        if !amount.is_positive() {
            return Err(RequestError::validation("deposit amount must be positive"));
        }

        let draft = RequestDraft {
            user_id,
            kind: RequestKind::Deposit,
            coin_symbol: TOMAN_SYMBOL.to_string(),
            amount_tmn: amount,
            amount_crypto: None,
            pricing: PriceSnapshot::new(Decimal::ONE, amount, Utc::now()),
            wallet_address: None,
        };
        self.workflow.open(draft).await
    }
}

/// Upper-cases and checks a coin symbol
pub fn normalize_symbol(symbol: &str) -> Result<String, RequestError> {
    let symbol = symbol.trim().to_ascii_uppercase();
    if !(2..=10).contains(&symbol.len()) || !symbol.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(RequestError::validation(format!("invalid coin symbol: {symbol}")));
    }
    if symbol == TOMAN_SYMBOL {
        return Err(RequestError::validation("TMN cannot be ordered"));
    }
    Ok(symbol)
}

/// Computes the crypto quantity and toman total of an order
pub fn price_order(amount: OrderAmount, price: Decimal) -> Result<(Decimal, Tomans), RequestError> {
    match amount {
        OrderAmount::Crypto(quantity) => {
            if quantity <= Decimal::ZERO {
                return Err(RequestError::validation("order quantity must be positive"));
            }
            let quantity = quantity.round_dp_with_strategy(CRYPTO_SCALE, RoundingStrategy::ToZero);
            let value = price
                .checked_mul(quantity)
                .ok_or_else(|| RequestError::validation("order value is too large"))?;
            let total = Tomans::from_decimal(value)
                .map_err(|e| RequestError::validation(e.to_string()))?;
            if !total.is_positive() {
                return Err(RequestError::validation("order value rounds to zero tomans"));
            }
            Ok((quantity, total))
        }
        OrderAmount::Tomans(total) => {
            if !total.is_positive() {
                return Err(RequestError::validation("order value must be positive"));
            }
            let quantity = total
                .to_decimal()
                .checked_div(price)
                .ok_or_else(|| RequestError::validation("order quantity is out of range"))?
                .round_dp_with_strategy(CRYPTO_SCALE, RoundingStrategy::MidpointNearestEven);
            if quantity <= Decimal::ZERO {
                return Err(RequestError::validation("order quantity rounds to zero"));
            }
            Ok((quantity, total))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" btc ").unwrap(), "BTC");
        assert!(normalize_symbol("B").is_err());
        assert!(normalize_symbol("BTC-USD").is_err());
        assert!(normalize_symbol("tmn").is_err());
        assert!(normalize_symbol("ABCDEFGHIJK").is_err());
    }

    #[test]
    fn test_price_by_quantity() {
        let (quantity, total) =
            price_order(OrderAmount::Crypto(dec!(0.0005)), dec!(2000000000)).unwrap();
        assert_eq!(quantity, dec!(0.0005));
        assert_eq!(total.value(), 1_000_000);
    }

    #[test]
    fn test_price_by_budget() {
        let (quantity, total) = price_order(
            OrderAmount::Tomans(Tomans::new(1_000_000).unwrap()),
            dec!(3000000000),
        )
        .unwrap();
        assert_eq!(quantity, dec!(0.00033333));
        assert_eq!(total.value(), 1_000_000);
    }

    #[test]
    fn test_price_rounds_half_even() {
        let (_, total) = price_order(OrderAmount::Crypto(dec!(0.5)), dec!(5)).unwrap();
        assert_eq!(total.value(), 2);
    }

    #[test]
    fn test_zero_amounts_rejected() {
        assert!(price_order(OrderAmount::Crypto(Decimal::ZERO), dec!(10)).is_err());
        assert!(price_order(OrderAmount::Tomans(Tomans::ZERO), dec!(10)).is_err());
        assert!(price_order(OrderAmount::Crypto(dec!(0.000000001)), dec!(10)).is_err());
    }

    #[test]
    fn test_budget_over_tiny_price_rejected() {
        let budget = OrderAmount::Tomans(Tomans::new(i64::MAX).unwrap());
        let err = price_order(budget, dec!(0.0000000000000000000000001)).unwrap_err();
        assert!(matches!(err, RequestError::Validation(_)));

        let budget = OrderAmount::Tomans(Tomans::new(1_000).unwrap());
        assert!(price_order(budget, Decimal::ZERO).is_err());
    }
}
