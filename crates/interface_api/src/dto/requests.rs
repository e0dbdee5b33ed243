//! Financial request DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ApprovalStatus, RequestId, Tomans, UserId};
use domain_requests::{FinancialRequest, OrderAmount, OrderRequest, RequestKind};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDepositRequest {
    #[validate(range(min = 1))]
    pub amount_tmn: i64,
}

impl CreateDepositRequest {
    pub fn amount(&self) -> Result<Tomans, ApiError> {
        Tomans::positive(self.amount_tmn).map_err(|e| ApiError::Validation(e.to_string()))
    }
}

/// An order carries exactly one of `quantity` or `amount_tmn`
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub kind: RequestKind,
    #[validate(length(min = 2, max = 10))]
    pub coin_symbol: String,
    pub quantity: Option<Decimal>,
    #[validate(range(min = 1))]
    pub amount_tmn: Option<i64>,
    #[validate(length(max = 128))]
    pub wallet_address: Option<String>,
}

impl CreateOrderRequest {
    pub fn into_order(self) -> Result<OrderRequest, ApiError> {
        let amount = match (self.quantity, self.amount_tmn) {
            (Some(quantity), None) => OrderAmount::Crypto(quantity),
            (None, Some(tomans)) => OrderAmount::Tomans(
                Tomans::positive(tomans).map_err(|e| ApiError::Validation(e.to_string()))?,
            ),
            _ => {
                return Err(ApiError::Validation(
                    "exactly one of quantity or amount_tmn is required".into(),
                ))
            }
        };
        Ok(OrderRequest {
            kind: self.kind,
            coin_symbol: self.coin_symbol,
            amount,
            wallet_address: self.wallet_address,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PendingQuery {
    pub kind: Option<RequestKind>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CompleteRequest {
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FinancialRequestResponse {
    pub id: RequestId,
    pub user_id: UserId,
    pub kind: RequestKind,
    pub coin_symbol: String,
    pub amount_tmn: Tomans,
    pub amount_crypto: Option<Decimal>,
    pub price_at_request: Decimal,
    pub total_value_tmn: Tomans,
    pub status: ApprovalStatus,
    pub admin_note: Option<String>,
    pub wallet_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
}

impl From<FinancialRequest> for FinancialRequestResponse {
    fn from(request: FinancialRequest) -> Self {
        let pricing = request.pricing();
        Self {
            price_at_request: pricing.price_at_request(),
            total_value_tmn: pricing.total_value_tmn(),
            id: request.id,
            user_id: request.user_id,
            kind: request.kind,
            coin_symbol: request.coin_symbol,
            amount_tmn: request.amount_tmn,
            amount_crypto: request.amount_crypto,
            status: request.status,
            admin_note: request.admin_note,
            wallet_address: request.wallet_address,
            created_at: request.created_at,
            resolved_at: request.resolved_at,
            completed_at: request.completed_at,
            resolved_by: request.resolved_by,
        }
    }
}
