//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_requests::RequestError;
use domain_verification::VerificationError;
use domain_wallet::WalletError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Another actor already moved the record on
    #[error("Already processed: {0}")]
    AlreadyProcessed(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::InsufficientFunds(msg) => (StatusCode::CONFLICT, "insufficient_funds", msg.clone()),
            ApiError::AlreadyProcessed(msg) => (StatusCode::CONFLICT, "already_processed", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone()),
            ApiError::UpstreamTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout", msg.clone()),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal server error".to_string())
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Validation { .. } => ApiError::Validation(err.to_string()),
            PortError::Timeout { .. } => ApiError::UpstreamTimeout(err.to_string()),
            PortError::ServiceUnavailable { .. } => ApiError::Unavailable(err.to_string()),
            PortError::Internal { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Validation(msg) => ApiError::Validation(msg),
            RequestError::PermissionDenied(msg) | RequestError::NotAuthorized(msg) => {
                ApiError::Forbidden(msg)
            }
            RequestError::InsufficientFunds { .. } => ApiError::InsufficientFunds(err.to_string()),
            RequestError::AlreadyResolved { .. } | RequestError::NotPending { .. } => {
                ApiError::AlreadyProcessed(err.to_string())
            }
            RequestError::NotFound(_) => ApiError::NotFound(err.to_string()),
            RequestError::PriceUnavailable { ref source, .. } => match source {
                PortError::Timeout { .. } => ApiError::UpstreamTimeout(err.to_string()),
                PortError::NotFound { .. } => ApiError::Validation(err.to_string()),
                _ => ApiError::Unavailable(err.to_string()),
            },
            RequestError::Ledger(_) | RequestError::TaskAborted(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<VerificationError> for ApiError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::Validation(msg) => ApiError::Validation(msg),
            VerificationError::InvalidLevelSequence { .. } => ApiError::Validation(err.to_string()),
            VerificationError::AlreadyPending { .. } | VerificationError::NotPending { .. } => {
                ApiError::AlreadyProcessed(err.to_string())
            }
            VerificationError::NotAuthorized(msg) => ApiError::Forbidden(msg),
            VerificationError::UserNotFound(_) | VerificationError::SubmissionNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            VerificationError::DocumentStore(source) => source.into(),
        }
    }
}

impl From<WalletError> for ApiError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::AccountNotFound(_) => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}
