//! Deposit and order handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::RequestId;

use crate::auth::{AdminPrincipal, CurrentUser};
use crate::dto::requests::*;
use crate::dto::ResolveRequest;
use crate::{error::ApiError, AppState};

/// Opens a toman deposit request
pub async fn create_deposit(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<CreateDepositRequest>,
) -> Result<(StatusCode, Json<FinancialRequestResponse>), ApiError> {
    request.validate()?;
    let created = state
        .service
        .create_deposit(user_id, request.amount()?)
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Opens a buy, sell or trade order at the current price
pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<FinancialRequestResponse>), ApiError> {
    request.validate()?;
    let created = state
        .service
        .create_order(user_id, request.into_order()?)
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Lists the caller's requests, newest first
pub async fn list_mine(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Json<Vec<FinancialRequestResponse>> {
    let requests = state.service.requests_for(user_id).await;
    Json(requests.into_iter().map(Into::into).collect())
}

/// Withdraws one of the caller's pending requests
pub async fn cancel(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<RequestId>,
) -> Result<Json<FinancialRequestResponse>, ApiError> {
    let cancelled = state.service.cancel_request(user_id, id).await?;
    Ok(Json(cancelled.into()))
}

/// Pending requests, optionally narrowed to one kind
pub async fn admin_pending(
    State(state): State<AppState>,
    AdminPrincipal(_admin): AdminPrincipal,
    Query(query): Query<PendingQuery>,
) -> Json<Vec<FinancialRequestResponse>> {
    let requests = state.service.pending_requests(query.kind).await;
    Json(requests.into_iter().map(Into::into).collect())
}

/// Approves or rejects a pending request
pub async fn admin_resolve(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    Path(id): Path<RequestId>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<FinancialRequestResponse>, ApiError> {
    request.validate()?;
    let resolved = state
        .service
        .resolve_request(id, request.decision, request.note, &admin)
        .await?;
    Ok(Json(resolved.into()))
}

/// Marks an approved purchase as delivered
pub async fn admin_complete(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    Path(id): Path<RequestId>,
    Json(request): Json<CompleteRequest>,
) -> Result<Json<FinancialRequestResponse>, ApiError> {
    request.validate()?;
    let completed = state
        .service
        .complete_request(id, request.note, &admin)
        .await?;
    Ok(Json(completed.into()))
}
