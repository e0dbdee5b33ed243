//! User handlers

use axum::{body::Bytes, extract::State, http::StatusCode, Json};

use crate::auth::CurrentUser;
use crate::dto::users::*;
use crate::{error::ApiError, AppState};

/// Registers the caller; repeated calls return the existing profile
pub async fn register(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let overview = state.service.register_user(user_id).await?;
    Ok((StatusCode::CREATED, Json(overview.into())))
}

/// The caller's profile and wallet
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserResponse>, ApiError> {
    let overview = state.service.user_overview(user_id).await?;
    Ok(Json(overview.into()))
}

/// Stores the raw request body as a KYC document
pub async fn upload_document(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    body: Bytes,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("document body is empty".into()));
    }
    let size_bytes = body.len();
    let document = state.service.upload_document(user_id, body.to_vec()).await?;
    Ok((StatusCode::CREATED, Json(DocumentResponse { document, size_bytes })))
}
