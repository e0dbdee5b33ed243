//! Verification handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::SubmissionId;

use crate::auth::{AdminPrincipal, CurrentUser};
use crate::dto::verification::*;
use crate::dto::ResolveRequest;
use crate::{error::ApiError, AppState};

/// Submits the caller's next verification level
pub async fn submit(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<SubmitVerificationRequest>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    request.validate()?;
    let (target_level, payload) = request.into_payload()?;
    let submission = state
        .service
        .submit_verification(user_id, target_level, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// Lists the caller's submissions
pub async fn list_mine(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Json<Vec<SubmissionResponse>> {
    let submissions = state.service.submissions_for(user_id).await;
    Json(submissions.into_iter().map(Into::into).collect())
}

/// Pending submissions, oldest first
pub async fn admin_pending(
    State(state): State<AppState>,
    AdminPrincipal(_admin): AdminPrincipal,
) -> Json<Vec<SubmissionResponse>> {
    let submissions = state.service.pending_submissions().await;
    Json(submissions.into_iter().map(Into::into).collect())
}

/// Approves or rejects a submission
pub async fn admin_resolve(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    Path(id): Path<SubmissionId>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    request.validate()?;
    let submission = state
        .service
        .resolve_submission(id, request.decision, request.note, &admin)
        .await?;
    Ok(Json(submission.into()))
}
