//! Convocation API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{Convocation, ConvocationResponse, CreateConvocationRequest, RespondRequest};
use crate::AppState;

/// GET /api/convocations - List all convocations.
pub async fn list_convocations(State(state): State<AppState>) -> ApiResult<Vec<Convocation>> {
    let convocations = state.repo.list_convocations().await?;
    success(convocations)
}

/// POST /api/convocations - Create a new convocation.
pub async fn create_convocation(
    State(state): State<AppState>,
    Json(request): Json<CreateConvocationRequest>,
) -> ApiResult<Convocation> {
    if request.month_year.trim().is_empty() {
        return Err(AppError::Validation("monthYear is required".to_string()));
    }
    if request.deadline.trim().is_empty() {
        return Err(AppError::Validation("Deadline is required".to_string()));
    }

    let convocation = state.repo.create_convocation(&request).await?;
    success(convocation)
}

/// DELETE /api/convocations/:id - Delete a convocation.
pub async fn delete_convocation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_convocation(&id).await?;
    success(())
}

/// POST /api/convocations/:id/respond - Record a user's response.
///
/// A second response from the same user is a conflict.
pub async fn respond_convocation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RespondRequest>,
) -> ApiResult<ConvocationResponse> {
    if request.user_email.trim().is_empty() {
        return Err(AppError::Validation("userEmail is required".to_string()));
    }
    if !matches!(request.response.as_str(), "volunteer" | "decline") {
        return Err(AppError::Validation(
            "Response must be volunteer or decline".to_string(),
        ));
    }

    let response = state
        .repo
        .insert_response(&id, &request.user_email, &request.response)
        .await?;
    success(response)
}

/// Query parameters for the pending check.
#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub email: String,
}

/// GET /api/convocations/pending - First active convocation the user has not
/// responded to, or null.
pub async fn pending_convocation(
    State(state): State<AppState>,
    Query(params): Query<PendingQuery>,
) -> ApiResult<Option<Convocation>> {
    let pending = state.repo.find_pending_convocation(&params.email).await?;
    success(pending)
}
