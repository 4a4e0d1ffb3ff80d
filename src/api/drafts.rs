//! Form draft API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::Draft;
use crate::AppState;

/// GET /api/drafts/:owner - Load the owner's draft, or null if absent.
pub async fn get_draft(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> ApiResult<Option<Draft>> {
    let draft = state.repo.get_draft(&owner).await?;
    success(draft)
}

/// PUT /api/drafts/:owner - Merge a partial update into the stored draft.
pub async fn save_draft(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Json(partial): Json<serde_json::Value>,
) -> ApiResult<Draft> {
    if owner.trim().is_empty() {
        return Err(AppError::Validation("Draft owner is required".to_string()));
    }

    let draft = state.repo.save_draft(&owner, &partial).await?;
    success(draft)
}

/// DELETE /api/drafts/:owner - Clear the owner's draft.
pub async fn clear_draft(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> ApiResult<()> {
    state.repo.clear_draft(&owner).await?;
    success(())
}
