//! System version API endpoints.
//!
//! Clients poll GET /api/version and run the gate check on sign-in; the
//! realtime listener of the previous architecture is replaced by polling.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::gate::{self, GateOutcome};
use crate::models::{PublishVersionRequest, SystemVersion};
use crate::AppState;

/// GET /api/version - Current system version, lazily created when absent.
pub async fn get_version(State(state): State<AppState>) -> ApiResult<SystemVersion> {
    let version = state.repo.get_system_version().await?;
    success(version)
}

/// PUT /api/version - Publish a new system version with an improvements note.
pub async fn publish_version(
    State(state): State<AppState>,
    Json(request): Json<PublishVersionRequest>,
) -> ApiResult<SystemVersion> {
    if request.version.trim().is_empty() {
        return Err(AppError::Validation("Version is required".to_string()));
    }

    let version = state
        .repo
        .set_system_version(&request.version, &request.improvements)
        .await?;
    success(version)
}

/// Query parameters for the gate check.
#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub email: String,
}

/// GET /api/version/check - Gate outcome for one user.
pub async fn check_version(
    State(state): State<AppState>,
    Query(params): Query<CheckQuery>,
) -> ApiResult<GateOutcome> {
    let user = state
        .repo
        .get_user_by_email(&params.email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", params.email)))?;

    let system = state.repo.get_system_version().await?;
    success(gate::evaluate(&user.app_version, &system))
}

/// Request body for acknowledging the current version.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeRequest {
    pub email: String,
}

/// POST /api/version/acknowledge - Persist the current system version to the
/// user record after the improvements dialog is dismissed.
pub async fn acknowledge_version(
    State(state): State<AppState>,
    Json(request): Json<AcknowledgeRequest>,
) -> ApiResult<SystemVersion> {
    let system = state.repo.get_system_version().await?;
    state
        .repo
        .set_user_app_version(&request.email, &system.version)
        .await?;
    success(system)
}
