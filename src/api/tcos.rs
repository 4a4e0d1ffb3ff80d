//! TCO API endpoints, including the duplicate-number check.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{normalize_tco_number, CreateTcoRequest, Tco};
use crate::AppState;

/// Query parameters for listing TCOs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTcosQuery {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub created_by: Option<String>,
}

/// GET /api/tcos - List TCOs, optionally filtered by year and creator.
pub async fn list_tcos(
    State(state): State<AppState>,
    Query(params): Query<ListTcosQuery>,
) -> ApiResult<Vec<Tco>> {
    let tcos = state
        .repo
        .list_tcos(params.year, params.created_by.as_deref())
        .await?;
    success(tcos)
}

/// GET /api/tcos/:id - Get a single TCO.
pub async fn get_tco(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Tco> {
    match state.repo.get_tco(&id).await? {
        Some(tco) => success(tco),
        None => Err(AppError::NotFound(format!("TCO {} not found", id))),
    }
}

/// POST /api/tcos - Register a new TCO.
///
/// Duplicates are not rejected here: the duplicate check is advisory and the
/// client decides whether to proceed.
pub async fn create_tco(
    State(state): State<AppState>,
    Json(request): Json<CreateTcoRequest>,
) -> ApiResult<Tco> {
    if request.tco_number.trim().is_empty() {
        return Err(AppError::Validation("TCO number is required".to_string()));
    }
    if request.natureza.trim().is_empty() {
        return Err(AppError::Validation("Natureza is required".to_string()));
    }
    if request.created_by.trim().is_empty() {
        return Err(AppError::Validation("createdBy is required".to_string()));
    }

    let tco = state.repo.create_tco(&request).await?;
    success(tco)
}

/// DELETE /api/tcos/:id - Delete a TCO.
pub async fn delete_tco(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_tco(&id).await?;
    success(())
}

/// Query parameters for the duplicate check.
#[derive(Debug, Deserialize)]
pub struct DuplicateQuery {
    /// Raw user-entered TCO number.
    pub number: String,
}

/// Result of a duplicate-number check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheck {
    pub duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing: Option<Tco>,
}

/// GET /api/tcos/check-duplicate - Check a number against same-year records.
///
/// An empty normalized number short-circuits to "no duplicate" without
/// querying. A failed lookup is logged and also reported as "no duplicate":
/// the check must not block submission when the database is unavailable.
pub async fn check_duplicate(
    State(state): State<AppState>,
    Query(params): Query<DuplicateQuery>,
) -> ApiResult<DuplicateCheck> {
    let normalized = normalize_tco_number(&params.number);
    if normalized.is_empty() {
        return success(DuplicateCheck {
            duplicate: false,
            existing: None,
        });
    }

    let year = Utc::now().year();
    match state.repo.find_duplicate_tco(&normalized, year).await {
        Ok(existing) => success(DuplicateCheck {
            duplicate: existing.is_some(),
            existing,
        }),
        Err(e) => {
            tracing::warn!("Duplicate lookup failed, reporting no duplicate: {}", e);
            success(DuplicateCheck {
                duplicate: false,
                existing: None,
            })
        }
    }
}
