//! Time slot API endpoints for the weekly calendar.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{BookSlotRequest, CreateSlotRequest, TimeSlot};
use crate::AppState;

/// Query parameters for listing slots by date range.
#[derive(Debug, Deserialize)]
pub struct ListSlotsQuery {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

/// GET /api/slots - List slots, optionally bounded by date (inclusive).
pub async fn list_slots(
    State(state): State<AppState>,
    Query(params): Query<ListSlotsQuery>,
) -> ApiResult<Vec<TimeSlot>> {
    let slots = state
        .repo
        .list_slots(params.from.as_deref(), params.to.as_deref())
        .await?;
    success(slots)
}

/// POST /api/slots - Create a new time slot.
pub async fn create_slot(
    State(state): State<AppState>,
    Json(request): Json<CreateSlotRequest>,
) -> ApiResult<TimeSlot> {
    if request.slot_date.trim().is_empty() {
        return Err(AppError::Validation("slotDate is required".to_string()));
    }
    if request.total_slots <= 0 {
        return Err(AppError::Validation(
            "totalSlots must be positive".to_string(),
        ));
    }

    let slot = state.repo.create_slot(&request).await?;
    success(slot)
}

/// DELETE /api/slots/:id - Delete a time slot.
pub async fn delete_slot(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_slot(&id).await?;
    success(())
}

/// POST /api/slots/:id/book - Book one place. A full slot is a conflict.
pub async fn book_slot(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<BookSlotRequest>,
) -> ApiResult<TimeSlot> {
    let slot = state
        .repo
        .book_slot(&id, request.user_type.as_deref())
        .await?;
    success(slot)
}

/// POST /api/slots/:id/cancel - Release one booked place.
pub async fn cancel_slot(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<TimeSlot> {
    let slot = state.repo.cancel_slot_booking(&id).await?;
    success(slot)
}
