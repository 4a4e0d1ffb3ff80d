//! Broadcast message API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateMessageRequest, Message};
use crate::AppState;

/// GET /api/messages - List all messages, newest first.
pub async fn list_messages(State(state): State<AppState>) -> ApiResult<Vec<Message>> {
    let messages = state.repo.list_messages().await?;
    success(messages)
}

/// POST /api/messages - Post a new message.
pub async fn create_message(
    State(state): State<AppState>,
    Json(request): Json<CreateMessageRequest>,
) -> ApiResult<Message> {
    if request.body.trim().is_empty() {
        return Err(AppError::Validation("Message body is required".to_string()));
    }
    if request.author_email.trim().is_empty() {
        return Err(AppError::Validation("authorEmail is required".to_string()));
    }

    let message = state.repo.create_message(&request).await?;
    success(message)
}

/// DELETE /api/messages/:id - Delete a message.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_message(&id).await?;
    success(())
}
