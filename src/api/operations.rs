//! Operation API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateOperationRequest, Operation, UpdateOperationRequest};
use crate::AppState;

/// GET /api/operations - List all operations.
pub async fn list_operations(State(state): State<AppState>) -> ApiResult<Vec<Operation>> {
    let operations = state.repo.list_operations().await?;
    success(operations)
}

/// POST /api/operations - Create an operation. Duplicate names are rejected.
pub async fn create_operation(
    State(state): State<AppState>,
    Json(request): Json<CreateOperationRequest>,
) -> ApiResult<Operation> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Operation name is required".to_string(),
        ));
    }

    let operation = state.repo.create_operation(&request).await?;
    success(operation)
}

/// PUT /api/operations/:id - Rename or toggle an operation.
pub async fn update_operation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateOperationRequest>,
) -> ApiResult<Operation> {
    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "Operation name cannot be empty".to_string(),
            ));
        }
    }

    let operation = state.repo.update_operation(&id, &request).await?;
    success(operation)
}

/// DELETE /api/operations/:id - Delete an operation.
pub async fn delete_operation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_operation(&id).await?;
    success(())
}
