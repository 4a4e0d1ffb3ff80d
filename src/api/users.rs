//! User API endpoints, including the one-shot bulk migration tool.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::auth::hash_password;
use crate::errors::AppError;
use crate::models::{
    MigrateUserRecord, MigrateUsersRequest, MigrationError, MigrationReport, UpdateUserRequest,
    User,
};
use crate::AppState;

/// GET /api/users - List all users.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.repo.list_users().await?;
    success(users)
}

/// GET /api/users/:id - Get a single user.
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    match state.repo.get_user(&id).await? {
        Some(user) => success(user),
        None => Err(AppError::NotFound(format!("User {} not found", id))),
    }
}

/// PUT /api/users/:id - Update profile fields (name, type, block flag).
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    if let Some(name) = &request.display_name {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "Display name cannot be empty".to_string(),
            ));
        }
    }

    let user = state.repo.update_user(&id, &request).await?;
    success(user)
}

/// POST /api/admin/users/migrate - Bulk-create accounts from another system.
///
/// Each record is handled independently; failures are collected per record
/// and the run continues.
pub async fn migrate_users(
    State(state): State<AppState>,
    Json(request): Json<MigrateUsersRequest>,
) -> ApiResult<MigrationReport> {
    if request.users.is_empty() {
        return Err(AppError::Validation("No user records provided".to_string()));
    }

    let mut report = MigrationReport::default();
    for record in &request.users {
        match migrate_one(&state, record).await {
            Ok(()) => report.migrated += 1,
            Err(e) => {
                tracing::warn!("Migration failed for {}: {}", record.email, e);
                report.failed += 1;
                report.errors.push(MigrationError {
                    email: record.email.clone(),
                    reason: e.message(),
                });
            }
        }
    }

    tracing::info!(
        "User migration finished: {} migrated, {} failed",
        report.migrated,
        report.failed
    );
    success(report)
}

async fn migrate_one(state: &AppState, record: &MigrateUserRecord) -> Result<(), AppError> {
    if record.email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if record.password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }
    if record.display_name.trim().is_empty() {
        return Err(AppError::Validation("Display name is required".to_string()));
    }

    let password_hash = hash_password(&record.password)?;
    state
        .repo
        .insert_migrated_user(
            &record.email,
            &record.display_name,
            &record.user_type,
            &password_hash,
        )
        .await?;
    Ok(())
}
