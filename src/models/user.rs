//! User account model.

use serde::{Deserialize, Serialize};

/// Sentinel version assigned to accounts that have never acknowledged
/// a system version.
pub const INITIAL_USER_VERSION: &str = "0.0.0";

/// A user account. The password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub user_type: String,
    pub blocked: bool,
    /// Last system version this user acknowledged.
    pub app_version: String,
    pub created_at: String,
}

/// Request body for updating an existing user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub blocked: Option<bool>,
}

/// Request body for the bulk user-migration endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateUsersRequest {
    pub users: Vec<MigrateUserRecord>,
}

/// A single account record to migrate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateUserRecord {
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(default = "default_user_type")]
    pub user_type: String,
}

fn default_user_type() -> String {
    "standard".to_string()
}

/// Outcome of a bulk migration run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub migrated: usize,
    pub failed: usize,
    pub errors: Vec<MigrationError>,
}

/// Per-record failure detail for a migration run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationError {
    pub email: String,
    pub reason: String,
}
