//! Convocation (call-up period) models.

use serde::{Deserialize, Serialize};

/// A scheduled call-up period users must respond to once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Convocation {
    pub id: String,
    /// Display period, e.g. "08/2026".
    pub month_year: String,
    pub starts_on: String,
    pub ends_on: String,
    pub deadline: String,
    pub active: bool,
    pub created_at: String,
}

/// Request body for creating a convocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConvocationRequest {
    pub month_year: String,
    pub starts_on: String,
    pub ends_on: String,
    pub deadline: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// A user's response to a convocation. Unique per (convocation, user).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvocationResponse {
    pub id: String,
    pub convocation_id: String,
    pub user_email: String,
    /// "volunteer" or "decline".
    pub response: String,
    pub responded_at: String,
}

/// Request body for responding to a convocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub user_email: String,
    pub response: String,
}
