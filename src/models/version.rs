//! System version document model.

use serde::{Deserialize, Serialize};

/// The singleton system version record, compared against each user's
/// acknowledged version to drive the client gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemVersion {
    pub version: String,
    /// Free-text "what's new" note shown by the improvements dialog.
    pub improvements: String,
    pub updated_at: String,
}

/// Request body for publishing a new system version.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishVersionRequest {
    pub version: String,
    #[serde(default)]
    pub improvements: String,
}
