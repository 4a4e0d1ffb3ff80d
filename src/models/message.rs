//! Broadcast message ("recado") model.

use serde::{Deserialize, Serialize};

/// A free-form broadcast message visible to the whole unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub author_email: String,
    pub body: String,
    pub created_at: String,
}

/// Request body for posting a message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub author_email: String,
    pub body: String,
}
