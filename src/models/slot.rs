//! Time slot model for the weekly scheduling calendar.

use serde::{Deserialize, Serialize};

/// A bookable time slot with capacity counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    pub slot_date: String,
    pub starts_at: String,
    pub ends_at: String,
    pub total_slots: i64,
    pub used_slots: i64,
    /// When present, only these user types may book the slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_user_types: Option<Vec<String>>,
    pub created_at: String,
}

/// Request body for creating a time slot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotRequest {
    pub slot_date: String,
    pub starts_at: String,
    pub ends_at: String,
    pub total_slots: i64,
    #[serde(default)]
    pub allowed_user_types: Option<Vec<String>>,
}

/// Request body for booking a slot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSlotRequest {
    #[serde(default)]
    pub user_type: Option<String>,
}
