//! In-progress TCO form draft, persisted server-side per owner.
//!
//! The draft shape carries no schema version: saves shallow-merge a partial
//! object into whatever is stored, so old drafts and new form layouts coexist
//! field by field.

use serde::{Deserialize, Serialize};

/// A stored form draft. One draft per owner; saves overwrite wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub owner_email: String,
    pub payload: serde_json::Value,
    pub updated_at: String,
}

/// Shallow-merge a partial update into a stored draft payload.
///
/// Top-level keys of `partial` win over `base`; keys absent from `partial`
/// pass through untouched. If either side is not a JSON object the partial
/// replaces the base wholesale.
pub fn merge_draft(base: serde_json::Value, partial: &serde_json::Value) -> serde_json::Value {
    match (base, partial) {
        (serde_json::Value::Object(mut merged), serde_json::Value::Object(patch)) => {
            for (key, value) in patch {
                merged.insert(key.clone(), value.clone());
            }
            serde_json::Value::Object(merged)
        }
        (_, partial) => partial.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_accumulates_sequential_partials() {
        let first = merge_draft(json!({}), &json!({"a": 1}));
        let second = merge_draft(first, &json!({"b": 2}));
        assert_eq!(second, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_merge_last_write_wins_per_key() {
        let merged = merge_draft(json!({"a": 1, "b": 2}), &json!({"a": 9}));
        assert_eq!(merged, json!({"a": 9, "b": 2}));
    }

    #[test]
    fn test_merge_preserves_unknown_fields() {
        let merged = merge_draft(json!({"legacyField": "kept"}), &json!({"autor": "Fulano"}));
        assert_eq!(merged, json!({"legacyField": "kept", "autor": "Fulano"}));
    }

    #[test]
    fn test_merge_replaces_non_object_base() {
        let merged = merge_draft(json!("corrupt"), &json!({"a": 1}));
        assert_eq!(merged, json!({"a": 1}));
    }
}
