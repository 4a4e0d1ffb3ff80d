//! TCO (Termo Circunstanciado de Ocorrência) record model.
//!
//! A TCO's identity is the user-entered report number. Duplicate detection
//! compares the normalized form of that number within a single calendar year.

use serde::{Deserialize, Serialize};

/// A registered TCO incident report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tco {
    pub id: String,
    pub tco_number: String,
    pub natureza: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_fato: Option<String>,
    pub created_by: String,
    pub created_at: String,
    /// Arbitrary extra form fields, stored as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl Tco {
    /// Normalized form of this record's number, used for duplicate comparison.
    pub fn normalized_number(&self) -> String {
        normalize_tco_number(&self.tco_number)
    }
}

/// Request body for registering a new TCO.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTcoRequest {
    pub tco_number: String,
    pub natureza: String,
    #[serde(default)]
    pub data_fato: Option<String>,
    pub created_by: String,
    #[serde(default)]
    pub extra: Option<serde_json::Value>,
}

/// Normalize a user-entered TCO number for comparison.
///
/// Strips every non-digit character, then drops leading zeros by reinterpreting
/// the digits as an integer. Input with no digits yields an empty string.
pub fn normalize_tco_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return String::new();
    }
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_leading_zeros() {
        assert_eq!(normalize_tco_number("0042"), "42");
        assert_eq!(normalize_tco_number("42"), "42");
    }

    #[test]
    fn test_normalize_strips_non_digits() {
        assert_eq!(normalize_tco_number("TCO-0042"), "42");
        assert_eq!(normalize_tco_number("TCO 123/2026"), "1232026");
    }

    #[test]
    fn test_normalize_empty_and_no_digits() {
        assert_eq!(normalize_tco_number(""), "");
        assert_eq!(normalize_tco_number("sem numero"), "");
    }

    #[test]
    fn test_normalize_all_zeros() {
        assert_eq!(normalize_tco_number("000"), "0");
    }
}
