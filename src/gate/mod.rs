//! Client session version gate.
//!
//! Compares a user's last acknowledged version against the current system
//! version and reports the action the client must take. Comparison is plain
//! string inequality, not semantic versioning: any change to the stored
//! string counts as a real version change. Signing the session out is a
//! reported outcome; this module performs no side effects.

use serde::Serialize;

use crate::models::{SystemVersion, INITIAL_USER_VERSION};

/// Version string a fresh installation publishes when no system version
/// record exists yet.
pub const DEFAULT_SYSTEM_VERSION: &str = "1.0.0";

/// Improvements note attached to the lazily created default version record.
pub const DEFAULT_IMPROVEMENTS: &str = "Versão inicial do sistema.";

/// Action the client must take after a version check.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum GateOutcome {
    /// User is on the current version; nothing to do.
    Current,
    /// User still carries the initial sentinel version: show the
    /// improvements dialog and persist the system version on acknowledgment.
    #[serde(rename_all = "camelCase")]
    FirstUpgrade {
        version: String,
        improvements: String,
    },
    /// User acknowledged an older version and the system has since changed:
    /// the session is stale and must be signed out.
    #[serde(rename_all = "camelCase")]
    SignOutRequired { version: String },
}

/// Evaluate the gate for one user against the current system version.
pub fn evaluate(user_version: &str, system: &SystemVersion) -> GateOutcome {
    if user_version == system.version {
        return GateOutcome::Current;
    }
    if user_version == INITIAL_USER_VERSION {
        return GateOutcome::FirstUpgrade {
            version: system.version.clone(),
            improvements: system.improvements.clone(),
        };
    }
    GateOutcome::SignOutRequired {
        version: system.version.clone(),
    }
}
