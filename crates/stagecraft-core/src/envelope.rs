//! # Envelope Contract
//!
//! The portable document is a versioned envelope around the session payload:
//!
//! ```text
//! { "formatVersion": "2.0", "appVersion": "...", "exportTimestamp": "...", "data": { ... } }
//! ```
//!
//! The serializer and hydrator never construct or check envelopes themselves.
//! They are handed an [`EnvelopeContract`], so tests can substitute a fake
//! and hosts can tighten validation without touching the engine.

use crate::types::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// FORMAT VERSIONS
// =============================================================================

/// Format version written by this build.
pub const FORMAT_VERSION: &str = "2.0";

/// Format versions accepted on import.
///
/// - `1.0`: flat `segmentData`, descriptive alternative records
/// - `1.1`: flat `segmentData`, `val1..val5` alternative records
/// - `2.0`: categorized `segmentData`
pub const SUPPORTED_FORMAT_VERSIONS: &[&str] = &["1.0", "1.1", FORMAT_VERSION];

// =============================================================================
// ENVELOPE
// =============================================================================

/// A portable session document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub format_version: String,
    pub app_version: String,
    pub export_timestamp: DateTime<Utc>,
    pub data: Value,
}

impl Envelope {
    /// Render the envelope as pretty-printed JSON text.
    pub fn to_json_pretty(&self) -> Result<String, crate::SessionError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::SessionError::SerializationError(e.to_string()))
    }

    /// Render the envelope as a JSON value.
    pub fn to_value(&self) -> Result<Value, crate::SessionError> {
        serde_json::to_value(self)
            .map_err(|e| crate::SessionError::SerializationError(e.to_string()))
    }
}

/// Outcome of a structural check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Build a report from collected violations.
    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

// =============================================================================
// CONTRACT
// =============================================================================

/// Construction and structural validation of portable documents.
pub trait EnvelopeContract {
    /// Wrap a payload with version and timestamp metadata.
    fn create_envelope(&self, app_version: &str, data: Value) -> Envelope;

    /// Check a candidate document. Never fails; problems go in the report.
    fn validate_envelope(&self, candidate: &Value) -> ValidationReport;
}

impl<C: EnvelopeContract + ?Sized> EnvelopeContract for &C {
    fn create_envelope(&self, app_version: &str, data: Value) -> Envelope {
        (**self).create_envelope(app_version, data)
    }

    fn validate_envelope(&self, candidate: &Value) -> ValidationReport {
        (**self).validate_envelope(candidate)
    }
}

/// The contract used by the shipped application.
#[derive(Debug, Clone, Copy)]
pub struct StandardEnvelope {
    clock: fn() -> DateTime<Utc>,
}

impl StandardEnvelope {
    /// Create a contract stamped by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self { clock: Utc::now }
    }

    /// Create a contract stamped by a fixed clock.
    #[must_use]
    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self { clock }
    }
}

impl Default for StandardEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeContract for StandardEnvelope {
    fn create_envelope(&self, app_version: &str, data: Value) -> Envelope {
        Envelope {
            format_version: FORMAT_VERSION.to_string(),
            app_version: app_version.to_string(),
            export_timestamp: (self.clock)(),
            data,
        }
    }

    fn validate_envelope(&self, candidate: &Value) -> ValidationReport {
        let Some(doc) = candidate.as_object() else {
            return ValidationReport::from_errors(vec![
                "document must be a JSON object".to_string(),
            ]);
        };

        let mut errors = Vec::new();

        match doc.get("formatVersion") {
            None => errors.push("formatVersion is required".to_string()),
            Some(Value::String(v)) if !SUPPORTED_FORMAT_VERSIONS.contains(&v.as_str()) => {
                errors.push(format!(
                    "unsupported formatVersion {} (supported: {})",
                    v,
                    SUPPORTED_FORMAT_VERSIONS.join(", ")
                ));
            }
            Some(Value::String(_)) => {}
            Some(_) => errors.push("formatVersion must be a string".to_string()),
        }

        match doc.get("appVersion") {
            None => errors.push("appVersion is required".to_string()),
            Some(Value::String(_)) => {}
            Some(_) => errors.push("appVersion must be a string".to_string()),
        }

        match doc.get("exportTimestamp") {
            None => errors.push("exportTimestamp is required".to_string()),
            Some(ts) if parse_timestamp(ts).is_none() => {
                errors.push("exportTimestamp must be an RFC 3339 timestamp".to_string());
            }
            Some(_) => {}
        }

        match doc.get("data") {
            None => errors.push("data is required".to_string()),
            Some(Value::Object(_)) => {}
            Some(_) => errors.push("data must be an object".to_string()),
        }

        ValidationReport::from_errors(errors)
    }
}

// =============================================================================
// TESTS
// =============================================================================
