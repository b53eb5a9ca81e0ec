//! # Core Type Definitions
//!
//! This module contains the live session state and the error type shared by
//! every stage of the engine:
//! - Stage and view identifiers (`StageId`, `View`)
//! - Navigation tracking (`NavigationProgress`, `PartCompletion`)
//! - Positioning records (`Alternative`, `ValueProposition`, `PositioningData`)
//! - The live state itself (`SessionState`)
//! - Error types (`SessionError`)
//!
//! ## Open Maps
//!
//! Form sections are `FieldMap`s (insertion-ordered JSON objects) because the
//! engine never interprets field meaning. Only the structures the engine has
//! invariants about (stages, alternatives, navigation) are typed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// An insertion-ordered JSON object used for free-form form sections.
pub type FieldMap = serde_json::Map<String, Value>;

// =============================================================================
// STAGES & VIEWS
// =============================================================================

/// One of the four sequential content sections a user progresses through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageId {
    /// Company context.
    Part1,
    /// Segment analysis (jobs, value, willingness to pay).
    Part2,
    /// Competitive positioning.
    Part3,
    /// Category design.
    Part4,
}

impl StageId {
    /// All stages in progression order.
    pub const ALL: [StageId; 4] = [
        StageId::Part1,
        StageId::Part2,
        StageId::Part3,
        StageId::Part4,
    ];

    /// Wire identifier of the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StageId::Part1 => "part1",
            StageId::Part2 => "part2",
            StageId::Part3 => "part3",
            StageId::Part4 => "part4",
        }
    }

    /// Human-readable stage title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            StageId::Part1 => "Company Context",
            StageId::Part2 => "Segment Analysis",
            StageId::Part3 => "Positioning",
            StageId::Part4 => "Category Design",
        }
    }

    /// Parse a wire identifier. Unknown identifiers yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.as_str() == s)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The screen the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum View {
    /// Landing screen sentinel.
    #[default]
    Home,
    /// One of the four content stages.
    Stage(StageId),
}

impl View {
    /// Wire identifier of the view.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            View::Home => "home",
            View::Stage(stage) => stage.as_str(),
        }
    }

    /// Parse a wire identifier. Unknown identifiers yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s == "home" {
            return Some(View::Home);
        }
        StageId::parse(s).map(View::Stage)
    }
}

impl TryFrom<String> for View {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        View::parse(&value).ok_or_else(|| format!("unknown view: {}", value))
    }
}

impl From<View> for String {
    fn from(view: View) -> Self {
        view.as_str().to_string()
    }
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// Completion marker for a single stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartCompletion {
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Progress through the four stages.
///
/// `completed_parts` behaves as an ordered set: no duplicates, only valid
/// stage identifiers, first-completion order preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationProgress {
    pub completed_parts: Vec<StageId>,
    pub current_part: StageId,
    pub part_completion_data: BTreeMap<StageId, PartCompletion>,
}

impl Default for NavigationProgress {
    fn default() -> Self {
        Self {
            completed_parts: Vec::new(),
            current_part: StageId::Part1,
            part_completion_data: BTreeMap::new(),
        }
    }
}

impl NavigationProgress {
    /// Mark a stage as completed at the given instant.
    ///
    /// Completing an already completed stage keeps its original position in
    /// `completed_parts` and refreshes the timestamp.
    pub fn complete(&mut self, stage: StageId, at: DateTime<Utc>) {
        if !self.completed_parts.contains(&stage) {
            self.completed_parts.push(stage);
        }
        self.part_completion_data.insert(
            stage,
            PartCompletion {
                completed: true,
                completed_at: Some(at),
            },
        );
    }

    /// Check whether a stage has been completed.
    #[must_use]
    pub fn is_completed(&self, stage: StageId) -> bool {
        self.completed_parts.contains(&stage)
    }
}

// =============================================================================
// POSITIONING RECORDS
// =============================================================================

/// A competitor record in canonical (`val1..val5`) shape.
///
/// Field meaning: alternative, description, why customers choose it,
/// weaknesses or gaps, customer proof.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Alternative {
    pub val1: String,
    pub val2: String,
    pub val3: String,
    pub val4: String,
    pub val5: String,
}

/// A value-proposition record (`val1..val4`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueProposition {
    pub val1: String,
    pub val2: String,
    pub val3: String,
    pub val4: String,
}

/// Positioning section: free-form fields plus the two ordered lists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PositioningData {
    pub alternatives: Vec<Alternative>,
    pub values: Vec<ValueProposition>,
    #[serde(flatten)]
    pub fields: FieldMap,
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// The live, in-memory state of one planning session.
///
/// Owned by the UI layer. The engine only ever reads a snapshot of it or
/// produces a complete replacement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    pub company_context: FieldMap,
    pub segment_data: FieldMap,
    pub positioning_data: PositioningData,
    pub category_data: FieldMap,
    pub ai_suggestions: FieldMap,
    pub navigation_progress: NavigationProgress,
    pub current_view: View,
    pub last_saved: Option<DateTime<Utc>>,
    /// Top-level keys this version of the engine does not understand.
    #[serde(flatten)]
    pub extra: FieldMap,
}

/// Top-level section keys of the live state, in document order.
pub const STATE_SECTIONS: [&str; 8] = [
    "companyContext",
    "segmentData",
    "positioningData",
    "categoryData",
    "aiSuggestions",
    "navigationProgress",
    "currentView",
    "lastSaved",
];

impl SessionState {
    /// Create a fresh default state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-empty string fields across the free-form sections.
    #[must_use]
    pub fn filled_field_count(&self) -> usize {
        [
            &self.company_context,
            &self.segment_data,
            &self.positioning_data.fields,
            &self.category_data,
        ]
        .into_iter()
        .flat_map(|section| section.values())
        .filter(|value| value.as_str().is_some_and(|s| !s.trim().is_empty()))
        .count()
    }
}

/// Parse a timestamp as written by any export vintage.
///
/// Accepts RFC 3339 strings and integer epoch milliseconds.
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Stagecraft engine and its hosts.
///
/// - Configuration, validation and parse errors bubble to the UI layer
/// - Shape mismatches inside an otherwise valid document are NOT errors;
///   the reconciler falls back to defaults instead
/// - Restore failures are logged and reported as "no backup"
#[derive(Debug, Error)]
pub enum SessionError {
    /// The engine was invoked without a required collaborator.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The state accessor returned nothing to serialize.
    #[error("No session state available to serialize")]
    StateUnavailable,

    /// The document failed structural validation.
    #[error("Invalid session document: {}", .0.join("; "))]
    InvalidDocument(Vec<String>),

    /// The user cancelled the file pick.
    #[error("No file selected")]
    NoFileSelected,

    /// The picked file is not well-formed JSON.
    #[error("Document is not parseable: {0}")]
    NotParseable(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The persistent store failed.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl SessionError {
    /// The user backed out of a file pick; callers treat this as a no-op.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SessionError::NoFileSelected)
    }

    /// Errors the UI layer reports to the user rather than only logging.
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            SessionError::Configuration(_)
                | SessionError::InvalidDocument(_)
                | SessionError::NotParseable(_)
                | SessionError::StateUnavailable
        )
    }

    /// Messages to show the user for a rejected document.
    ///
    /// Validation errors yield every violation; parse errors yield one line.
    #[must_use]
    pub fn document_problems(&self) -> Vec<String> {
        match self {
            SessionError::InvalidDocument(errors) => errors.clone(),
            SessionError::NotParseable(reason) => vec![reason.clone()],
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
