//! # Reconciler
//!
//! Merges an arbitrary incoming payload onto a canonical default state.
//!
//! ## Policy
//!
//! | Section              | Rule                                                        |
//! |----------------------|-------------------------------------------------------------|
//! | `companyContext`     | shallow merge, incoming wins                                |
//! | `categoryData`       | shallow merge, incoming wins                                |
//! | `aiSuggestions`      | replaced wholesale when incoming is an object               |
//! | `segmentData`        | defaults, then flattened incoming on top                    |
//! | `positioningData`    | shallow merge; `alternatives` always normalized             |
//! | `navigationProgress` | list replaced only by a list; completion map merged         |
//! | `currentView`        | incoming if present and recognizable                        |
//! | unknown keys         | passed through                                              |
//!
//! Reconciliation never fails. A field whose incoming value has the wrong
//! shape keeps its default.

use crate::payload::flatten_segments;
use crate::types::{
    Alternative, FieldMap, NavigationProgress, PartCompletion, PositioningData, STATE_SECTIONS,
    SessionState, StageId, ValueProposition, View, parse_timestamp,
};
use serde_json::Value;
use tracing::debug;

/// Descriptive-shape field names, in `val1..val5` order.
pub const DESCRIPTIVE_ALTERNATIVE_FIELDS: [&str; 5] = [
    "alternative",
    "description",
    "whyCustomersChoose",
    "weaknessesOrGaps",
    "customerProof",
];

const LEGACY_ALTERNATIVE_FIELDS: [&str; 5] = ["val1", "val2", "val3", "val4", "val5"];

/// Positioning keys consumed by list handling rather than merged verbatim.
const POSITIONING_LIST_KEYS: [&str; 3] = ["alternatives", "values", "competitiveAlternatives"];

// =============================================================================
// ALTERNATIVE RECORDS
// =============================================================================

/// An incoming competitor record, classified once by field presence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlternativeRecord<'a> {
    /// `val1..val5` shape.
    Legacy(&'a FieldMap),
    /// `alternative`, `description`, `whyCustomersChoose`, ... shape.
    Descriptive(&'a FieldMap),
}

impl<'a> AlternativeRecord<'a> {
    /// Classify a record. Any descriptive field name makes it descriptive.
    #[must_use]
    pub fn classify(record: &'a FieldMap) -> Self {
        if DESCRIPTIVE_ALTERNATIVE_FIELDS
            .iter()
            .any(|field| record.contains_key(*field))
        {
            AlternativeRecord::Descriptive(record)
        } else {
            AlternativeRecord::Legacy(record)
        }
    }

    /// Map the record onto the canonical shape.
    #[must_use]
    pub fn to_canonical(self) -> Alternative {
        let (record, names) = match self {
            AlternativeRecord::Legacy(record) => (record, LEGACY_ALTERNATIVE_FIELDS),
            AlternativeRecord::Descriptive(record) => (record, DESCRIPTIVE_ALTERNATIVE_FIELDS),
        };
        let [val1, val2, val3, val4, val5] = names.map(|name| text_field(record, name));
        Alternative {
            val1,
            val2,
            val3,
            val4,
            val5,
        }
    }
}

/// Read a field as text. Numbers and booleans are rendered; anything else is empty.
fn text_field(record: &FieldMap, name: &str) -> String {
    match record.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Normalize any mix of record shapes into canonical alternatives.
///
/// Total: entries that are not objects become empty records.
#[must_use]
pub fn normalize_alternatives(entries: &[Value]) -> Vec<Alternative> {
    entries
        .iter()
        .map(|entry| match entry {
            Value::Object(record) => AlternativeRecord::classify(record).to_canonical(),
            _ => Alternative::default(),
        })
        .collect()
}

fn normalize_values(entries: &[Value]) -> Vec<ValueProposition> {
    entries
        .iter()
        .map(|entry| match entry {
            Value::Object(record) => ValueProposition {
                val1: text_field(record, "val1"),
                val2: text_field(record, "val2"),
                val3: text_field(record, "val3"),
                val4: text_field(record, "val4"),
            },
            _ => ValueProposition::default(),
        })
        .collect()
}

// =============================================================================
// RECONCILE
// =============================================================================

/// Merge `incoming` onto `initial`, producing a complete state.
///
/// `incoming` is the `data` member of a portable document (or anything
/// else; a non-object payload yields `initial` unchanged).
#[must_use]
pub fn reconcile(initial: &SessionState, incoming: &Value) -> SessionState {
    let Some(incoming) = incoming.as_object() else {
        debug!("incoming payload is not an object, keeping defaults");
        return initial.clone();
    };

    let mut extra = initial.extra.clone();
    for (key, value) in incoming {
        if !STATE_SECTIONS.contains(&key.as_str()) {
            extra.insert(key.clone(), value.clone());
        }
    }

    SessionState {
        company_context: merge_fields(
            &initial.company_context,
            section(incoming, "companyContext"),
        ),
        segment_data: merge_fields(
            &initial.segment_data,
            section(incoming, "segmentData")
                .map(flatten_segments)
                .as_ref(),
        ),
        positioning_data: merge_positioning(
            &initial.positioning_data,
            section(incoming, "positioningData"),
        ),
        category_data: merge_fields(&initial.category_data, section(incoming, "categoryData")),
        ai_suggestions: section(incoming, "aiSuggestions")
            .cloned()
            .unwrap_or_else(|| initial.ai_suggestions.clone()),
        navigation_progress: merge_navigation(
            &initial.navigation_progress,
            section(incoming, "navigationProgress"),
        ),
        current_view: incoming
            .get("currentView")
            .and_then(Value::as_str)
            .filter(|view| !view.is_empty())
            .and_then(View::parse)
            .unwrap_or(initial.current_view),
        last_saved: match incoming.get("lastSaved") {
            None => initial.last_saved,
            Some(Value::Null) => None,
            Some(value) => parse_timestamp(value).or(initial.last_saved),
        },
        extra,
    }
}

/// An incoming section, if present and an object.
fn section<'a>(incoming: &'a FieldMap, key: &str) -> Option<&'a FieldMap> {
    match incoming.get(key)? {
        Value::Object(map) => Some(map),
        _ => {
            debug!(section = key, "section is not an object, keeping defaults");
            None
        }
    }
}

fn merge_fields(defaults: &FieldMap, incoming: Option<&FieldMap>) -> FieldMap {
    let mut merged = defaults.clone();
    if let Some(incoming) = incoming {
        for (key, value) in incoming {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

fn merge_positioning(defaults: &PositioningData, incoming: Option<&FieldMap>) -> PositioningData {
    let Some(incoming) = incoming else {
        return defaults.clone();
    };

    let mut fields = defaults.fields.clone();
    for (key, value) in incoming {
        if !POSITIONING_LIST_KEYS.contains(&key.as_str()) {
            fields.insert(key.clone(), value.clone());
        }
    }

    let alternatives = ["competitiveAlternatives", "alternatives"]
        .into_iter()
        .find_map(|key| incoming.get(key).and_then(Value::as_array))
        .map(|entries| normalize_alternatives(entries))
        .unwrap_or_else(|| defaults.alternatives.clone());

    let values = incoming
        .get("values")
        .and_then(Value::as_array)
        .map(|entries| normalize_values(entries))
        .unwrap_or_else(|| defaults.values.clone());

    PositioningData {
        alternatives,
        values,
        fields,
    }
}

fn merge_navigation(
    defaults: &NavigationProgress,
    incoming: Option<&FieldMap>,
) -> NavigationProgress {
    let Some(incoming) = incoming else {
        return defaults.clone();
    };

    let completed_parts = match incoming.get("completedParts") {
        Some(Value::Array(parts)) => {
            let mut unique = Vec::new();
            for stage in parts.iter().filter_map(Value::as_str).filter_map(StageId::parse) {
                if !unique.contains(&stage) {
                    unique.push(stage);
                }
            }
            unique
        }
        Some(_) => {
            debug!("completedParts is not a list, keeping defaults");
            defaults.completed_parts.clone()
        }
        None => defaults.completed_parts.clone(),
    };

    let current_part = incoming
        .get("currentPart")
        .and_then(Value::as_str)
        .and_then(StageId::parse)
        .unwrap_or(defaults.current_part);

    let mut part_completion_data = defaults.part_completion_data.clone();
    if let Some(Value::Object(entries)) = incoming.get("partCompletionData") {
        for (stage, entry) in entries {
            let (Some(stage), Value::Object(entry)) = (StageId::parse(stage), entry) else {
                continue;
            };
            part_completion_data.insert(
                stage,
                PartCompletion {
                    completed: entry
                        .get("completed")
                        .and_then(Value::as_bool)
                        .unwrap_or(false),
                    completed_at: entry.get("completedAt").and_then(parse_timestamp),
                },
            );
        }
    }

    NavigationProgress {
        completed_parts,
        current_part,
        part_completion_data,
    }
}

// =============================================================================
// TESTS
// =============================================================================
