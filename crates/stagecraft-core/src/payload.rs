//! # Payload Builder & Flattener
//!
//! `build` turns the flat live state into the organized export payload;
//! `flatten_segments` is its inverse for `segmentData` and also accepts the
//! flat shape written by older exports.
//!
//! Categorization is sparse: a group with no fields is omitted from the
//! output entirely rather than written as `{}`.

use crate::types::{FieldMap, NavigationProgress, PositioningData, SessionState, View};
use crate::vocabulary::SegmentGroup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// ORGANIZED PAYLOAD
// =============================================================================

/// `segmentData` split by vocabulary. Absent groups carry no data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedSegments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs_to_be_done: Option<FieldMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_value: Option<FieldMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub willingness_to_pay: Option<FieldMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<FieldMap>,
}

impl CategorizedSegments {
    /// The group's fields, if the group is present.
    #[must_use]
    pub fn group(&self, group: SegmentGroup) -> Option<&FieldMap> {
        match group {
            SegmentGroup::JobsToBeDone => self.jobs_to_be_done.as_ref(),
            SegmentGroup::CustomerValue => self.customer_value.as_ref(),
            SegmentGroup::WillingnessToPay => self.willingness_to_pay.as_ref(),
            SegmentGroup::Other => self.other.as_ref(),
        }
    }

    fn slot(&mut self, group: SegmentGroup) -> &mut Option<FieldMap> {
        match group {
            SegmentGroup::JobsToBeDone => &mut self.jobs_to_be_done,
            SegmentGroup::CustomerValue => &mut self.customer_value,
            SegmentGroup::WillingnessToPay => &mut self.willingness_to_pay,
            SegmentGroup::Other => &mut self.other,
        }
    }

    /// The categorized shape as a JSON object, as it appears in a document.
    #[must_use]
    pub fn to_map(&self) -> FieldMap {
        let mut map = FieldMap::new();
        for group in SegmentGroup::MERGE_ORDER {
            if let Some(fields) = self.group(group) {
                map.insert(group.key().to_string(), Value::Object(fields.clone()));
            }
        }
        map
    }
}

/// The serializable payload placed inside an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizedPayload {
    pub company_context: FieldMap,
    pub segment_data: CategorizedSegments,
    pub positioning_data: PositioningData,
    pub category_data: FieldMap,
    pub ai_suggestions: FieldMap,
    pub navigation_progress: NavigationProgress,
    pub current_view: View,
    pub last_saved: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

// =============================================================================
// BUILD
// =============================================================================

/// Partition flat `segmentData` into the sparse categorized shape.
#[must_use]
pub fn categorize(segment_data: &FieldMap) -> CategorizedSegments {
    let mut categorized = CategorizedSegments::default();
    for (key, value) in segment_data {
        categorized
            .slot(SegmentGroup::of(key))
            .get_or_insert_with(FieldMap::new)
            .insert(key.clone(), value.clone());
    }
    categorized
}

/// Build the export payload from a live state snapshot.
///
/// Every section is an owned copy; the payload shares nothing with `state`.
#[must_use]
pub fn build(state: &SessionState) -> OrganizedPayload {
    OrganizedPayload {
        company_context: state.company_context.clone(),
        segment_data: categorize(&state.segment_data),
        positioning_data: state.positioning_data.clone(),
        category_data: state.category_data.clone(),
        ai_suggestions: state.ai_suggestions.clone(),
        navigation_progress: state.navigation_progress.clone(),
        current_view: state.current_view,
        last_saved: state.last_saved,
        extra: state.extra.clone(),
    }
}

// =============================================================================
// FLATTEN
// =============================================================================

/// Collapse categorized `segmentData` back into one flat map.
///
/// Only an object under a group name counts as a group. Input without any
/// group is already flat and is returned as-is. Otherwise every other key,
/// including a scalar under a group name, is kept as a flat column and the
/// groups are unioned on top in [`SegmentGroup::MERGE_ORDER`].
#[must_use]
pub fn flatten_segments(segment_data: &FieldMap) -> FieldMap {
    if !segment_data.iter().any(|(key, value)| is_group(key, value)) {
        return segment_data.clone();
    }

    let mut flat: FieldMap = segment_data
        .iter()
        .filter(|(key, value)| !is_group(key, value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for group in SegmentGroup::MERGE_ORDER {
        if let Some(Value::Object(fields)) = segment_data.get(group.key()) {
            for (key, value) in fields {
                flat.insert(key.clone(), value.clone());
            }
        }
    }

    flat
}

fn is_group(key: &str, value: &Value) -> bool {
    value.is_object() && SegmentGroup::is_group_key(key)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn categorize_routes_known_and_unknown_keys() {
        let segments = fields(json!({
            "Context": "Q3 renewal cycle",
            "customColumn": "foo"
        }));

        let categorized = categorize(&segments);

        assert_eq!(
            categorized.jobs_to_be_done,
            Some(fields(json!({ "Context": "Q3 renewal cycle" })))
        );
        assert_eq!(categorized.other, Some(fields(json!({ "customColumn": "foo" }))));
        assert!(categorized.customer_value.is_none());
        assert!(categorized.willingness_to_pay.is_none());
    }

    #[test]
    fn empty_groups_are_not_serialized() {
        let mut state = SessionState::new();
        state
            .segment_data
            .insert("Budget Owner".into(), json!("CFO"));

        let value = serde_json::to_value(build(&state)).unwrap();
        let segment_data = value["segmentData"].as_object().unwrap();

        assert_eq!(segment_data.len(), 1);
        assert_eq!(segment_data["willingnessToPay"]["Budget Owner"], json!("CFO"));
    }

    #[test]
    fn build_copies_every_section() {
        let mut state = SessionState::new();
        state.company_context.insert("companyName".into(), json!("Acme"));
        state.ai_suggestions.insert("part1".into(), json!({ "tips": ["a"] }));
        state.extra.insert("theme".into(), json!("dark"));

        let payload = build(&state);
        state.company_context.insert("companyName".into(), json!("Changed"));

        assert_eq!(payload.company_context["companyName"], json!("Acme"));
        assert_eq!(payload.ai_suggestions["part1"], json!({ "tips": ["a"] }));
        assert_eq!(payload.extra["theme"], json!("dark"));
    }

    #[test]
    fn flatten_passes_flat_input_through() {
        let flat = fields(json!({ "Context": "x", "customColumn": "y" }));
        assert_eq!(flatten_segments(&flat), flat);
    }

    #[test]
    fn flatten_inverts_categorize() {
        let flat = fields(json!({
            "Context": "x",
            "Value Drivers": "speed",
            "Pricing Model": "seat",
            "customColumn": "y"
        }));
        let categorized = categorize(&flat).to_map();
        assert_eq!(flatten_segments(&categorized), flat);
    }

    #[test]
    fn flatten_keeps_stray_keys_and_scalars_under_group_names() {
        let mixed = fields(json!({
            "jobsToBeDone": { "Context": "x" },
            "customerValue": "not an object",
            "handEdited": "kept"
        }));

        let flat = flatten_segments(&mixed);

        assert_eq!(
            flat,
            fields(json!({
                "customerValue": "not an object",
                "handEdited": "kept",
                "Context": "x"
            }))
        );
    }

    #[test]
    fn flat_columns_named_like_groups_are_not_dropped() {
        let legacy = fields(json!({
            "Context": "x",
            "other": "free text",
            "jobsToBeDone": "hire a tool"
        }));
        assert_eq!(flatten_segments(&legacy), legacy);
    }

    #[test]
    fn later_groups_win_on_overlap() {
        let overlapping = fields(json!({
            "jobsToBeDone": { "Context": "first" },
            "other": { "Context": "last" }
        }));
        assert_eq!(flatten_segments(&overlapping)["Context"], json!("last"));
    }
}
