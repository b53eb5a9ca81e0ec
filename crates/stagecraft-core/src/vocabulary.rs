//! # Segment Vocabularies
//!
//! Fixed membership lists that partition `segmentData` keys into the three
//! domain groups. The lists are disjoint; any key not listed belongs to the
//! open-ended `other` group.
//!
//! Changing a list changes the export format: a key moved between groups is
//! still recovered on import (the flattener unions all groups), but a key
//! removed from every list will be exported under `other`.

/// Jobs-to-be-Done fields.
pub const JOBS_TO_BE_DONE_FIELDS: &[&str] = &[
    "Context",
    "Trigger",
    "Functional Job",
    "Emotional Job",
    "Social Job",
    "Desired Outcome",
    "Obstacles",
    "Current Workaround",
];

/// Customer-Value fields.
pub const CUSTOMER_VALUE_FIELDS: &[&str] = &[
    "Value Drivers",
    "Pain Relievers",
    "Gain Creators",
    "Success Metrics",
    "Proof Points",
    "Switching Costs",
];

/// Willingness-to-Pay fields.
pub const WILLINGNESS_TO_PAY_FIELDS: &[&str] = &[
    "Budget Owner",
    "Budget Range",
    "Pricing Model",
    "Price Anchors",
    "Purchase Process",
    "Payment Triggers",
];

/// A `segmentData` group in the categorized export shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SegmentGroup {
    JobsToBeDone,
    CustomerValue,
    WillingnessToPay,
    Other,
}

impl SegmentGroup {
    /// Groups in merge order. Later groups win if a key ever appears twice.
    pub const MERGE_ORDER: [SegmentGroup; 4] = [
        SegmentGroup::JobsToBeDone,
        SegmentGroup::CustomerValue,
        SegmentGroup::WillingnessToPay,
        SegmentGroup::Other,
    ];

    /// Key of the group inside a categorized `segmentData` object.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            SegmentGroup::JobsToBeDone => "jobsToBeDone",
            SegmentGroup::CustomerValue => "customerValue",
            SegmentGroup::WillingnessToPay => "willingnessToPay",
            SegmentGroup::Other => "other",
        }
    }

    /// Group a `segmentData` key belongs to.
    #[must_use]
    pub fn of(field: &str) -> Self {
        if JOBS_TO_BE_DONE_FIELDS.contains(&field) {
            SegmentGroup::JobsToBeDone
        } else if CUSTOMER_VALUE_FIELDS.contains(&field) {
            SegmentGroup::CustomerValue
        } else if WILLINGNESS_TO_PAY_FIELDS.contains(&field) {
            SegmentGroup::WillingnessToPay
        } else {
            SegmentGroup::Other
        }
    }

    /// Check whether a key names one of the four groups.
    #[must_use]
    pub fn is_group_key(key: &str) -> bool {
        Self::MERGE_ORDER.iter().any(|group| group.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn vocabularies_are_disjoint() {
        let mut seen = BTreeSet::new();
        for field in JOBS_TO_BE_DONE_FIELDS
            .iter()
            .chain(CUSTOMER_VALUE_FIELDS)
            .chain(WILLINGNESS_TO_PAY_FIELDS)
        {
            assert!(seen.insert(*field), "{} listed twice", field);
        }
    }

    #[test]
    fn every_listed_field_maps_to_its_group() {
        for field in JOBS_TO_BE_DONE_FIELDS {
            assert_eq!(SegmentGroup::of(field), SegmentGroup::JobsToBeDone);
        }
        for field in CUSTOMER_VALUE_FIELDS {
            assert_eq!(SegmentGroup::of(field), SegmentGroup::CustomerValue);
        }
        for field in WILLINGNESS_TO_PAY_FIELDS {
            assert_eq!(SegmentGroup::of(field), SegmentGroup::WillingnessToPay);
        }
        assert_eq!(SegmentGroup::of("customColumn"), SegmentGroup::Other);
        // Group keys themselves are not segment fields
        assert_eq!(SegmentGroup::of("jobsToBeDone"), SegmentGroup::Other);
    }

    #[test]
    fn group_keys_are_recognized() {
        assert!(SegmentGroup::is_group_key("willingnessToPay"));
        assert!(SegmentGroup::is_group_key("other"));
        assert!(!SegmentGroup::is_group_key("Context"));
    }
}
