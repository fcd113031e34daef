//! Schema validation for classified uploads.
//!
//! Only practice and qualifying uploads have a schema check, and it is an
//! "at least one of" test against a recognized field set so that every
//! historical export variant passes. Only the first entry is inspected.

use crate::constants::{PRACTICE_FIELDS, QUALIFYING_FIELDS, defects};
use crate::models::{Category, DecodedRecord};

/// Recognized fields and the defect reported when none is present
#[derive(Debug, Clone, Copy)]
struct FieldRequirement {
    any_of: &'static [&'static str],
    defect: &'static str,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate the entries of an upload; an empty result means valid
    pub fn validate(&self, category: Category, entries: &[DecodedRecord]) -> Vec<String> {
        let Some(requirement) = Self::requirement_for(category) else {
            return Vec::new();
        };

        let Some(first) = entries.first() else {
            return vec![defects::NOT_A_SEQUENCE.to_string()];
        };

        if requirement.any_of.iter().any(|field| first.contains_key(*field)) {
            Vec::new()
        } else {
            vec![requirement.defect.to_string()]
        }
    }

    fn requirement_for(category: Category) -> Option<FieldRequirement> {
        match category {
            Category::Practice => Some(FieldRequirement {
                any_of: PRACTICE_FIELDS,
                defect: defects::PRACTICE_MISSING_FIELDS,
            }),
            Category::Qualifying => Some(FieldRequirement {
                any_of: QUALIFYING_FIELDS,
                defect: defects::QUALIFYING_MISSING_FIELDS,
            }),
            Category::RaceResults | Category::Unknown | Category::Invalid => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> DecodedRecord {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_practice_with_car_number_is_valid() {
        let entries = vec![record(json!({"CarNumber": "01", "Team": "X"}))];
        assert!(SchemaValidator::new()
            .validate(Category::Practice, &entries)
            .is_empty());
    }

    #[test]
    fn test_practice_missing_core_fields() {
        let entries = vec![record(json!({"Speed": 301.2}))];
        let defects = SchemaValidator::new().validate(Category::Practice, &entries);
        assert_eq!(
            defects,
            vec!["Entry 1: Missing core fields (Number, Team, Driver, or Time)".to_string()]
        );
    }

    #[test]
    fn test_qualifying_accepts_position_variant() {
        let validator = SchemaValidator::new();
        let entries = vec![record(json!({"position": 1}))];
        assert!(validator.validate(Category::Qualifying, &entries).is_empty());

        let entries = vec![record(json!({"Team": "X"}))];
        let defects = validator.validate(Category::Qualifying, &entries);
        assert_eq!(defects.len(), 1);
        assert!(defects[0].contains("Position"));
    }

    #[test]
    fn test_empty_entries_are_a_defect_for_sessions() {
        let validator = SchemaValidator::new();
        for category in [Category::Practice, Category::Qualifying] {
            assert_eq!(
                validator.validate(category, &[]),
                vec![defects::NOT_A_SEQUENCE.to_string()]
            );
        }
    }

    #[test]
    fn test_race_results_and_unknown_never_rejected() {
        let validator = SchemaValidator::new();
        let junk = vec![record(json!({"nothing": "useful"}))];
        for category in [Category::RaceResults, Category::Unknown] {
            assert!(validator.validate(category, &junk).is_empty());
            assert!(validator.validate(category, &[]).is_empty());
        }
    }

    #[test]
    fn test_only_first_entry_is_checked() {
        let entries = vec![
            record(json!({"CarNumber": "01"})),
            record(json!({"garbage": true})),
        ];
        assert!(SchemaValidator::new()
            .validate(Category::Practice, &entries)
            .is_empty());
    }
}
