//! Upload classification by file name and content.
//!
//! Classification is an ordered list of rules evaluated in sequence; the
//! first matching rule decides the category and anything unmatched is
//! [`Category::Unknown`]. Name rules come first because a name states the
//! operator's intent, content sniffing only settles ambiguous names.

use crate::constants::{
    CLASSIFICATION_KEY, QUALIFYING_POSITION_KEY, ROOT_SESSION_KEY, SESSION_INDICATOR_KEY,
    name_keywords,
};
use crate::decoder::{DecodeMode, DecodedPayload};
use crate::models::Category;
use tracing::debug;

/// What a rule gets to look at
#[derive(Debug, Clone, Copy)]
pub struct ClassificationInput<'a> {
    /// Lowercased file name
    pub name: &'a str,
    pub payload: Option<&'a DecodedPayload>,
}

pub type RulePredicate = fn(&ClassificationInput<'_>) -> bool;

/// One `(predicate, category)` pair
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pub label: &'static str,
    pub category: Category,
    pub predicate: RulePredicate,
}

impl ClassificationRule {
    pub fn new(label: &'static str, category: Category, predicate: RulePredicate) -> Self {
        Self {
            label,
            category,
            predicate,
        }
    }
}

/// Priority-ordered classifier
#[derive(Debug, Clone)]
pub struct FormatClassifier {
    rules: Vec<ClassificationRule>,
}

impl Default for FormatClassifier {
    fn default() -> Self {
        Self::new(vec![
            ClassificationRule::new("name:practice", Category::Practice, name_is_practice),
            ClassificationRule::new("name:qualifying", Category::Qualifying, name_is_qualifying),
            ClassificationRule::new("name:race", Category::RaceResults, name_is_race),
            ClassificationRule::new(
                "content:session",
                Category::Practice,
                content_has_session,
            ),
            ClassificationRule::new(
                "content:qualifying-position",
                Category::Qualifying,
                content_has_qualifying_position,
            ),
        ])
    }
}

impl FormatClassifier {
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Assign a category to an upload. Never fails.
    ///
    /// Never returns [`Category::Invalid`]; that category is only assigned
    /// when decoding fails.
    pub fn classify(&self, file_name: &str, payload: Option<&DecodedPayload>) -> Category {
        let name = file_name.to_lowercase();
        let input = ClassificationInput {
            name: &name,
            payload,
        };

        match self.rules.iter().find(|rule| (rule.predicate)(&input)) {
            Some(rule) => {
                debug!(file = file_name, rule = rule.label, category = %rule.category, "Classified upload");
                rule.category
            }
            None => Category::Unknown,
        }
    }
}

fn name_contains_any(input: &ClassificationInput<'_>, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| input.name.contains(keyword))
}

fn name_is_practice(input: &ClassificationInput<'_>) -> bool {
    name_contains_any(input, name_keywords::PRACTICE)
}

fn name_is_qualifying(input: &ClassificationInput<'_>) -> bool {
    name_contains_any(input, name_keywords::QUALIFYING)
}

fn name_is_race(input: &ClassificationInput<'_>) -> bool {
    name_contains_any(input, name_keywords::RACE_RESULTS)
}

fn is_json_object_root(payload: &DecodedPayload) -> bool {
    payload.mode == DecodeMode::Json && !payload.root_keys.is_empty()
}

// Content rules only fire when there is a first entry to inspect.

fn content_has_session(input: &ClassificationInput<'_>) -> bool {
    let Some(payload) = input.payload else {
        return false;
    };
    let Some(entry) = payload.first_entry() else {
        return false;
    };
    entry.contains_key(SESSION_INDICATOR_KEY)
        || (is_json_object_root(payload) && payload.has_root_key(ROOT_SESSION_KEY))
}

fn content_has_qualifying_position(input: &ClassificationInput<'_>) -> bool {
    let Some(payload) = input.payload else {
        return false;
    };
    let Some(entry) = payload.first_entry() else {
        return false;
    };
    entry.contains_key(QUALIFYING_POSITION_KEY)
        || (is_json_object_root(payload)
            && payload.has_root_key(CLASSIFICATION_KEY)
            && input.name.contains("qual"))
}
