//! Narrowing of assembled results by class and free-text search

use crate::models::RaceResultRecord;

const ALL_CLASSES: &str = "all";

/// Class filter plus search term applied to a result collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFilter {
    class_filter: String,
    search_term: String,
}

impl Default for ResultFilter {
    fn default() -> Self {
        Self {
            class_filter: ALL_CLASSES.to_string(),
            search_term: String::new(),
        }
    }
}

impl ResultFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only records whose `CLASS` contains `class`, ignoring case.
    /// `all` keeps every class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class_filter = class.into();
        self
    }

    /// Keep only records whose `NUMBER` or `TEAM` contains `term`
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn is_passthrough(&self) -> bool {
        self.class_filter.eq_ignore_ascii_case(ALL_CLASSES) && self.search_term.is_empty()
    }

    pub fn matches(&self, record: &RaceResultRecord) -> bool {
        self.matches_class(record) && self.matches_search(record)
    }

    /// Filtered copy in the original order
    pub fn apply(&self, records: &[RaceResultRecord]) -> Vec<RaceResultRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }

    fn matches_class(&self, record: &RaceResultRecord) -> bool {
        if self.class_filter.eq_ignore_ascii_case(ALL_CLASSES) {
            return true;
        }
        record
            .field_text("CLASS")
            .is_some_and(|class| contains_ignore_case(&class, &self.class_filter))
    }

    fn matches_search(&self, record: &RaceResultRecord) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        // Car numbers match exactly as typed, team names ignore case
        let number_hit = record
            .field_text("NUMBER")
            .is_some_and(|number| number.contains(&self.search_term));
        let team_hit = record
            .field_text("TEAM")
            .is_some_and(|team| contains_ignore_case(&team, &self.search_term));
        number_hit || team_hit
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
