// src/filters/mod.rs
pub mod freshness;
pub mod geo;
pub mod relevance;

pub use freshness::{parse_posted_at, FreshnessFilter};
pub use geo::{GeoDecision, GeoFilter, GeoRule};
pub use relevance::RelevanceFilter;

use crate::ingest::types::Posting;

/// Case-insensitive substrings that disqualify a posting by title or company
/// (staffing agencies, clearance-only roles, ...).
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    terms: Vec<String>,
}

impl Blocklist {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The first term hit, if any.
    pub fn matched(&self, posting: &Posting) -> Option<&str> {
        if self.terms.is_empty() {
            return None;
        }
        let title = posting.title.to_lowercase();
        let company = posting.company.to_lowercase();
        self.terms
            .iter()
            .find(|t| title.contains(t.as_str()) || company.contains(t.as_str()))
            .map(String::as_str)
    }

    pub fn is_blocked(&self, posting: &Posting) -> bool {
        self.matched(posting).is_some()
    }
}
