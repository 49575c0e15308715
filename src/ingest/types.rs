// src/ingest/types.rs
use anyhow::Result;

/// One job posting as produced by a source adapter.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Posting {
    pub title: String,
    pub company: String,
    pub location: String,  // free text, may be empty
    pub url: String,       // unique within its source
    pub source: String,    // e.g. "Remotive", "Greenhouse/Stripe"
    pub posted_at: String, // free text, may be empty or unparseable
}

impl Posting {
    /// Builds a posting with every text field normalized.
    pub fn new(
        title: impl AsRef<str>,
        company: impl AsRef<str>,
        location: impl AsRef<str>,
        url: impl AsRef<str>,
        source: impl Into<String>,
        posted_at: impl Into<String>,
    ) -> Self {
        Self {
            title: crate::ingest::normalize_text(title.as_ref()),
            company: crate::ingest::normalize_text(company.as_ref()),
            location: crate::ingest::normalize_text(location.as_ref()),
            url: url.as_ref().trim().to_string(),
            source: source.into(),
            posted_at: posted_at.into().trim().to_string(),
        }
    }
}

/// How the geographic filter treats postings from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeoPolicy {
    /// Blank locations are rejected.
    #[default]
    Strict,
    /// Source is already country-filtered upstream; blank locations pass.
    AllowBlank,
}

#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Posting>>;
    fn name(&self) -> &str;

    fn geo_policy(&self) -> GeoPolicy {
        GeoPolicy::Strict
    }
}

/// A fetched posting tagged with the geographic policy of the adapter it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub posting: Posting,
    pub geo: GeoPolicy,
}
