// src/ingest/registry.rs
use std::sync::Arc;

use anyhow::Result;

use crate::config::MonitorConfig;
use crate::ingest::http::create_client;
use crate::ingest::providers::ats::{AtsGroup, Platform};
use crate::ingest::providers::boards::{Board, JsonBoard};
use crate::ingest::providers::careers::{LinkedInSearch, MetaCareers};
use crate::ingest::providers::rss;
use crate::ingest::types::SourceAdapter;

/// Ordered name → adapter mapping. Order only affects fan-out.
#[derive(Default, Clone)]
pub struct SourceRegistry {
    entries: Vec<(String, Arc<dyn SourceAdapter>)>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, adapter: impl SourceAdapter + 'static) {
        self.entries.push((name.into(), Arc::new(adapter)));
    }

    pub fn with(mut self, name: impl Into<String>, adapter: impl SourceAdapter + 'static) -> Self {
        self.register(name, adapter);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn SourceAdapter>)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), a))
    }
}

/// Every built-in source: RSS feeds, JSON boards and career sites, the scraped
/// sources, then the ATS platform groups.
pub fn default_registry(cfg: &MonitorConfig) -> Result<SourceRegistry> {
    let client = create_client(&cfg.scan)?;
    let mut reg = SourceRegistry::new();

    for (name, feed) in rss::catalog(&client) {
        reg.register(name, feed);
    }
    for board in Board::ALL {
        reg.register(board.source_name(), JsonBoard::new(board, &client, &cfg.keys));
    }
    reg.register("Meta Careers", MetaCareers::new(&client));
    reg.register("LinkedIn", LinkedInSearch::new(&client));
    for platform in [
        Platform::Workday,
        Platform::Greenhouse,
        Platform::Lever,
        Platform::Ashby,
        Platform::SmartRecruiters,
    ] {
        let group = AtsGroup::new(platform, platform.boards(), cfg.scan.group_pool_size, &client);
        reg.register(group.name().to_string(), group);
    }

    tracing::debug!(sources = reg.len(), "source registry built");
    Ok(reg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_covers_every_family() {
        let reg = default_registry(&MonitorConfig::default()).unwrap();
        let names: Vec<&str> = reg.names().collect();
        assert!(names.contains(&"Indeed RSS"));
        assert!(names.contains(&"Remotive"));
        assert!(names.contains(&"Oracle Careers"));
        assert!(names.contains(&"LinkedIn"));
        assert!(names.iter().any(|n| n.starts_with("Greenhouse (")));
        assert_eq!(reg.len(), 7 + Board::ALL.len() + 2 + 5);
        assert_eq!(reg.len(), 27);
    }
}
