// src/scan/mod.rs
//! One scan: fan-out fetch, filter, dedup, notify, persist.
//!
//! Everything after fan-in runs sequentially on the caller's task, so the seen
//! set needs no locking.

pub mod scheduler;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

use crate::config::MonitorConfig;
use crate::dedup::{Fingerprint, SeenStore};
use crate::filters::{Blocklist, FreshnessFilter, GeoFilter, RelevanceFilter};
use crate::ingest::fetch_all;
use crate::ingest::registry::SourceRegistry;
use crate::ingest::types::Posting;
use crate::notify::{DigestStatus, Dispatcher};

pub use scheduler::{ScanJob, Scheduler, SchedulerState};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scan_runs_total", "Completed scans.");
        describe_counter!("scan_sources_failed_total", "Adapters that failed or panicked.");
        describe_counter!(
            "scan_postings_fetched_total",
            "Raw postings returned by adapters."
        );
        describe_counter!("scan_postings_new_total", "Postings notified as new.");
        describe_counter!(
            "scan_filtered_total",
            "Postings dropped, by pipeline stage."
        );
        describe_histogram!("scan_duration_ms", "Wall time of one scan in milliseconds.");
        describe_histogram!("source_fetch_ms", "Wall time of one adapter fetch in milliseconds.");
        describe_histogram!("source_parse_ms", "RSS parse time in milliseconds.");
        describe_gauge!("scan_last_run_ts", "Unix ts when the last scan finished.");
        describe_gauge!("scan_seen_entries", "Fingerprints in the seen set after the last scan.");
    });
}

/// Per-stage accounting of one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub sources_total: usize,
    pub sources_failed: Vec<String>,
    pub fetched: usize,
    pub irrelevant: usize,
    pub off_target: usize,
    pub missing_url: usize,
    pub already_seen: usize,
    pub stale: usize,
    pub blocked: usize,
    pub new_postings: Vec<Posting>,
    pub digest: DigestStatus,
    pub seen_saved: bool,
    pub duration: Duration,
}

impl ScanReport {
    pub fn new_count(&self) -> usize {
        self.new_postings.len()
    }
}

pub struct Scanner {
    cfg: Arc<MonitorConfig>,
    registry: SourceRegistry,
    store: SeenStore,
    dispatcher: Dispatcher,
    relevance: RelevanceFilter,
    geo: GeoFilter,
    freshness: FreshnessFilter,
    blocklist: Blocklist,
}

impl Scanner {
    pub fn new(cfg: Arc<MonitorConfig>, registry: SourceRegistry, dispatcher: Dispatcher) -> Self {
        Self {
            store: SeenStore::new(cfg.scan.seen_file.clone()),
            relevance: RelevanceFilter::new(&cfg.filters.keywords),
            geo: GeoFilter::default(),
            freshness: FreshnessFilter::from_hours(cfg.scan.freshness_hours),
            blocklist: Blocklist::new(&cfg.filters.blocklist),
            registry,
            dispatcher,
            cfg,
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn store(&self) -> &SeenStore {
        &self.store
    }

    pub async fn run_scan(&self) -> ScanReport {
        self.run_scan_at(Utc::now()).await
    }

    /// Full scan with `now` as the freshness reference.
    pub async fn run_scan_at(&self, now: DateTime<Utc>) -> ScanReport {
        ensure_metrics_described();
        let t0 = Instant::now();
        tracing::info!(sources = self.registry.len(), "scanning sources in parallel");

        let mut seen = self.store.load().await;
        let fetched = fetch_all(&self.registry, self.cfg.scan.pool_size).await;

        let mut report = ScanReport {
            sources_total: self.registry.len(),
            sources_failed: fetched.failed,
            fetched: fetched.candidates.len(),
            ..ScanReport::default()
        };

        for candidate in fetched.candidates {
            let p = candidate.posting;

            if !self.relevance.is_relevant(&p.title) {
                report.irrelevant += 1;
                continue;
            }
            if !self.geo.admits(&p.location, candidate.geo) {
                report.off_target += 1;
                continue;
            }
            if p.url.is_empty() {
                report.missing_url += 1;
                continue;
            }

            let fp = Fingerprint::of(&p.source, &p.url);
            if seen.contains(&fp) {
                report.already_seen += 1;
                continue;
            }

            let stale = !self.freshness.is_fresh(&p.posted_at, now);
            let blocked = !stale && self.blocklist.is_blocked(&p);
            if stale || blocked {
                if stale {
                    report.stale += 1;
                } else {
                    report.blocked += 1;
                }
                if self.cfg.scan.mark_filtered_seen {
                    seen.add(fp);
                }
                continue;
            }

            seen.add(fp);
            tracing::info!(source = %p.source, title = %p.title, company = %p.company, "new posting");
            self.dispatcher.notify_item(&p).await;
            report.new_postings.push(p);
        }

        report.digest = self.dispatcher.notify_batch(&report.new_postings).await;

        report.seen_saved = match self.store.save(&seen).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(path = %self.store.path().display(), error = ?e, "failed to persist seen set");
                false
            }
        };

        report.duration = t0.elapsed();
        record_metrics(&report, seen.len());

        if report.new_postings.is_empty() {
            tracing::info!(
                failed = report.sources_failed.len(),
                fetched = report.fetched,
                elapsed_ms = report.duration.as_millis() as u64,
                "scan complete, no new jobs"
            );
        } else {
            tracing::info!(
                new = report.new_count(),
                failed = report.sources_failed.len(),
                fetched = report.fetched,
                elapsed_ms = report.duration.as_millis() as u64,
                "scan complete, notifications sent"
            );
        }
        report
    }
}

fn record_metrics(r: &ScanReport, seen_entries: usize) {
    counter!("scan_runs_total").increment(1);
    counter!("scan_postings_new_total").increment(r.new_postings.len() as u64);
    for (stage, n) in [
        ("relevance", r.irrelevant),
        ("geo", r.off_target),
        ("missing_url", r.missing_url),
        ("seen", r.already_seen),
        ("stale", r.stale),
        ("blocked", r.blocked),
    ] {
        if n > 0 {
            counter!("scan_filtered_total", "stage" => stage).increment(n as u64);
        }
    }
    histogram!("scan_duration_ms").record(r.duration.as_secs_f64() * 1_000.0);
    gauge!("scan_last_run_ts").set(Utc::now().timestamp() as f64);
    gauge!("scan_seen_entries").set(seen_entries as f64);
}

#[async_trait::async_trait]
impl ScanJob for Scanner {
    async fn scan(&self) -> ScanReport {
        self.run_scan().await
    }
}
