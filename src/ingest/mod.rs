// src/ingest/mod.rs
pub mod http;
pub mod providers;
pub mod registry;
pub mod types;

use crate::ingest::registry::SourceRegistry;
use crate::ingest::types::{Candidate, GeoPolicy, Posting, SourceAdapter};
use futures::FutureExt;
use metrics::{counter, histogram};
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Normalize text: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (NBSP included)
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"[\s\u{00A0}]+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 500 chars
    if out.chars().count() > 500 {
        out = out.chars().take(500).collect();
    }

    out
}

/// Outcome of one adapter run, collected from the worker pool.
#[derive(Debug)]
pub enum SourceResult {
    Fetched {
        name: String,
        geo: GeoPolicy,
        postings: Vec<Posting>,
    },
    Failed {
        name: String,
        error: anyhow::Error,
    },
}

/// Fan-in of one orchestrated fetch.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub candidates: Vec<Candidate>,
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

type Job = (String, Arc<dyn SourceAdapter>);

/// Run every adapter in `registry` on a pool of at most `pool_size` workers.
///
/// Returns once every adapter has either produced postings or failed. Failures
/// (errors and panics alike) are logged at debug level and contribute nothing.
pub async fn fetch_all(registry: &SourceRegistry, pool_size: usize) -> FetchOutcome {
    let queue: VecDeque<Job> = registry
        .iter()
        .map(|(name, adapter)| (name.to_string(), Arc::clone(adapter)))
        .collect();
    let workers = pool_size.max(1).min(queue.len());
    let queue = Arc::new(Mutex::new(queue));
    let (tx, mut rx) = mpsc::unbounded_channel();

    for _ in 0..workers {
        tokio::spawn(worker(Arc::clone(&queue), tx.clone()));
    }
    drop(tx);

    let mut outcome = FetchOutcome::default();
    while let Some(result) = rx.recv().await {
        match result {
            SourceResult::Fetched {
                name,
                geo,
                postings,
            } => {
                tracing::debug!(source = %name, count = postings.len(), "source fetched");
                outcome
                    .candidates
                    .extend(postings.into_iter().map(|posting| Candidate { posting, geo }));
                outcome.succeeded.push(name);
            }
            SourceResult::Failed { name, error } => {
                tracing::debug!(source = %name, error = ?error, "source failed");
                counter!("scan_sources_failed_total").increment(1);
                outcome.failed.push(name);
            }
        }
    }

    counter!("scan_postings_fetched_total").increment(outcome.candidates.len() as u64);
    outcome
}

async fn worker(queue: Arc<Mutex<VecDeque<Job>>>, tx: mpsc::UnboundedSender<SourceResult>) {
    loop {
        let next = match queue.lock() {
            Ok(mut q) => q.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        let Some((name, adapter)) = next else {
            break;
        };
        let result = run_adapter(name, adapter.as_ref()).await;
        if tx.send(result).is_err() {
            break;
        }
    }
}

async fn run_adapter(name: String, adapter: &dyn SourceAdapter) -> SourceResult {
    let t0 = std::time::Instant::now();
    let res = AssertUnwindSafe(adapter.fetch_latest()).catch_unwind().await;
    histogram!("source_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

    match res {
        Ok(Ok(postings)) => SourceResult::Fetched {
            name,
            geo: adapter.geo_policy(),
            postings,
        },
        Ok(Err(error)) => SourceResult::Failed { name, error },
        Err(_) => SourceResult::Failed {
            name,
            error: anyhow::anyhow!("adapter panicked"),
        },
    }
}
