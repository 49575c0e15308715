// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod dedup;
pub mod filters;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod scan;

// ---- Re-exports for stable public API ----
pub use crate::config::MonitorConfig;
pub use crate::ingest::registry::{default_registry, SourceRegistry};
pub use crate::ingest::types::{GeoPolicy, Posting, SourceAdapter};
pub use crate::notify::Dispatcher;
pub use crate::scan::{ScanReport, Scanner, Scheduler};
