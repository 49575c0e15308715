// src/ingest/providers/mod.rs
pub mod ats;
pub mod boards;
pub mod careers;
pub mod companies;
pub mod rss;
