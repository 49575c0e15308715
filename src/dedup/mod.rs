// src/dedup/mod.rs
//! Posting identity and the set of identities already notified.

pub mod store;

pub use store::SeenStore;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// SHA-256 hex of `source::url`. Stable across restarts and platforms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(source: &str, url: &str) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update(b"::");
        hasher.update(url.as_bytes());
        let digest = hasher.finalize();
        let mut out = String::with_capacity(64);
        for b in digest.iter() {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "{:02x}", b);
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// In-memory seen set for one scan. Ordered so the persisted file is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenSet(BTreeSet<Fingerprint>);

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.0.contains(fp)
    }

    /// Returns `true` when `fp` was not present before.
    pub fn add(&mut self, fp: Fingerprint) -> bool {
        self.0.insert(fp)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Fingerprint> for SeenSet {
    fn from_iter<T: IntoIterator<Item = Fingerprint>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic_hex() {
        let a = Fingerprint::of("Remotive", "https://remotive.com/1");
        let b = Fingerprint::of("Remotive", "https://remotive.com/1");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn source_is_part_of_identity() {
        assert_ne!(
            Fingerprint::of("Remotive", "https://x/1"),
            Fingerprint::of("Himalayas", "https://x/1")
        );
    }

    #[test]
    fn known_digest() {
        // sha256("X::u1")
        use sha2::{Digest, Sha256};
        let expected: String = Sha256::digest(b"X::u1")
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        assert_eq!(Fingerprint::of("X", "u1").as_str(), expected);
    }

    #[test]
    fn seen_set_add_reports_novelty() {
        let mut s = SeenSet::new();
        let fp = Fingerprint::of("X", "u1");
        assert!(s.add(fp.clone()));
        assert!(!s.add(fp.clone()));
        assert!(s.contains(&fp));
        assert_eq!(s.len(), 1);
    }
}
