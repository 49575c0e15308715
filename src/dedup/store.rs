// src/dedup/store.rs
//! On-disk seen set: one JSON array of fingerprint strings, rewritten in full
//! at the end of every scan.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;

use super::SeenSet;

#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the seen set. Absent or unreadable storage yields an empty set.
    pub async fn load(&self) -> SeenSet {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no seen file yet");
                return SeenSet::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = ?e, "seen file unreadable, starting empty");
                return SeenSet::new();
            }
        };
        match serde_json::from_slice::<SeenSet>(&bytes) {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = ?e, "seen file corrupt, starting empty");
                SeenSet::new()
            }
        }
    }

    /// Overwrite storage with `seen`. Written to a sibling temp file and renamed
    /// into place, so a failed write leaves the previous file intact.
    pub async fn save(&self, seen: &SeenSet) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let bytes = serde_json::to_vec_pretty(seen).context("serializing seen set")?;
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .with_context(|| format!("creating {}", tmp.display()))?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("renaming {} into place", tmp.display()))?;
        tracing::debug!(path = %self.path.display(), entries = seen.len(), "seen set saved");
        Ok(())
    }
}
