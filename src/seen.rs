// src/seen.rs
//! Seen-item ledger: which items were already relayed.
//!
//! In memory the ledger only grows. When a file is attached it is loaded once at
//! startup and rewritten after each pass; entries older than the retention
//! window are left out of the file so it does not grow without bound across
//! restarts.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::fs;

pub const DEFAULT_RETENTION_DAYS: u32 = 7;

#[derive(Debug)]
pub struct SeenStore {
    entries: HashMap<String, DateTime<Utc>>,
    path: Option<PathBuf>,
    retention: ChronoDuration,
}

impl Default for SeenStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl SeenStore {
    /// Process-lifetime store with no file behind it.
    pub fn in_memory() -> Self {
        Self {
            entries: HashMap::new(),
            path: None,
            retention: ChronoDuration::days(DEFAULT_RETENTION_DAYS as i64),
        }
    }

    /// Load the ledger at `path`. A missing or unreadable file starts empty.
    pub async fn open(path: impl Into<PathBuf>, retention_days: u32) -> Self {
        let path = path.into();
        let retention = ChronoDuration::days(retention_days.max(1) as i64);
        let entries = match fs::read_to_string(&path).await {
            Ok(s) => match serde_json::from_str::<BTreeMap<String, DateTime<Utc>>>(&s) {
                Ok(map) => {
                    let cutoff = Utc::now() - retention;
                    map.into_iter().filter(|(_, ts)| *ts > cutoff).collect()
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "seen file unreadable, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read seen file, starting empty");
                HashMap::new()
            }
        };
        tracing::info!(path = %path.display(), loaded = entries.len(), "seen store opened");
        Self {
            entries,
            path: Some(path),
            retention,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns `true` when `key` was not present before.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.insert_at(key, Utc::now())
    }

    pub fn insert_at(&mut self, key: impl Into<String>, ts: DateTime<Utc>) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, ts);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the ledger to its file (temp file + rename). No-op when in memory.
    pub async fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let cutoff = Utc::now() - self.retention;
        let snapshot: BTreeMap<&str, &DateTime<Utc>> = self
            .entries
            .iter()
            .filter(|(_, ts)| **ts > cutoff)
            .map(|(k, ts)| (k.as_str(), ts))
            .collect();
        let body = serde_json::to_vec(&snapshot).context("encoding seen store")?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let tmp = tmp_path(path);
        fs::write(&tmp, body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .await
            .with_context(|| format!("replacing {}", path.display()))?;
        tracing::debug!(path = %path.display(), entries = snapshot.len(), "seen store persisted");
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
