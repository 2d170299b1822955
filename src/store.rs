//! Durable elevation cache persisted as a JSON document.
//!
//! Entries are keyed `elevation_{lat4}_{lon4}` and serialized as
//! `{"elevation": meters, "cachedAt": unix_millis}` so they survive process
//! restarts.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredElevation {
    pub elevation: f64,
    #[serde(rename = "cachedAt", with = "chrono::serde::ts_milliseconds")]
    pub cached_at: DateTime<Utc>,
}

/// Persisted entries, ordered by key for stable files.
pub type StoredEntries = BTreeMap<String, StoredElevation>;

#[derive(Debug, Clone)]
pub struct ElevationStore {
    path: PathBuf,
}

impl ElevationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all entries. A missing file is an empty store.
    pub fn load(&self) -> Result<StoredEntries, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(StoredEntries::new()),
            Err(err) => return Err(err.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(StoredEntries::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Replace the stored document. Written to a sibling temp file then
    /// renamed so a crash never leaves a truncated store behind.
    pub fn save(&self, entries: &StoredEntries) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer_pretty(&mut writer, entries)?;
        writer.flush()?;
        drop(writer);
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }

    /// Insert or overwrite one entry.
    pub fn put(&self, key: &str, value: StoredElevation) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value);
        self.save(&entries)
    }
}
