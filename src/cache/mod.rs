
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ChatError, Result};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Persisted (texts, matrix) pair. The matrix is always derived from exactly
/// these texts: row `i` embeds `texts[i]`. The two are serialized together
/// so they can never be loaded from mismatched versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub texts: Vec<String>,
    pub matrix: Vec<Vec<f32>>,
}

/// Outcome of probing the on-disk cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheProbe {
    /// A persisted record exists and is served as-is. Mere existence counts;
    /// there is no TTL.
    Fresh,
    /// No persisted record; the corpus must be built.
    Missing,
}

/// On-disk store for the embedded corpus: a bincode blob holding the
/// (texts, matrix) pair plus a plain-text timestamp. Single-writer use only;
/// concurrent refreshes from multiple processes are not synchronized.
#[derive(Debug, Clone)]
pub struct CacheStore {
    blob_path: PathBuf,
    timestamp_path: PathBuf,
}

impl CacheStore {
    #[inline]
    pub fn new(blob_path: PathBuf, timestamp_path: PathBuf) -> Self {
        Self {
            blob_path,
            timestamp_path,
        }
    }

    #[inline]
    pub fn probe(&self) -> CacheProbe {
        if self.blob_path.exists() {
            CacheProbe::Fresh
        } else {
            CacheProbe::Missing
        }
    }

    /// Serve the cached record unchanged, or rebuild it via `build` when
    /// forced or missing. A fresh build is persisted together with the
    /// current wall-clock timestamp before returning. Build failures leave
    /// any previous record on disk untouched.
    #[inline]
    pub fn load_or_build(
        &self,
        force: bool,
        build: impl FnOnce() -> Result<CacheRecord>,
    ) -> Result<(CacheRecord, String)> {
        if !force && self.probe() == CacheProbe::Fresh {
            debug!("Serving embeddings from cache at {}", self.blob_path.display());
            return self.load();
        }

        info!("Building fresh embedding corpus (force={})", force);
        let record = build()?;
        let timestamp = self.store(&record)?;
        Ok((record, timestamp))
    }

    /// Deserialize the persisted record and its timestamp. An unreadable
    /// record is fatal for the read path; the caller's only remedy is an
    /// explicit force refresh.
    #[inline]
    pub fn load(&self) -> Result<(CacheRecord, String)> {
        let blob = fs::read(&self.blob_path).map_err(|e| {
            ChatError::CacheCorrupt(format!(
                "Failed to read {}: {}",
                self.blob_path.display(),
                e
            ))
        })?;

        let record: CacheRecord = bincode::deserialize(&blob).map_err(|e| {
            ChatError::CacheCorrupt(format!(
                "Failed to deserialize {}: {}",
                self.blob_path.display(),
                e
            ))
        })?;

        if record.texts.len() != record.matrix.len() {
            return Err(ChatError::CacheCorrupt(format!(
                "Record holds {} texts but {} matrix rows",
                record.texts.len(),
                record.matrix.len()
            )));
        }

        let timestamp = fs::read_to_string(&self.timestamp_path).map_err(|e| {
            ChatError::CacheCorrupt(format!(
                "Failed to read {}: {}",
                self.timestamp_path.display(),
                e
            ))
        })?;

        debug!(
            "Loaded {} cached embeddings (last updated {})",
            record.matrix.len(),
            timestamp
        );
        Ok((record, timestamp))
    }

    /// Persist the record and a fresh timestamp, returning the timestamp.
    /// Both artifacts go through write-to-temp-then-rename; the blob lands
    /// first so a crash never pairs a newer timestamp with an older blob.
    #[inline]
    pub fn store(&self, record: &CacheRecord) -> Result<String> {
        if let Some(parent) = self.blob_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let blob = bincode::serialize(record).map_err(|e| {
            ChatError::CacheCorrupt(format!("Failed to serialize cache record: {}", e))
        })?;
        write_atomic(&self.blob_path, &blob)?;

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        write_atomic(&self.timestamp_path, timestamp.as_bytes())?;

        info!(
            "Persisted {} embeddings to {} at {}",
            record.matrix.len(),
            self.blob_path.display(),
            timestamp
        );
        Ok(timestamp)
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
