//! Metadata sidecar for the persisted index.
//!
//! Records which embedding model produced the stored vectors so a later run
//! with a different model does not silently mix vector spaces.

use crate::error::{PersistenceError, PersistenceResult};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;

/// File name of the sidecar inside the storage directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Metadata describing the persisted index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Name of the embedding model used
    pub model_name: String,

    /// Dimension of embeddings
    pub dimension: usize,

    /// Number of sections stored
    pub section_count: usize,

    /// Unix timestamp when created
    pub created_at: u64,

    /// Unix timestamp when last updated
    pub updated_at: u64,

    /// Version of the metadata format
    pub version: u32,
}

impl IndexMetadata {
    /// Current metadata version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create new metadata with current timestamp
    pub fn new(model_name: impl Into<String>, dimension: usize, section_count: usize) -> Self {
        let now = unix_timestamp();
        Self {
            model_name: model_name.into(),
            dimension,
            section_count,
            created_at: now,
            updated_at: now,
            version: Self::CURRENT_VERSION,
        }
    }

    /// Update the section count and bump the timestamp
    pub fn update(&mut self, section_count: usize) {
        self.section_count = section_count;
        self.updated_at = unix_timestamp().max(self.updated_at);
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(METADATA_FILE)
    }

    /// Save metadata as pretty JSON inside `dir`
    pub fn save(&self, dir: &Path) -> PersistenceResult<()> {
        let path = Self::path_in(dir);

        let json = serde_json::to_string_pretty(self).map_err(|e| PersistenceError::Encode {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        std::fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))?;

        // Temp file in the same directory so the rename is atomic
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| PersistenceError::io(dir, e))?;
        temp.write_all(json.as_bytes())
            .map_err(|e| PersistenceError::io(temp.path(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| PersistenceError::io(temp.path(), e))?;
        temp.persist(&path)
            .map_err(|e| PersistenceError::io(&path, e.error))?;
        Ok(())
    }

    /// Load metadata from `dir`, rejecting formats newer than this build
    pub fn load(dir: &Path) -> PersistenceResult<Self> {
        let path = Self::path_in(dir);

        let json = std::fs::read_to_string(&path).map_err(|e| PersistenceError::io(&path, e))?;
        let metadata: Self = serde_json::from_str(&json)
            .map_err(|e| PersistenceError::corrupt(&path, format!("invalid metadata: {e}")))?;

        if metadata.version > Self::CURRENT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                path,
                found: metadata.version,
                supported: Self::CURRENT_VERSION,
            });
        }

        Ok(metadata)
    }

    pub fn exists(dir: &Path) -> bool {
        Self::path_in(dir).exists()
    }
}

/// Seconds since the Unix epoch, zero if the clock is before it.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
