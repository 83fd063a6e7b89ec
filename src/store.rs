//! Persistent section-id to text mapping.
//!
//! The store is co-indexed with [`FlatIndex`](crate::index::FlatIndex): the
//! text appended as id `i` belongs to the vector at row `i`. Ids come from an
//! explicit counter that is persisted with the entries, so they are never
//! reused even if entries were ever removed.

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter, Write};
use std::ops::Range;
use std::path::Path;

use bincode::{Decode, Encode};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{PersistenceError, PersistenceResult};
use crate::types::SectionId;

/// Current store format version.
pub const STORE_VERSION: u32 = 1;

/// Map from section id to section text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionStore {
    entries: BTreeMap<SectionId, String>,
    next_id: SectionId,
}

/// Serialized layout of the store file.
#[derive(Encode, Decode)]
struct StoreFile {
    version: u32,
    next_id: u64,
    entries: Vec<(u64, String)>,
}

impl SectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` under the next id.
    pub fn append(&mut self, text: impl Into<String>) -> SectionId {
        let id = self.next_id;
        self.entries.insert(id, text.into());
        self.next_id = id.next();
        id
    }

    /// Store every text in order, returning the range of assigned ids.
    pub fn append_batch<I, S>(&mut self, texts: I) -> Range<SectionId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let start = self.next_id;
        for text in texts {
            self.append(text);
        }
        start..self.next_id
    }

    /// Undo appends made since `next_id` was `id`.
    ///
    /// Only for rolling back a batch that never reached disk; ids below `id`
    /// are untouched.
    pub fn rollback_to(&mut self, id: SectionId) {
        if id >= self.next_id {
            return;
        }
        self.entries.split_off(&id);
        self.next_id = id;
    }

    pub fn get(&self, id: SectionId) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Id the next appended section will receive.
    pub fn next_id(&self) -> SectionId {
        self.next_id
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionId, &str)> {
        self.entries.iter().map(|(id, text)| (*id, text.as_str()))
    }

    /// True when ids are exactly `0..len` with no gaps.
    pub fn is_contiguous(&self) -> bool {
        self.entries
            .keys()
            .enumerate()
            .all(|(row, id)| id.as_row() == row)
    }

    /// Write the store to `path` atomically.
    pub fn save(&self, path: &Path) -> PersistenceResult<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))?;

        let file = StoreFile {
            version: STORE_VERSION,
            next_id: self.next_id.value(),
            entries: self
                .entries
                .iter()
                .map(|(id, text)| (id.value(), text.clone()))
                .collect(),
        };

        let temp = NamedTempFile::new_in(dir).map_err(|e| PersistenceError::io(dir, e))?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            bincode::encode_into_std_write(&file, &mut writer, bincode::config::standard())
                .map_err(|e| PersistenceError::Encode {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            writer
                .flush()
                .map_err(|e| PersistenceError::io(temp.path(), e))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|e| PersistenceError::io(temp.path(), e))?;
        temp.persist(path)
            .map_err(|e| PersistenceError::io(path, e.error))?;

        debug!(path = %path.display(), sections = self.len(), "saved section store");
        Ok(())
    }

    /// Load a store previously written by [`SectionStore::save`].
    pub fn load(path: &Path) -> PersistenceResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| PersistenceError::io(path, e))?;
        let mut reader = BufReader::new(file);

        let decoded: StoreFile =
            bincode::decode_from_std_read(&mut reader, bincode::config::standard())
                .map_err(|e| PersistenceError::corrupt(path, e.to_string()))?;

        if decoded.version != STORE_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: decoded.version,
                supported: STORE_VERSION,
            });
        }

        let entries: BTreeMap<SectionId, String> = decoded
            .entries
            .into_iter()
            .map(|(id, text)| (SectionId::new(id), text))
            .collect();

        if let Some(max) = entries.keys().next_back() {
            if max.value() >= decoded.next_id {
                return Err(PersistenceError::corrupt(
                    path,
                    format!("next id {} is not above stored id {max}", decoded.next_id),
                ));
            }
        }

        debug!(path = %path.display(), sections = entries.len(), "loaded section store");
        Ok(Self {
            entries,
            next_id: SectionId::new(decoded.next_id),
        })
    }
}
