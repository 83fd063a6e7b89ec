//! On-disk format for [`FlatIndex`].
//!
//! # Storage Format
//!
//! - Header (16 bytes): magic `LRVX`, version, dimension, row count, each a
//!   little-endian `u32`
//! - Rows: contiguous little-endian `f32` arrays, `dimension` values each
//!
//! Loading goes through a memory map and checks that the file length is
//! exactly header plus rows. Saving writes a sibling temp file and renames it
//! over the target, so a crash never leaves a half-written index behind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use memmap2::Mmap;
use tempfile::NamedTempFile;
use tracing::debug;

use super::FlatIndex;
use crate::error::{PersistenceError, PersistenceResult};
use crate::types::VectorDimension;

/// Magic bytes identifying index files.
pub const INDEX_MAGIC: &[u8; 4] = b"LRVX";

/// Current index format version.
pub const INDEX_VERSION: u32 = 1;

const HEADER_SIZE: usize = 16;
const BYTES_PER_F32: usize = 4;

impl FlatIndex {
    /// Write the index to `path` atomically.
    pub fn save(&self, path: &Path) -> PersistenceResult<()> {
        let dir = parent_dir(path);
        std::fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))?;

        let rows = u32::try_from(self.size()).map_err(|_| PersistenceError::Encode {
            path: path.to_path_buf(),
            reason: format!("row count {} exceeds format limit", self.size()),
        })?;
        let dimension = u32::try_from(self.dimension().get()).map_err(|_| {
            PersistenceError::Encode {
                path: path.to_path_buf(),
                reason: format!("dimension {} exceeds format limit", self.dimension()),
            }
        })?;

        let temp = NamedTempFile::new_in(dir).map_err(|e| PersistenceError::io(dir, e))?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            let write_all = |writer: &mut BufWriter<&File>| -> std::io::Result<()> {
                writer.write_all(INDEX_MAGIC)?;
                writer.write_all(&INDEX_VERSION.to_le_bytes())?;
                writer.write_all(&dimension.to_le_bytes())?;
                writer.write_all(&rows.to_le_bytes())?;
                for value in self.as_raw() {
                    writer.write_all(&value.to_le_bytes())?;
                }
                writer.flush()
            };
            write_all(&mut writer).map_err(|e| PersistenceError::io(temp.path(), e))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|e| PersistenceError::io(temp.path(), e))?;
        temp.persist(path)
            .map_err(|e| PersistenceError::io(path, e.error))?;

        debug!(path = %path.display(), rows, dimension, "saved vector index");
        Ok(())
    }

    /// Load an index previously written by [`FlatIndex::save`].
    pub fn load(path: &Path) -> PersistenceResult<Self> {
        let file = File::open(path).map_err(|e| PersistenceError::io(path, e))?;
        // SAFETY: the file is owned by this process for the lifetime of the
        // map and is only replaced by rename, never truncated in place.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| PersistenceError::io(path, e))?;

        let (dimension, rows) = read_header(&mmap, path)?;
        let dim = dimension.get();

        let expected_len = rows
            .checked_mul(dim)
            .and_then(|n| n.checked_mul(BYTES_PER_F32))
            .and_then(|n| n.checked_add(HEADER_SIZE))
            .ok_or_else(|| PersistenceError::corrupt(path, "header sizes overflow"))?;
        if mmap.len() != expected_len {
            return Err(PersistenceError::corrupt(
                path,
                format!(
                    "expected {expected_len} bytes for {rows} rows of dimension {dim}, found {}",
                    mmap.len()
                ),
            ));
        }

        let data: Vec<f32> = mmap[HEADER_SIZE..]
            .chunks_exact(BYTES_PER_F32)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        debug!(path = %path.display(), rows, dimension = dim, "loaded vector index");
        Ok(Self::from_raw(dimension, data))
    }
}

fn read_header(bytes: &[u8], path: &Path) -> PersistenceResult<(VectorDimension, usize)> {
    if bytes.len() < HEADER_SIZE {
        return Err(PersistenceError::corrupt(
            path,
            "file too small to contain header",
        ));
    }
    if &bytes[0..4] != INDEX_MAGIC {
        return Err(PersistenceError::corrupt(path, "invalid magic bytes"));
    }

    let word = |offset: usize| {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    };

    let version = word(4);
    if version != INDEX_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: version,
            supported: INDEX_VERSION,
        });
    }

    let dimension = VectorDimension::new(word(8) as usize)
        .map_err(|_| PersistenceError::corrupt(path, "zero dimension in header"))?;
    Ok((dimension, word(12) as usize))
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
