use serde::{Deserialize, Serialize};

use crate::error::EmbeddingError;

/// Standard vector dimension for the all-MiniLM-L6-v2 model.
pub const VECTOR_DIMENSION_384: usize = 384;

/// Identifier of a document section.
///
/// Ids are assigned in insertion order starting at zero and double as the
/// row index of the section's vector in the index.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SectionId(pub u64);

impl SectionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Row index in the vector index this id is co-indexed with.
    pub fn as_row(&self) -> usize {
        self.0 as usize
    }

    pub fn from_row(row: usize) -> Self {
        Self(row as u64)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-safe wrapper for vector dimensions.
///
/// Prevents dimension mismatches between the embedder, the index and
/// persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorDimension(usize);

impl VectorDimension {
    /// Creates a new `VectorDimension`, rejecting zero.
    pub fn new(dim: usize) -> Result<Self, EmbeddingError> {
        if dim == 0 {
            return Err(EmbeddingError::InvalidDimension(dim));
        }
        Ok(Self(dim))
    }

    #[must_use]
    pub const fn dimension_384() -> Self {
        Self(VECTOR_DIMENSION_384)
    }

    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }

    pub fn validate_vector(&self, vector: &[f32]) -> Result<(), EmbeddingError> {
        if vector.len() != self.0 {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.0,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for VectorDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One nearest-neighbor candidate returned by the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row in the index (equals the section id).
    pub row: usize,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// A resolved search result: section id, distance and the section text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub section_id: SectionId,
    pub distance: f32,
    pub text: String,
}
