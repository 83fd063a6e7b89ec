//! Flat (brute-force) L2 index.

use crate::error::IndexError;
use crate::types::{Neighbor, VectorDimension};
use std::cmp::Ordering;

/// Append-only exact index.
///
/// Rows are stored contiguously in insertion order; row `i` starts at
/// `i * dimension` in `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: VectorDimension,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimension: VectorDimension) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Rebuild from raw row-major data, used by the loader.
    pub(crate) fn from_raw(dimension: VectorDimension, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len() % dimension.get(), 0);
        Self { dimension, data }
    }

    pub fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.data.len() / self.dimension.get()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw row-major contents.
    pub(crate) fn as_raw(&self) -> &[f32] {
        &self.data
    }

    /// Vector stored at `row`.
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        let dim = self.dimension.get();
        self.data.get(row * dim..(row + 1) * dim)
    }

    /// Append vectors in order, returning the row of the first one.
    ///
    /// The whole batch is validated before anything is appended.
    pub fn add<V: AsRef<[f32]>>(&mut self, vectors: &[V]) -> Result<usize, IndexError> {
        let dim = self.dimension.get();
        for vector in vectors {
            let vector = vector.as_ref();
            if vector.len() != dim {
                return Err(IndexError::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                });
            }
        }

        let first_row = self.size();
        self.data.reserve(vectors.len() * dim);
        for vector in vectors {
            self.data.extend_from_slice(vector.as_ref());
        }
        Ok(first_row)
    }

    /// Drop every row from `rows` onward. No-op when `rows >= size()`.
    pub fn truncate(&mut self, rows: usize) {
        self.data.truncate(rows * self.dimension.get());
    }

    /// Up to `k` nearest rows by ascending squared L2 distance.
    ///
    /// Ties are broken by row so results are deterministic. An empty index
    /// or `k == 0` yields an empty result.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        let dim = self.dimension.get();
        if query.len() != dim {
            return Err(IndexError::DimensionMismatch {
                expected: dim,
                actual: query.len(),
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates: Vec<Neighbor> = self
            .data
            .chunks_exact(dim)
            .enumerate()
            .map(|(row, vector)| Neighbor {
                row,
                distance: squared_l2(query, vector),
            })
            .collect();

        let by_distance = |a: &Neighbor, b: &Neighbor| -> Ordering {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.row.cmp(&b.row))
        };

        if k < candidates.len() {
            candidates.select_nth_unstable_by(k - 1, by_distance);
            candidates.truncate(k);
        }
        candidates.sort_by(by_distance);
        Ok(candidates)
    }
}

/// Squared Euclidean distance between two equal-length vectors.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
