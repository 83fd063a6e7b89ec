//! Deterministic offline embedder based on signed feature hashing.
//!
//! Each lowercase alphanumeric token is hashed with 64-bit FNV-1a; the low
//! bits pick a bucket and the top bit picks the sign. No model download, no
//! randomness, so the same text always maps to the same vector.

use super::{Embedder, finish_batch};
use crate::error::EmbeddingError;
use crate::types::VectorDimension;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Model name recorded in index metadata for hashing embeddings.
pub const HASHING_MODEL_NAME: &str = "feature-hashing-v1";

/// Bag-of-words embedder using the hashing trick.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: VectorDimension,
    model_name: String,
}

impl HashingEmbedder {
    pub fn new(dimension: VectorDimension) -> Self {
        Self {
            dimension,
            model_name: format!("{HASHING_MODEL_NAME}-{}", dimension.get()),
        }
    }

    /// Raw (unnormalized) hashed term vector.
    fn raw_vector(&self, text: &str) -> Vec<f32> {
        let dim = self.dimension.get();
        let mut vector = vec![0.0f32; dim];

        for token in tokenize(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % dim as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(VectorDimension::dimension_384())
    }
}

impl Embedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let raw = texts.iter().map(|text| self.raw_vector(text)).collect();
        finish_batch(raw, texts.len(), self.dimension)
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}
