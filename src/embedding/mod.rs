//! Embedding generation for document sections and queries.
//!
//! Every vector that leaves an [`Embedder`] has unit L2 norm, so the flat
//! index can rank by Euclidean distance and get cosine ordering for free.

mod hashing;
mod model;

pub use hashing::HashingEmbedder;
pub use model::{FastEmbedder, model_to_string, parse_embedding_model};

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::error::EmbeddingError;
use crate::types::VectorDimension;
use std::path::PathBuf;

/// Norms at or below this are treated as degenerate.
pub const MIN_NORM: f32 = 1e-12;

/// Trait for turning text into unit-length vectors.
pub trait Embedder {
    /// Identifier of the underlying model, persisted alongside the index.
    fn model_name(&self) -> &str;

    /// Dimension of every vector this embedder produces.
    fn dimension(&self) -> VectorDimension;

    /// Embed many texts in one underlying call.
    ///
    /// Output order matches input order and every vector is unit length.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embed a single text.
    fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or_else(|| EmbeddingError::Backend("model returned no embedding".to_string()))
    }
}

/// Normalize `vector` to unit length in place.
///
/// `index` identifies the input in error messages.
pub fn normalize(vector: &mut [f32], index: usize) -> Result<(), EmbeddingError> {
    let norm = l2_norm(vector);
    if !norm.is_finite() || norm <= MIN_NORM {
        return Err(EmbeddingError::DegenerateVector { index, norm });
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
    Ok(())
}

pub fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Validate and normalize raw model output for a batch.
pub(crate) fn finish_batch(
    mut vectors: Vec<Vec<f32>>,
    expected_len: usize,
    dimension: VectorDimension,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if vectors.len() != expected_len {
        return Err(EmbeddingError::Backend(format!(
            "model returned {} embeddings for {expected_len} inputs",
            vectors.len()
        )));
    }
    for (index, vector) in vectors.iter_mut().enumerate() {
        dimension.validate_vector(vector)?;
        normalize(vector, index)?;
    }
    Ok(vectors)
}

/// Directory where downloaded model files are cached.
pub fn models_dir(config: &EmbeddingConfig) -> PathBuf {
    if let Some(dir) = &config.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .map(|dir| dir.join("legalrag").join("models"))
        .unwrap_or_else(|| PathBuf::from(".legalrag/models"))
}

/// Build the embedder selected by configuration.
pub fn from_config(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>, EmbeddingError> {
    match config.backend {
        EmbeddingBackend::FastEmbed => Ok(Box::new(FastEmbedder::from_config(config)?)),
        EmbeddingBackend::Hashing => {
            let dimension = VectorDimension::new(config.dimension)?;
            Ok(Box::new(HashingEmbedder::new(dimension)))
        }
    }
}
