//! FastEmbed-backed embedder.
//!
//! Runs ONNX sentence-transformer models locally. The default
//! all-MiniLM-L6-v2 produces 384-dimensional embeddings.

use super::{Embedder, finish_batch, models_dir};
use crate::config::EmbeddingConfig;
use crate::error::EmbeddingError;
use crate::types::VectorDimension;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use tracing::info;

/// Embedder running a FastEmbed text model.
pub struct FastEmbedder {
    /// The embedding model (wrapped in Mutex because `embed` needs exclusive access)
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimension: VectorDimension,
    batch_size: Option<usize>,
}

impl std::fmt::Debug for FastEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedder")
            .field("model", &self.model_name)
            .field("dimension", &self.dimension)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl FastEmbedder {
    /// Create an embedder from the `[embedding]` settings.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let model = parse_embedding_model(&config.model)?;
        let model_name = model_to_string(&model);
        let cache_dir = models_dir(config);

        let has_cached_models = cache_dir.exists()
            && cache_dir
                .read_dir()
                .is_ok_and(|mut entries| entries.any(|_| true));
        if has_cached_models {
            info!(model = %config.model, "loading embedding model from cache");
        } else {
            info!(model = %config.model, "downloading embedding model (first time only)");
        }

        let mut text_model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(config.show_download_progress),
        )
        .map_err(|e| EmbeddingError::ModelInit(e.to_string()))?;

        // Dimension comes from a probe embedding rather than a lookup table
        let probe = text_model
            .embed(vec!["dimension probe"], None)
            .map_err(|e| EmbeddingError::Backend(e.to_string()))?;
        let width = probe.first().map(Vec::len).unwrap_or(0);
        let dimension = VectorDimension::new(width)?;

        Ok(Self {
            model: Mutex::new(text_model),
            model_name,
            dimension,
            batch_size: config.batch_size,
        })
    }
}

impl Embedder for FastEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self
            .model
            .lock()
            .embed(texts.to_vec(), self.batch_size)
            .map_err(|e| EmbeddingError::Backend(format!("Failed to generate embeddings: {e}")))?;

        finish_batch(embeddings, texts.len(), self.dimension)
    }
}

/// Parse a model identifier from configuration.
///
/// Accepts FastEmbed variant names (`AllMiniLML6V2`) as well as the
/// sentence-transformers spelling (`all-MiniLM-L6-v2`), case-insensitively.
pub fn parse_embedding_model(name: &str) -> Result<EmbeddingModel, EmbeddingError> {
    let key: String = name
        .rsplit('/')
        .next()
        .unwrap_or(name)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let model = match key.as_str() {
        "allminilml6v2" => EmbeddingModel::AllMiniLML6V2,
        "allminilml12v2" => EmbeddingModel::AllMiniLML12V2,
        "bgesmallenv15" => EmbeddingModel::BGESmallENV15,
        "bgebaseenv15" => EmbeddingModel::BGEBaseENV15,
        "bgelargeenv15" => EmbeddingModel::BGELargeENV15,
        "multilinguale5small" => EmbeddingModel::MultilingualE5Small,
        "multilinguale5base" => EmbeddingModel::MultilingualE5Base,
        "paraphrasemultilingualminilml12v2" | "paraphrasemlminilml12v2" => {
            EmbeddingModel::ParaphraseMLMiniLML12V2
        }
        "nomicembedtextv15" => EmbeddingModel::NomicEmbedTextV15,
        _ => return Err(EmbeddingError::UnknownModel(name.to_string())),
    };
    Ok(model)
}

/// Canonical name recorded in index metadata.
pub fn model_to_string(model: &EmbeddingModel) -> String {
    format!("{model:?}")
}
