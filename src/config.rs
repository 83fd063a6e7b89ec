//! Configuration module for the legal document retrieval core.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `LEGALRAG_` and use double
//! underscores to separate nested levels:
//! - `LEGALRAG_RETRIEVAL__TOP_K=8` sets `retrieval.top_k`
//! - `LEGALRAG_EMBEDDING__BACKEND=hashing` sets `embedding.backend`
//! - `LEGALRAG_STORAGE__BASE_PATH=/data/index` sets `storage.base_path`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-workspace configuration directory.
pub const CONFIG_DIR: &str = ".legalrag";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "LEGALRAG_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Workspace root directory (where .legalrag is located)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Where the index files live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Embedding model settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Document ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Query settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StorageConfig {
    /// Directory holding the vector index, section store and metadata
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,
}

/// Which embedder produces vectors.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Local ONNX sentence-transformer model
    #[default]
    FastEmbed,
    /// Offline signed feature hashing, no model download
    Hashing,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// Model to use for embeddings (fastembed backend)
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimension (hashing backend; fastembed detects it from the model)
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Texts per model call; `None` lets fastembed choose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,

    /// Where downloaded model files are cached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub show_download_progress: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct IngestConfig {
    /// Documents indexed when `legalrag index` is run without paths
    #[serde(default)]
    pub documents: Vec<PathBuf>,

    /// Prefix each section with "Page N: "
    #[serde(default = "default_true")]
    pub page_labels: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RetrievalConfig {
    /// Number of sections returned per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// One of error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_base_path() -> PathBuf {
    PathBuf::from(".legalrag/index")
}
fn default_true() -> bool {
    true
}
fn default_embedding_model() -> String {
    "AllMiniLML6V2".to_string()
}
fn default_dimension() -> usize {
    crate::types::VECTOR_DIMENSION_384
}
fn default_top_k() -> usize {
    5
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            workspace_root: None,
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            ingest: IngestConfig::default(),
            retrieval: RetrievalConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model: default_embedding_model(),
            dimension: default_dimension(),
            batch_size: None,
            cache_dir: None,
            show_download_progress: true,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            page_labels: true,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Environment provider: `LEGALRAG_A__B` becomes `a.b`.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| {
        key.as_str()
            .to_lowercase()
            .replace("__", ".") // Double underscore becomes dot
            .into()
    })
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            .merge(env_provider())
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(env_provider())
            .extract()
            .map_err(Box::new)
    }

    /// Find the workspace config by looking for a .legalrag directory
    /// from the current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join("settings.toml"))
    }

    /// Get the workspace root directory (where .legalrag is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Storage directory, resolved against the workspace root when relative.
    pub fn index_dir(&self) -> PathBuf {
        let base = &self.storage.base_path;
        match &self.workspace_root {
            Some(root) if base.is_relative() => root.join(base),
            _ => base.clone(),
        }
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments.
    ///
    /// Returns the path written.
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        Self::init_config_file_in(Path::new("."), force)
    }

    /// Same as [`Settings::init_config_file`] with an explicit workspace root.
    pub fn init_config_file_in(
        root: &Path,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = root.join(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, CONFIG_TEMPLATE)?;
        Ok(config_path)
    }
}

const CONFIG_TEMPLATE: &str = r#"# legalrag configuration file

# Version of the configuration schema
version = 1

[storage]
# Directory for vector_index.bin, sections.bin and metadata.json
# (relative paths resolve against the workspace root)
base_path = ".legalrag/index"

[embedding]
# "fastembed" runs a local ONNX model (downloaded on first use)
# "hashing" is an offline bag-of-words embedder, useful for testing
backend = "fastembed"

# Model to use with the fastembed backend
model = "AllMiniLML6V2"

# Vector dimension for the hashing backend
dimension = 384

# Texts per model call (omit to let fastembed decide)
# batch_size = 64

# Where model files are cached (defaults to the user cache directory)
# cache_dir = "/path/to/models"

show_download_progress = true

[ingest]
# Documents indexed by `legalrag index` when no paths are given
documents = []

# Prefix each section with "Page N: "
page_labels = true

[retrieval]
# Sections returned per query
top_k = 5

[logging]
# error, warn, info, debug or trace
level = "info"
"#;
