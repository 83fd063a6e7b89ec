//! Error types for the retrieval core
//!
//! This module provides structured error types using thiserror, one enum per
//! concern, so callers can tell a skipped document from a failed save.

use std::path::PathBuf;
use thiserror::Error;

/// A document could not be turned into page texts.
///
/// Ingestion recovers from these locally: the file is logged and skipped.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to open document '{path}': {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse document '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Unsupported document type '{extension}' for '{path}'. Supported types: .pdf, .txt, .text, .md")]
    UnsupportedFormat { path: PathBuf, extension: String },
}

impl ExtractionError {
    /// Path of the document that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. }
            | Self::Parse { path, .. }
            | Self::UnsupportedFormat { path, .. } => path,
        }
    }

    pub fn status_code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "DOCUMENT_OPEN_ERROR",
            Self::Parse { .. } => "DOCUMENT_PARSE_ERROR",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_DOCUMENT_TYPE",
        }
    }
}

/// Errors raised while turning text into vectors.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error(
        "Embedding for input {index} has near-zero norm ({norm:e}) and cannot be normalized\nSuggestion: Inspect the input text, it may be empty or contain no tokens"
    )]
    DegenerateVector { index: usize, norm: f32 },

    #[error(
        "Failed to initialize embedding model: {0}\nSuggestion: Ensure you have internet connection for first-time model download"
    )]
    ModelInit(String),

    #[error("Embedding generation failed: {0}")]
    Backend(String),

    #[error(
        "Embedding dimension mismatch: expected {expected}, got {actual}\nSuggestion: Ensure all vectors use the same embedding model"
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Unknown embedding model '{0}'. Try AllMiniLML6V2, BGESmallENV15 or BGEBaseENV15")]
    UnknownModel(String),

    #[error("Invalid embedding dimension: {0}")]
    InvalidDimension(usize),
}

impl EmbeddingError {
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::DegenerateVector { .. } => "DEGENERATE_VECTOR",
            Self::ModelInit(_) => "MODEL_INIT_ERROR",
            Self::Backend(_) => "EMBEDDING_ERROR",
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Self::UnknownModel(_) => "UNKNOWN_MODEL",
            Self::InvalidDimension(_) => "INVALID_DIMENSION",
        }
    }
}

/// Errors reading or writing the persisted index state.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Persisted file '{path}' is corrupted: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Failed to encode '{path}': {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Unsupported format version {found} in '{path}' (supported: {supported})")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "PERSISTENCE_IO_ERROR",
            Self::Corrupt { .. } => "INDEX_CORRUPTED",
            Self::Encode { .. } => "ENCODE_ERROR",
            Self::UnsupportedVersion { .. } => "UNSUPPORTED_VERSION",
        }
    }
}

/// Errors from the nearest-neighbor index itself.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error(
        "Vector dimension mismatch: expected {expected}, got {actual}\nSuggestion: Ensure all vectors use the same embedding model"
    )]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors surfaced by `VectorDatabase::search`.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

impl SearchError {
    /// True when the query itself was unusable rather than the subsystem failing.
    pub fn is_invalid_query(&self) -> bool {
        matches!(
            self,
            Self::Embedding(EmbeddingError::DegenerateVector { .. })
        )
    }
}

/// Errors surfaced by `VectorDatabase` construction and ingestion.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Section store and vector index disagree: {reason}")]
    Inconsistent { reason: String },
}

impl DatabaseError {
    /// Get a stable status code for this error type.
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::Embedding(e) => e.status_code(),
            Self::Index(_) => "DIMENSION_MISMATCH",
            Self::Persistence(e) => e.status_code(),
            Self::Inconsistent { .. } => "INDEX_INCONSISTENT",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Persistence(PersistenceError::Io { .. }) => vec![
                "Check disk space and permissions in the storage directory",
                "Newly computed embeddings were not saved; run 'legalrag index' again",
            ],
            Self::Persistence(_) | Self::Inconsistent { .. } => vec![
                "Run 'legalrag index --force' to rebuild from scratch",
            ],
            Self::Embedding(EmbeddingError::ModelInit(_)) => vec![
                "Check network access for the first model download",
                "Set embedding.backend = \"hashing\" to work fully offline",
            ],
            Self::Embedding(EmbeddingError::DegenerateVector { .. }) => vec![
                "Inspect the input text; it produced an all-zero embedding",
            ],
            _ => vec![],
        }
    }
}

impl From<SearchError> for DatabaseError {
    fn from(error: SearchError) -> Self {
        match error {
            SearchError::Embedding(e) => Self::Embedding(e),
            SearchError::Index(e) => Self::Index(e),
        }
    }
}

/// Result type alias for ingestion and construction
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Result type alias for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;
