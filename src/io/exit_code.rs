//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - results found, or the command has no results to report
//! - `1`: General error - unspecified failure
//! - `2`: Blocking error - persisted state is unusable
//! - `3-125`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::{DatabaseError, EmbeddingError, PersistenceError};

/// Standard exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Critical error that should halt automation (code 2)
    BlockingError = 2,

    /// Query ran but found no sections (code 3)
    NotFound = 3,

    /// Embedding model could not be loaded or run (code 4)
    ModelError = 4,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,

    /// Index corruption detected (code 7)
    IndexCorrupted = 7,

    /// Query could not be embedded (code 8)
    InvalidQuery = 8,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// `Success` when at least one result was found, `NotFound` otherwise.
    pub fn from_results<T>(results: &[T]) -> Self {
        if results.is_empty() {
            ExitCode::NotFound
        } else {
            ExitCode::Success
        }
    }

    /// Map a database error to the exit code scripts should act on.
    pub fn from_error(error: &DatabaseError) -> Self {
        match error {
            DatabaseError::Persistence(PersistenceError::Io { .. }) => ExitCode::IoError,
            DatabaseError::Persistence(PersistenceError::Corrupt { .. })
            | DatabaseError::Persistence(PersistenceError::UnsupportedVersion { .. }) => {
                ExitCode::IndexCorrupted
            }
            DatabaseError::Inconsistent { .. } => ExitCode::BlockingError,
            DatabaseError::Embedding(EmbeddingError::UnknownModel(_))
            | DatabaseError::Embedding(EmbeddingError::InvalidDimension(_)) => {
                ExitCode::ConfigError
            }
            DatabaseError::Embedding(EmbeddingError::DegenerateVector { .. }) => {
                ExitCode::InvalidQuery
            }
            DatabaseError::Embedding(_) => ExitCode::ModelError,
            _ => ExitCode::GeneralError,
        }
    }

    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(self, ExitCode::BlockingError)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Get a human-readable description of the exit code.
    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::BlockingError => "Blocking error - automation should halt",
            ExitCode::NotFound => "Not found",
            ExitCode::ModelError => "Embedding model error",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
            ExitCode::IndexCorrupted => "Index corrupted",
            ExitCode::InvalidQuery => "Invalid query",
        }
    }
}
