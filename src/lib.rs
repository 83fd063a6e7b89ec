//! Retrieval core for plain-language answers over legal documents.
//!
//! Documents are split into page sections, embedded into unit vectors and
//! kept in an exact nearest-neighbor index persisted next to a section store.
//! [`VectorDatabase`] ties the pieces together; [`agents`] builds the query
//! and summarization steps on top of it.

pub mod agents;
pub mod config;
pub mod database;
pub mod display;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod index;
pub mod io;
pub mod metadata;
pub mod store;
pub mod types;

// Explicit exports for better API clarity
pub use config::Settings;
pub use database::{IngestReport, SkippedDocument, VectorDatabase};
pub use embedding::{Embedder, FastEmbedder, HashingEmbedder};
pub use error::{
    DatabaseError, DatabaseResult, EmbeddingError, ExtractionError, IndexError, PersistenceError,
    SearchError,
};
pub use extract::{DocumentExtractor, PageText, TextExtractor};
pub use index::FlatIndex;
pub use metadata::IndexMetadata;
pub use store::SectionStore;
pub use types::{Neighbor, SearchHit, SectionId, VectorDimension};
