//! Vector database: the composition root tying extraction, embedding, the
//! flat index and the section store together.
//!
//! On-disk layout under `base_path`:
//! - `vector_index.bin` - [`FlatIndex`] rows
//! - `sections.bin` - [`SectionStore`] entries, co-indexed with the rows
//! - `metadata.json` - [`IndexMetadata`] sidecar
//!
//! Loading never fails: a missing, corrupt or incompatible state is logged
//! and replaced by an empty one. Saving failures are surfaced, since losing
//! freshly computed embeddings silently is worse than an error.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::embedding::{self, Embedder};
use crate::error::{
    DatabaseError, DatabaseResult, EmbeddingError, PersistenceError, SearchError,
};
use crate::extract::{DocumentExtractor, TextExtractor};
use crate::index::FlatIndex;
use crate::metadata::IndexMetadata;
use crate::store::SectionStore;
use crate::types::{SearchHit, SectionId};

/// File name of the persisted vector index.
pub const INDEX_FILE: &str = "vector_index.bin";

/// File name of the persisted section store.
pub const SECTIONS_FILE: &str = "sections.bin";

/// A document that was skipped during ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of [`VectorDatabase::load_documents`].
///
/// All zeros when the index was already populated and ingestion was skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub documents_processed: usize,
    pub documents_skipped: Vec<SkippedDocument>,
    pub sections_indexed: usize,
    /// Non-blank pages dropped because they embed to a zero vector
    pub sections_skipped: usize,
}

/// Persistent semantic index over legal document sections.
pub struct VectorDatabase {
    base_path: PathBuf,
    embedder: Box<dyn Embedder>,
    extractor: Box<dyn TextExtractor>,
    index: FlatIndex,
    store: SectionStore,
    metadata: Option<IndexMetadata>,
    page_labels: bool,
}

impl std::fmt::Debug for VectorDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorDatabase")
            .field("base_path", &self.base_path)
            .field("model", &self.embedder.model_name())
            .field("dimension", &self.index.dimension())
            .field("sections", &self.store.len())
            .field("page_labels", &self.page_labels)
            .finish()
    }
}

impl VectorDatabase {
    /// Open the database stored under `base_path`, or start empty.
    pub fn open(base_path: impl Into<PathBuf>, embedder: Box<dyn Embedder>) -> Self {
        let base_path = base_path.into();
        let (index, store, metadata) = load_state(&base_path, embedder.as_ref());

        info!(
            path = %base_path.display(),
            model = embedder.model_name(),
            sections = store.len(),
            "opened vector database"
        );

        Self {
            base_path,
            embedder,
            extractor: Box::new(DocumentExtractor::new()),
            index,
            store,
            metadata,
            page_labels: true,
        }
    }

    /// Build the embedder from settings and open the configured storage.
    pub fn from_settings(settings: &Settings) -> DatabaseResult<Self> {
        let embedder = embedding::from_config(&settings.embedding)?;
        Ok(Self::open(settings.index_dir(), embedder).with_page_labels(settings.ingest.page_labels))
    }

    /// Replace the document extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Whether new sections are prefixed with `Page N: `.
    #[must_use]
    pub fn with_page_labels(mut self, page_labels: bool) -> Self {
        self.page_labels = page_labels;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    pub fn section_count(&self) -> usize {
        self.index.size()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn metadata(&self) -> Option<&IndexMetadata> {
        self.metadata.as_ref()
    }

    /// Text of a stored section.
    pub fn section(&self, id: SectionId) -> Option<&str> {
        self.store.get(id)
    }

    /// Extract, embed and index `paths` unless the index is already populated.
    ///
    /// Files that cannot be extracted are logged and skipped. When nothing
    /// at all is extracted the database is left untouched and nothing is
    /// written to disk.
    pub fn load_documents<P: AsRef<Path>>(&mut self, paths: &[P]) -> DatabaseResult<IngestReport> {
        if !self.index.is_empty() {
            info!(
                sections = self.index.size(),
                "index already populated, skipping ingestion"
            );
            return Ok(IngestReport::default());
        }

        let mut report = IngestReport::default();
        let mut sections: Vec<String> = Vec::new();

        for path in paths {
            let path = path.as_ref();
            match self.extractor.extract_pages(path) {
                Ok(pages) => {
                    debug!(path = %path.display(), pages = pages.len(), "extracted document");
                    report.documents_processed += 1;
                    sections.extend(
                        pages
                            .into_iter()
                            .map(|page| page.into_section(self.page_labels)),
                    );
                }
                Err(e) => {
                    warn!(path = %path.display(), code = e.status_code(), "skipping document: {e}");
                    report.documents_skipped.push(SkippedDocument {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let vectors = if sections.is_empty() {
            Vec::new()
        } else {
            self.embed_sections(&mut sections, &mut report)?
        };
        if sections.is_empty() {
            info!(
                documents = paths.len(),
                "nothing to index, leaving index unchanged"
            );
            return Ok(report);
        }

        let first_row = self.index.add(&vectors)?;
        let ids = self.store.append_batch(sections);
        if ids.start.as_row() != first_row || self.store.len() != self.index.size() {
            self.rollback(first_row, ids.start);
            return Err(DatabaseError::Inconsistent {
                reason: format!(
                    "store assigned ids from {} but index rows start at {first_row}",
                    ids.start
                ),
            });
        }

        // Rows in memory are always rows on disk
        if let Err(e) = self.persist() {
            warn!(sections = vectors.len(), "save failed, discarding batch: {e}");
            self.rollback(first_row, ids.start);
            return Err(e);
        }
        report.sections_indexed = vectors.len();

        info!(
            documents = report.documents_processed,
            skipped = report.documents_skipped.len(),
            sections = report.sections_indexed,
            "indexed documents"
        );
        Ok(report)
    }

    /// Embed `sections` in one batch, dropping any with a degenerate vector.
    ///
    /// Falls back to one call per section only when the batch contains such
    /// a section; `sections` is left holding exactly the embedded texts.
    fn embed_sections(
        &self,
        sections: &mut Vec<String>,
        report: &mut IngestReport,
    ) -> DatabaseResult<Vec<Vec<f32>>> {
        let texts: Vec<&str> = sections.iter().map(String::as_str).collect();
        match self.embedder.embed_batch(&texts) {
            Ok(vectors) => return Ok(vectors),
            Err(EmbeddingError::DegenerateVector { index, .. }) => {
                debug!(index, "degenerate section in batch, embedding one at a time");
            }
            Err(e) => return Err(e.into()),
        }

        let mut kept = Vec::with_capacity(sections.len());
        let mut vectors = Vec::with_capacity(sections.len());
        for section in sections.drain(..) {
            match self.embedder.embed_one(&section) {
                Ok(vector) => {
                    vectors.push(vector);
                    kept.push(section);
                }
                Err(EmbeddingError::DegenerateVector { .. }) => {
                    let preview: String = section.chars().take(60).collect();
                    warn!("dropping section with no embeddable content: {preview}");
                    report.sections_skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
        *sections = kept;
        Ok(vectors)
    }

    fn rollback(&mut self, first_row: usize, first_id: SectionId) {
        self.index.truncate(first_row);
        self.store.rollback_to(first_id);
    }

    /// Texts of the `top_k` sections nearest to `query`, closest first.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<String>, SearchError> {
        Ok(self
            .search_hits(query, top_k)?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// Like [`VectorDatabase::search`] but keeps ids and distances.
    ///
    /// Rows with no stored text are dropped; the order is the index order.
    pub fn search_hits(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, SearchError> {
        if self.index.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_one(query)?;
        let neighbors = self.index.search(&query_vector, top_k)?;

        let hits = neighbors
            .into_iter()
            .filter_map(|neighbor| {
                let section_id = SectionId::from_row(neighbor.row);
                match self.store.get(section_id) {
                    Some(text) => Some(SearchHit {
                        section_id,
                        distance: neighbor.distance,
                        text: text.to_string(),
                    }),
                    None => {
                        debug!(%section_id, "no text stored for index row");
                        None
                    }
                }
            })
            .collect();
        Ok(hits)
    }

    /// Delete persisted files and clear in-memory state.
    pub fn reset(&mut self) -> DatabaseResult<()> {
        for name in [INDEX_FILE, SECTIONS_FILE, crate::metadata::METADATA_FILE] {
            let path = self.base_path.join(name);
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(PersistenceError::io(path, e).into()),
            }
        }

        self.index = FlatIndex::new(self.embedder.dimension());
        self.store = SectionStore::new();
        self.metadata = None;
        info!(path = %self.base_path.display(), "reset vector database");
        Ok(())
    }

    fn persist(&mut self) -> DatabaseResult<()> {
        std::fs::create_dir_all(&self.base_path)
            .map_err(|e| PersistenceError::io(&self.base_path, e))?;

        self.index.save(&self.base_path.join(INDEX_FILE))?;
        self.store.save(&self.base_path.join(SECTIONS_FILE))?;

        let metadata = match &self.metadata {
            Some(existing) => {
                let mut updated = existing.clone();
                updated.update(self.store.len());
                updated
            }
            None => IndexMetadata::new(
                self.embedder.model_name(),
                self.embedder.dimension().get(),
                self.store.len(),
            ),
        };
        metadata.save(&self.base_path)?;
        self.metadata = Some(metadata);
        Ok(())
    }
}

/// Load persisted state, falling back to empty on any problem.
fn load_state(
    base_path: &Path,
    embedder: &dyn Embedder,
) -> (FlatIndex, SectionStore, Option<IndexMetadata>) {
    let empty = || (FlatIndex::new(embedder.dimension()), SectionStore::new(), None);

    let index_path = base_path.join(INDEX_FILE);
    let sections_path = base_path.join(SECTIONS_FILE);

    if !index_path.exists() && !sections_path.exists() {
        debug!(path = %base_path.display(), "no persisted index, starting empty");
        return empty();
    }

    let index = match FlatIndex::load(&index_path) {
        Ok(index) => index,
        Err(e) => {
            warn!(code = e.status_code(), "failed to load vector index, starting empty: {e}");
            return empty();
        }
    };

    let store = match SectionStore::load(&sections_path) {
        Ok(store) => store,
        Err(e) => {
            warn!(code = e.status_code(), "failed to load section store, starting empty: {e}");
            return empty();
        }
    };

    let metadata = if IndexMetadata::exists(base_path) {
        match IndexMetadata::load(base_path) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!(code = e.status_code(), "failed to load index metadata, starting empty: {e}");
                return empty();
            }
        }
    } else {
        None
    };

    if let Some(metadata) = &metadata {
        if metadata.model_name != embedder.model_name() {
            warn!(
                stored = %metadata.model_name,
                configured = embedder.model_name(),
                "index was built with a different embedding model, starting empty"
            );
            return empty();
        }
    }

    if index.dimension() != embedder.dimension() {
        warn!(
            stored = index.dimension().get(),
            configured = embedder.dimension().get(),
            "index dimension does not match the embedder, starting empty"
        );
        return empty();
    }

    if index.size() != store.len() || !store.is_contiguous() {
        warn!(
            rows = index.size(),
            sections = store.len(),
            "vector index and section store disagree, starting empty"
        );
        return empty();
    }

    (index, store, metadata)
}
