//! PDF page text extraction backed by `lopdf`.

use super::{PageText, TextExtractor};
use crate::error::ExtractionError;
use lopdf::Document;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Extracts text page by page from PDF files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Extract pages from an already-loaded document.
    ///
    /// A page whose content cannot be decoded is logged and treated as blank;
    /// only a document that fails to load is an error.
    pub fn pages_of(document: &Document, path: &Path) -> Vec<PageText> {
        let mut pages = Vec::new();

        for page_number in document.get_pages().into_keys() {
            match document.extract_text(&[page_number]) {
                Ok(raw) => {
                    if let Some(page) = PageText::new(page_number, &raw) {
                        pages.push(page);
                    } else {
                        debug!(path = %path.display(), page_number, "skipping blank page");
                    }
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        page_number,
                        "failed to decode page text, treating page as blank: {e}"
                    );
                }
            }
        }

        pages
    }
}

impl TextExtractor for PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractionError> {
        let file = File::open(path).map_err(|source| ExtractionError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let document =
            Document::load_from(BufReader::new(file)).map_err(|e| ExtractionError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if document.is_encrypted() {
            return Err(ExtractionError::Parse {
                path: path.to_path_buf(),
                reason: "document is encrypted".to_string(),
            });
        }

        Ok(Self::pages_of(&document, path))
    }
}
