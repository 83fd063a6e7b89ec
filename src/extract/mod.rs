//! Page-level text extraction from source documents.
//!
//! Every extractor yields the non-empty pages of a document in page order.
//! Whitespace-only pages are dropped here so they never reach the embedder.

mod pdf;
mod text;

pub use pdf::PdfExtractor;
pub use text::PlainTextExtractor;

use crate::error::ExtractionError;
use std::path::Path;

/// Text of one physical page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page number in the source document
    pub page_number: u32,
    /// Trimmed, non-empty page text
    pub text: String,
}

impl PageText {
    /// Builds a page, returning `None` for whitespace-only text.
    pub fn new(page_number: u32, raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            page_number,
            text: text.to_string(),
        })
    }

    /// Page text prefixed with its provenance label, e.g. `Page 3: ...`.
    pub fn labeled(&self) -> String {
        format!("Page {}: {}", self.page_number, self.text)
    }

    /// Section text for indexing, with or without the page label.
    pub fn into_section(self, label: bool) -> String {
        if label { self.labeled() } else { self.text }
    }
}

/// Trait for turning a document file into page texts.
pub trait TextExtractor {
    /// Extract the non-empty pages of the document at `path`, in page order.
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractionError>;
}

/// Extractor that dispatches on file extension.
///
/// `.pdf` goes through [`PdfExtractor`]; `.txt`, `.text` and `.md` through
/// [`PlainTextExtractor`]. Anything else is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor {
    pdf: PdfExtractor,
    text: PlainTextExtractor,
}

impl DocumentExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractionError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => self.pdf.extract_pages(path),
            "txt" | "text" | "md" => self.text.extract_pages(path),
            _ => Err(ExtractionError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}
