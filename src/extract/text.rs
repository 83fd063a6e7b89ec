//! Plain-text documents paginated with form feeds, as written by `pdftotext`.

use super::{PageText, TextExtractor};
use crate::error::ExtractionError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Page separator used by `pdftotext` and most print pipelines.
const FORM_FEED: char = '\x0c';

/// Reads UTF-8 text files, splitting pages on form feed characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    /// Split already-loaded text into non-empty pages.
    pub fn split_pages(content: &str) -> Vec<PageText> {
        content
            .split(FORM_FEED)
            .enumerate()
            .filter_map(|(i, page)| PageText::new(i as u32 + 1, page))
            .collect()
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractionError> {
        let mut file = File::open(path).map_err(|source| ExtractionError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| ExtractionError::Parse {
                path: path.to_path_buf(),
                reason: format!("not valid UTF-8 text: {e}"),
            })?;

        Ok(Self::split_pages(&content))
    }
}
