//! Query and summarization agents built on top of [`VectorDatabase`].
//!
//! Agents are small, explicitly typed processing steps. Each one owns a
//! tracing span created at construction so its log lines carry the agent
//! name without any global logger state.

use tracing::{Span, debug, info_span, warn};

use crate::database::VectorDatabase;

/// Text returned when the summarizer fails.
pub const SUMMARY_FALLBACK: &str = "Unable to generate a summary of the legal information.";

/// Text returned when there is nothing to summarize.
pub const NO_SECTIONS_MESSAGE: &str = "No relevant legal sections were found for this question.";

/// A processing step with a fixed input and output type.
pub trait Agent {
    type Input: ?Sized;
    type Output;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn process(&self, input: &Self::Input) -> Self::Output;
}

/// Why a query produced no sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// Nothing has been ingested yet
    NothingIndexed,
    /// The index is populated but no section came back
    NoMatches,
    /// The query could not be embedded (e.g. no words)
    InvalidQuery(String),
    /// Embedding or index failure
    SearchFailed(String),
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingIndexed => write!(f, "no documents have been indexed"),
            Self::NoMatches => write!(f, "no matching sections"),
            Self::InvalidQuery(reason) => write!(f, "invalid query: {reason}"),
            Self::SearchFailed(reason) => write!(f, "search failed: {reason}"),
        }
    }
}

/// Result of a [`QueryAgent`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Found(Vec<String>),
    Empty(EmptyReason),
}

impl QueryOutcome {
    /// Sections found, empty for [`QueryOutcome::Empty`].
    pub fn sections(&self) -> &[String] {
        match self {
            Self::Found(sections) => sections,
            Self::Empty(_) => &[],
        }
    }

    pub fn into_sections(self) -> Vec<String> {
        match self {
            Self::Found(sections) => sections,
            Self::Empty(_) => Vec::new(),
        }
    }
}

/// Retrieves the sections most relevant to a question.
pub struct QueryAgent<'db> {
    database: &'db VectorDatabase,
    top_k: usize,
    span: Span,
}

impl<'db> QueryAgent<'db> {
    pub fn new(database: &'db VectorDatabase, top_k: usize) -> Self {
        Self {
            database,
            top_k,
            span: info_span!("query_agent", top_k),
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

impl Agent for QueryAgent<'_> {
    type Input = str;
    type Output = QueryOutcome;

    fn name(&self) -> &'static str {
        "query"
    }

    fn process(&self, query: &str) -> QueryOutcome {
        let _entered = self.span.enter();

        if self.database.is_empty() {
            debug!("query against empty index");
            return QueryOutcome::Empty(EmptyReason::NothingIndexed);
        }

        match self.database.search(query, self.top_k) {
            Ok(sections) if sections.is_empty() => QueryOutcome::Empty(EmptyReason::NoMatches),
            Ok(sections) => {
                debug!(found = sections.len(), "retrieved sections");
                QueryOutcome::Found(sections)
            }
            Err(e) if e.is_invalid_query() => {
                debug!("query rejected: {e}");
                QueryOutcome::Empty(EmptyReason::InvalidQuery(e.to_string()))
            }
            Err(e) => {
                warn!("search failed: {e}");
                QueryOutcome::Empty(EmptyReason::SearchFailed(e.to_string()))
            }
        }
    }
}

/// Turns retrieved sections into a plain-language answer.
///
/// This is where a language model plugs in.
pub trait Summarizer {
    fn summarize(&self, sections: &[String]) -> anyhow::Result<String>;
}

/// Offline summarizer that joins the retrieved sections.
///
/// Output is cut at `max_chars` characters on a char boundary, with an
/// ellipsis appended when truncated.
#[derive(Debug, Clone)]
pub struct ExcerptSummarizer {
    max_chars: usize,
}

impl ExcerptSummarizer {
    pub const DEFAULT_MAX_CHARS: usize = 1200;

    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Default for ExcerptSummarizer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_CHARS)
    }
}

impl Summarizer for ExcerptSummarizer {
    fn summarize(&self, sections: &[String]) -> anyhow::Result<String> {
        let joined = sections.join("\n\n");
        match joined.char_indices().nth(self.max_chars) {
            Some((cut, _)) => Ok(format!("{}...", joined[..cut].trim_end())),
            None => Ok(joined),
        }
    }
}

/// Summarizes retrieved sections, never failing.
pub struct SummarizationAgent<S> {
    summarizer: S,
    span: Span,
}

impl<S: Summarizer> SummarizationAgent<S> {
    pub fn new(summarizer: S) -> Self {
        Self {
            summarizer,
            span: info_span!("summarization_agent"),
        }
    }
}

impl<S: Summarizer> Agent for SummarizationAgent<S> {
    type Input = [String];
    type Output = String;

    fn name(&self) -> &'static str {
        "summarization"
    }

    fn process(&self, sections: &[String]) -> String {
        let _entered = self.span.enter();

        if sections.is_empty() {
            return NO_SECTIONS_MESSAGE.to_string();
        }

        match self.summarizer.summarize(sections) {
            Ok(summary) => summary,
            Err(e) => {
                warn!("summarizer failed: {e:#}");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }
}
