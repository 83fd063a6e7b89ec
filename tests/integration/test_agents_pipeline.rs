//! Query and summarization agents over a real database.

use crate::common::{TestCorpus, sample_docs};
use legalrag::agents::{
    Agent, EmptyReason, ExcerptSummarizer, NO_SECTIONS_MESSAGE, QueryAgent, QueryOutcome,
    SUMMARY_FALLBACK, SummarizationAgent, Summarizer,
};

struct OfflineModel;

impl Summarizer for OfflineModel {
    fn summarize(&self, _sections: &[String]) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

#[test]
fn test_question_to_answer() {
    let corpus = TestCorpus::new();
    let doc = corpus.add_text_doc(
        "civil.txt",
        &[sample_docs::LAWSUIT, sample_docs::COMPLIANCE, sample_docs::SUMMONS],
    );
    let mut db = corpus.open_db();
    db.load_documents(&[doc]).unwrap();

    let outcome = QueryAgent::new(&db, 2).process("how do I start a lawsuit");
    let sections = match outcome {
        QueryOutcome::Found(sections) => sections,
        other => panic!("Expected sections, got {other:?}"),
    };
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0], format!("Page 1: {}", sample_docs::LAWSUIT));

    let answer = SummarizationAgent::new(ExcerptSummarizer::default()).process(&sections);
    assert!(answer.contains(sample_docs::LAWSUIT));
}

#[test]
fn test_empty_reasons_are_distinguished() {
    let corpus = TestCorpus::new();
    let mut db = corpus.open_db();

    assert_eq!(
        QueryAgent::new(&db, 3).process("lawsuit"),
        QueryOutcome::Empty(EmptyReason::NothingIndexed)
    );

    let doc = corpus.add_text_doc("civil.txt", &[sample_docs::LAWSUIT]);
    db.load_documents(&[doc]).unwrap();

    assert!(matches!(
        QueryAgent::new(&db, 3).process("..."),
        QueryOutcome::Empty(EmptyReason::InvalidQuery(_))
    ));
    assert_eq!(
        QueryAgent::new(&db, 0).process("lawsuit"),
        QueryOutcome::Empty(EmptyReason::NoMatches)
    );
}

#[test]
fn test_summarizer_failure_returns_fallback() {
    let agent = SummarizationAgent::new(OfflineModel);
    assert_eq!(agent.name(), "summarization");
    assert_eq!(
        agent.process(&[format!("Page 1: {}", sample_docs::FEES)]),
        SUMMARY_FALLBACK
    );
    assert_eq!(agent.process(&[]), NO_SECTIONS_MESSAGE);
}
