//! End-to-end ingestion and search over text documents.

use crate::common::{TestCorpus, sample_docs};
use legalrag::embedding::l2_norm;
use legalrag::{Embedder, HashingEmbedder, SectionId};

#[test]
fn test_lawsuit_question_retrieves_lawsuit_section() {
    let corpus = TestCorpus::new();
    let civil = corpus.add_text_doc("civil_procedure.txt", &[sample_docs::LAWSUIT]);
    let compliance = corpus.add_text_doc("compliance.txt", &[sample_docs::COMPLIANCE]);

    let mut db = corpus.open_db();
    db.load_documents(&[civil, compliance]).unwrap();

    let results = db.search("how do I start a lawsuit", 1).unwrap();
    assert_eq!(results, vec![format!("Page 1: {}", sample_docs::LAWSUIT)]);
}

#[test]
fn test_ids_follow_path_then_page_order() {
    let corpus = TestCorpus::new();
    let first = corpus.add_text_doc(
        "first.txt",
        &[sample_docs::LAWSUIT, "", sample_docs::SUMMONS],
    );
    let second = corpus.add_text_doc("second.txt", &[sample_docs::APPEAL, sample_docs::FEES]);

    let mut db = corpus.open_db();
    let report = db.load_documents(&[&first, &second]).unwrap();
    assert_eq!(report.sections_indexed, 4);

    let expected = [
        format!("Page 1: {}", sample_docs::LAWSUIT),
        format!("Page 3: {}", sample_docs::SUMMONS),
        format!("Page 1: {}", sample_docs::APPEAL),
        format!("Page 2: {}", sample_docs::FEES),
    ];
    for (row, text) in expected.iter().enumerate() {
        assert_eq!(db.section(SectionId::from_row(row)), Some(text.as_str()));
    }
    assert_eq!(db.section(SectionId::from_row(4)), None);
}

#[test]
fn test_second_ingestion_is_a_noop() {
    let corpus = TestCorpus::new();
    let civil = corpus.add_text_doc("civil.txt", &[sample_docs::LAWSUIT, sample_docs::SUMMONS]);
    let other = corpus.add_text_doc("other.txt", &[sample_docs::FEES]);

    let mut db = corpus.open_db();
    db.load_documents(&[&civil]).unwrap();
    let before = db.search_hits("complaint", 10).unwrap();

    let report = db.load_documents(&[&other, &civil]).unwrap();
    assert_eq!(report.sections_indexed, 0);
    assert_eq!(db.section_count(), 2);
    assert_eq!(db.search_hits("complaint", 10).unwrap(), before);

    // Also a no-op across a restart
    let mut reopened = corpus.open_db();
    reopened.load_documents(&[&other]).unwrap();
    assert_eq!(reopened.section_count(), 2);
}

#[test]
fn test_results_are_ranked_and_capped() {
    let corpus = TestCorpus::new();
    let doc = corpus.add_text_doc(
        "guide.txt",
        &[sample_docs::LAWSUIT, sample_docs::APPEAL, sample_docs::FEES],
    );

    let mut db = corpus.open_db();
    db.load_documents(&[doc]).unwrap();

    let hits = db.search_hits("filing an appeal after judgment", 10).unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().all(|hit| !hit.text.is_empty()));
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    assert_eq!(hits[0].text, format!("Page 2: {}", sample_docs::APPEAL));

    let texts = db.search("filing an appeal after judgment", 10).unwrap();
    let hit_texts: Vec<String> = hits.into_iter().map(|hit| hit.text).collect();
    assert_eq!(texts, hit_texts);
}

#[test]
fn test_fresh_database_search_is_empty() {
    let corpus = TestCorpus::new();
    let db = corpus.open_db();
    assert!(db.search("statute of limitations", 5).unwrap().is_empty());
}

#[test]
fn test_blank_and_broken_documents() {
    let corpus = TestCorpus::new();
    let blank = corpus.add_text_doc("blank.txt", &["   ", "\n\t\n"]);
    let missing = corpus.path().join("missing.pdf");
    let unsupported = corpus.add_text_doc("notes.docx", &["ignored"]);

    let mut db = corpus.open_db();
    let report = db.load_documents(&[&blank, &missing, &unsupported]).unwrap();

    assert_eq!(report.documents_processed, 1);
    assert_eq!(report.documents_skipped.len(), 2);
    assert_eq!(report.sections_indexed, 0);
    assert!(db.is_empty());
    assert!(!corpus.index_dir().exists());
}

#[test]
fn test_stored_vectors_are_unit_norm() {
    let embedder = HashingEmbedder::default();
    let texts = [
        sample_docs::LAWSUIT,
        sample_docs::COMPLIANCE,
        sample_docs::SUMMONS,
        sample_docs::APPEAL,
        sample_docs::FEES,
    ];
    for vector in embedder.embed_batch(&texts).unwrap() {
        assert!((l2_norm(&vector) - 1.0).abs() < 1e-5);
    }
}
