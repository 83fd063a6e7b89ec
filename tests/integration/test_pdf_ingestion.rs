//! Ingestion of real PDF files.

use crate::common::{TestCorpus, sample_docs};
use legalrag::{DocumentExtractor, SectionId, TextExtractor};

#[test]
fn test_pdf_pages_become_labeled_sections() {
    let corpus = TestCorpus::new();
    let pdf = corpus.add_pdf_doc(
        "civil_procedure.pdf",
        &[Some(sample_docs::LAWSUIT), None, Some(sample_docs::SUMMONS)],
    );

    let pages = DocumentExtractor::new().extract_pages(&pdf).unwrap();
    assert_eq!(
        pages.iter().map(|p| p.page_number).collect::<Vec<_>>(),
        vec![1, 3]
    );

    let mut db = corpus.open_db();
    db.load_documents(&[&pdf]).unwrap();
    assert_eq!(db.section_count(), 2);
    assert!(db
        .section(SectionId::new(1))
        .unwrap()
        .starts_with("Page 3: "));
}

#[test]
fn test_mixed_pdf_and_text_corpus() {
    let corpus = TestCorpus::new();
    let pdf = corpus.add_pdf_doc("civil.pdf", &[Some(sample_docs::LAWSUIT)]);
    let text = corpus.add_text_doc("compliance.txt", &[sample_docs::COMPLIANCE]);

    let mut db = corpus.open_db();
    let report = db.load_documents(&[&pdf, &text]).unwrap();
    assert_eq!(report.documents_processed, 2);

    let top = db.search("how do I start a lawsuit", 1).unwrap();
    assert_eq!(top.len(), 1);
    assert!(top[0].contains("lawsuit"), "unexpected top hit: {}", top[0]);
}

#[test]
fn test_all_blank_pdf_leaves_index_empty() {
    let corpus = TestCorpus::new();
    let pdf = corpus.add_pdf_doc("blank.pdf", &[None, None]);

    let mut db = corpus.open_db();
    let report = db.load_documents(&[pdf]).unwrap();

    assert_eq!(report.sections_indexed, 0);
    assert!(db.is_empty());
}

#[test]
fn test_corrupt_pdf_is_skipped() {
    let corpus = TestCorpus::new();
    let broken = corpus.add_text_doc("broken.pdf", &["this file is not a pdf"]);
    let good = corpus.add_text_doc("good.txt", &[sample_docs::FEES]);

    let mut db = corpus.open_db();
    let report = db.load_documents(&[&broken, &good]).unwrap();

    assert_eq!(report.documents_skipped.len(), 1);
    assert_eq!(report.documents_skipped[0].path, broken);
    assert_eq!(db.section_count(), 1);
}
