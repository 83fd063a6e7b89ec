//! Persistence round trips and fallback behavior on damaged state.

use crate::common::{TestCorpus, open_hashing_db, sample_docs};
use legalrag::database::{INDEX_FILE, SECTIONS_FILE};
use legalrag::{FlatIndex, IndexMetadata, SectionStore};

fn populated(corpus: &TestCorpus) {
    let doc = corpus.add_text_doc(
        "guide.txt",
        &[sample_docs::LAWSUIT, sample_docs::COMPLIANCE, sample_docs::APPEAL],
    );
    let mut db = corpus.open_db();
    db.load_documents(&[doc]).unwrap();
}

#[test]
fn test_restart_reproduces_search_results() {
    let corpus = TestCorpus::new();
    let doc = corpus.add_text_doc(
        "guide.txt",
        &[sample_docs::LAWSUIT, sample_docs::COMPLIANCE, sample_docs::APPEAL],
    );

    let queries = ["start a lawsuit", "annual compliance", "appeal deadline"];
    let before: Vec<_> = {
        let mut db = corpus.open_db();
        db.load_documents(&[doc]).unwrap();
        queries
            .iter()
            .map(|q| db.search_hits(q, 3).unwrap())
            .collect()
    };

    let db = corpus.open_db();
    let after: Vec<_> = queries
        .iter()
        .map(|q| db.search_hits(q, 3).unwrap())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_persisted_files_are_consistent() {
    let corpus = TestCorpus::new();
    populated(&corpus);

    let index = FlatIndex::load(&corpus.index_dir().join(INDEX_FILE)).unwrap();
    let store = SectionStore::load(&corpus.index_dir().join(SECTIONS_FILE)).unwrap();
    let metadata = IndexMetadata::load(&corpus.index_dir()).unwrap();

    assert_eq!(index.size(), 3);
    assert_eq!(store.len(), 3);
    assert!(store.is_contiguous());
    assert_eq!(store.next_id().value(), 3);
    assert_eq!(metadata.section_count, 3);
    assert_eq!(metadata.dimension, index.dimension().get());
}

#[test]
fn test_truncated_store_falls_back_to_empty() {
    let corpus = TestCorpus::new();
    populated(&corpus);

    let path = corpus.index_dir().join(SECTIONS_FILE);
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let db = corpus.open_db();
    assert!(db.is_empty());
    assert!(db.search("lawsuit", 3).unwrap().is_empty());
}

#[test]
fn test_mismatched_row_counts_fall_back_to_empty() {
    let corpus = TestCorpus::new();
    populated(&corpus);

    // Store from a different, smaller ingestion
    let mut store = SectionStore::new();
    store.append("Page 1: only one");
    store.save(&corpus.index_dir().join(SECTIONS_FILE)).unwrap();

    assert!(corpus.open_db().is_empty());
}

#[test]
fn test_other_model_starts_empty_and_can_rebuild() {
    let corpus = TestCorpus::new();
    populated(&corpus);

    let mut db = open_hashing_db(&corpus.index_dir(), 128);
    assert!(db.is_empty());

    let doc = corpus.add_text_doc("fees.txt", &[sample_docs::FEES]);
    db.load_documents(&[doc]).unwrap();
    assert_eq!(db.section_count(), 1);
    assert_eq!(
        db.metadata().unwrap().model_name,
        "feature-hashing-v1-128"
    );

    // The rebuilt state is now the persisted one
    assert_eq!(open_hashing_db(&corpus.index_dir(), 128).section_count(), 1);
}

#[test]
fn test_reset_removes_files() {
    let corpus = TestCorpus::new();
    populated(&corpus);

    let mut db = corpus.open_db();
    assert_eq!(db.section_count(), 3);
    db.reset().unwrap();

    assert!(db.is_empty());
    assert!(!corpus.index_dir().join(INDEX_FILE).exists());
    assert!(!IndexMetadata::exists(&corpus.index_dir()));
    assert!(corpus.open_db().is_empty());
}
