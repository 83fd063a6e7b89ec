//! Semantic retrieval with the real FastEmbed model.

use crate::common::{TestCorpus, sample_docs};
use legalrag::config::EmbeddingConfig;
use legalrag::{FastEmbedder, VectorDatabase};

#[test]
#[ignore = "Downloads 86MB model - run with --ignored for semantic tests"]
fn test_paraphrased_question_finds_section() {
    let corpus = TestCorpus::new();
    let config = EmbeddingConfig {
        cache_dir: Some(corpus.path().join("models")),
        show_download_progress: false,
        ..EmbeddingConfig::default()
    };
    let embedder = FastEmbedder::from_config(&config).unwrap();

    let civil = corpus.add_text_doc("civil.txt", &[sample_docs::LAWSUIT, sample_docs::APPEAL]);
    let compliance = corpus.add_text_doc("compliance.txt", &[sample_docs::COMPLIANCE]);

    let mut db = VectorDatabase::open(corpus.index_dir(), Box::new(embedder));
    db.load_documents(&[civil, compliance]).unwrap();

    let top = db.search("how do I sue someone", 1).unwrap();
    assert_eq!(top, vec![format!("Page 1: {}", sample_docs::LAWSUIT)]);

    let top = db.search("deadline to challenge a court decision", 1).unwrap();
    assert_eq!(top, vec![format!("Page 2: {}", sample_docs::APPEAL)]);
}
