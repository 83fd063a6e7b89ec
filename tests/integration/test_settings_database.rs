//! Building a database from a settings file.

use crate::common::{TestCorpus, sample_docs};
use legalrag::config::EmbeddingBackend;
use legalrag::{SectionId, Settings, VectorDatabase};

fn write_settings(corpus: &TestCorpus, extra: &str) -> Settings {
    let config_path = corpus.path().join(".legalrag").join("settings.toml");
    std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    let toml = format!(
        r#"
[storage]
base_path = "{}"

[embedding]
backend = "hashing"
dimension = 256
{extra}
"#,
        corpus.index_dir().display()
    );
    std::fs::write(&config_path, toml).unwrap();
    Settings::load_from(&config_path).unwrap()
}

#[test]
fn test_from_settings_uses_configured_backend_and_path() {
    let corpus = TestCorpus::new();
    let settings = write_settings(&corpus, "");
    assert_eq!(settings.embedding.backend, EmbeddingBackend::Hashing);

    let doc = corpus.add_text_doc("civil.txt", &[sample_docs::LAWSUIT]);
    let mut db = VectorDatabase::from_settings(&settings).unwrap();
    db.load_documents(&[doc]).unwrap();

    assert_eq!(db.base_path(), corpus.index_dir());
    assert_eq!(db.embedder().dimension().get(), 256);
    assert!(corpus.index_dir().join("metadata.json").exists());
}

#[test]
fn test_page_labels_setting_is_applied() {
    let corpus = TestCorpus::new();
    let settings = write_settings(&corpus, "\n[ingest]\npage_labels = false\n");

    let doc = corpus.add_text_doc("fees.txt", &[sample_docs::FEES]);
    let mut db = VectorDatabase::from_settings(&settings).unwrap();
    db.load_documents(&[doc]).unwrap();

    assert_eq!(db.section(SectionId::new(0)), Some(sample_docs::FEES));
}

#[test]
fn test_unknown_model_is_reported() {
    let mut settings = Settings::default();
    settings.embedding.model = "word2vec".to_string();

    let err = VectorDatabase::from_settings(&settings).unwrap_err();
    assert_eq!(err.status_code(), "UNKNOWN_MODEL");
}
