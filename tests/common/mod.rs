#![allow(dead_code)]

use legalrag::{HashingEmbedder, VectorDatabase, VectorDimension};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch corpus plus storage directory for one test.
pub struct TestCorpus {
    pub dir: TempDir,
}

impl TestCorpus {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory where the database persists its files.
    pub fn index_dir(&self) -> PathBuf {
        self.dir.path().join("index")
    }

    /// Write a form-feed paginated text document.
    pub fn add_text_doc(&self, name: &str, pages: &[&str]) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&path, pages.join("\x0c")).expect("Failed to write document");
        path
    }

    /// Write a PDF with one page per entry; `None` is a blank page.
    pub fn add_pdf_doc(&self, name: &str, pages: &[Option<&str>]) -> PathBuf {
        let path = self.dir.path().join(name);
        write_pdf(&path, pages);
        path
    }

    /// Open the database with the offline hashing embedder.
    pub fn open_db(&self) -> VectorDatabase {
        open_hashing_db(&self.index_dir(), 384)
    }
}

pub fn open_hashing_db(base: &Path, dimension: usize) -> VectorDatabase {
    let embedder = HashingEmbedder::new(VectorDimension::new(dimension).unwrap());
    VectorDatabase::open(base, Box::new(embedder))
}

pub fn write_pdf(path: &Path, pages: &[Option<&str>]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = match text {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            None => Vec::new(),
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

pub mod sample_docs {
    pub const LAWSUIT: &str = "A lawsuit begins with filing a complaint.";
    pub const COMPLIANCE: &str = "Compliance requires annual filings.";
    pub const SUMMONS: &str = "The defendant must be served with a summons and a copy of the complaint.";
    pub const APPEAL: &str = "An appeal must be filed within thirty days of the judgment.";
    pub const FEES: &str = "Court filing fees may be waived for applicants who cannot afford them.";
}
