#![allow(dead_code)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bson::Document;
use sas2mongo::cli::{Cli, RunConfig};
use sas2mongo::error::{Result, Sas2MongoError};
use sas2mongo::sink::DocumentSink;
use tempfile::NamedTempFile;

pub fn csv_file(contents: &str) -> NamedTempFile {
    csv_bytes(contents.as_bytes())
}

pub fn csv_bytes(contents: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents).unwrap();
    file
}

/// Five-row WINDOWS-1252 dataset: ID, SBP, DBP, GENDER, AGE, WT.
/// The first GENDER cell is `é` (0xE9).
pub fn people_sas() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/people.sas7bdat")
}

/// Resolves a run configuration the way the binary does.
pub fn config(file: &Path, extra: &[&str]) -> RunConfig {
    use clap::Parser;

    let file = file.to_string_lossy().to_string();
    let mut args = vec!["sas2mongo", "-i", &file, "-o", "people", "-d", "test"];
    args.extend_from_slice(extra);
    Cli::try_parse_from(args).unwrap().into_config().unwrap()
}

/// In-memory collection that records what a run did to it.
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Vec<Document>,
    inserts: usize,
    fail_after: Option<usize>,
    len_at_first_insert: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    /// Rejects every insert after the first `n`.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Collection size seen by the first insert, `None` if nothing was inserted.
    pub fn len_at_first_insert(&self) -> Option<usize> {
        self.len_at_first_insert
    }
}

#[async_trait]
impl DocumentSink for MemorySink {
    async fn count(&self) -> Result<u64> {
        Ok(self.documents.len() as u64)
    }

    async fn clear(&mut self) -> Result<()> {
        self.documents.clear();
        Ok(())
    }

    async fn insert(&mut self, document: Document) -> Result<()> {
        if self.fail_after.is_some_and(|n| self.inserts >= n) {
            return Err(Sas2MongoError::io(
                "Insert rejected",
                io::Error::new(io::ErrorKind::Other, "simulated write failure"),
            ));
        }
        self.len_at_first_insert.get_or_insert(self.documents.len());
        self.inserts += 1;
        self.documents.push(document);
        Ok(())
    }
}
