//! Destinations for mapped documents.
//!
//! The MongoDB collection is the real target; the JSON-lines sink backs
//! `--dry-run`.

use std::io::Write;

use async_trait::async_trait;
use bson::Document;

use crate::error::{Result, Sas2MongoError};
use crate::transform::document_to_json;

/// A collection documents are copied into, one insert at a time.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Number of documents the target already holds
    async fn count(&self) -> Result<u64>;

    /// Removes every document from the target
    async fn clear(&mut self) -> Result<()>;

    /// Writes one document
    async fn insert(&mut self, document: Document) -> Result<()>;
}

/// Writes each document as a line of relaxed extended JSON.
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write + Send + Sync> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: Write + Send + Sync> DocumentSink for JsonLinesSink<W> {
    async fn count(&self) -> Result<u64> {
        Ok(0)
    }

    async fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    async fn insert(&mut self, document: Document) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &document_to_json(&document)).map_err(|e| {
            Sas2MongoError::Serialization {
                context: "Failed to write document".to_string(),
                source: e,
            }
        })?;
        writeln!(self.writer).map_err(|e| Sas2MongoError::io("Failed to write document", e))
    }
}
