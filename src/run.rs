//! A single import run.
//!
//! The run context owns everything a run needs (configuration, opened row
//! source, column mask) and moves through the phases in order:
//! `Configured -> Connected -> (Cleared) -> Processing -> Done | Failed`.
//! Nothing is retried; the first error ends the run and rows already
//! inserted stay in the collection.

use std::fmt;

use tracing::{debug, info, warn};

use crate::cli::{ConflictAction, RunConfig};
use crate::error::{Result, Sas2MongoError};
use crate::mapping::ColumnMask;
use crate::mongo;
use crate::sink::{DocumentSink, JsonLinesSink};
use crate::source::{RowSource, SourceFormat};

/// Rows between two progress messages.
const PROGRESS_INTERVAL: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Configured,
    Connected,
    Cleared,
    Processing,
    Done,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configured => "configured",
            Self::Connected => "connected",
            Self::Cleared => "cleared",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How a non-empty target collection was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// The collection held no documents
    Empty,
    /// The collection was dropped; it held `previous` documents
    Dropped { previous: u64 },
    /// New documents were added next to `existing` ones
    Appended { existing: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub format: SourceFormat,
    pub processed: u64,
    /// `None` for dry runs, which never look at the collection
    pub resolution: Option<ConflictResolution>,
}

/// Applies the conflict action to the target before any row is written.
pub async fn resolve_conflict<S: DocumentSink + ?Sized>(
    sink: &mut S,
    collection: &str,
    action: Option<ConflictAction>,
) -> Result<ConflictResolution> {
    let count = sink.count().await?;
    if count == 0 {
        return Ok(ConflictResolution::Empty);
    }

    info!("Collection exists and has {} records", count);
    match action {
        Some(ConflictAction::Drop) => {
            info!("Dropping...");
            sink.clear().await?;
            Ok(ConflictResolution::Dropped { previous: count })
        }
        Some(ConflictAction::Append) => {
            info!("Appending...");
            Ok(ConflictResolution::Appended { existing: count })
        }
        None => Err(Sas2MongoError::CollectionNotEmpty {
            collection: collection.to_string(),
            count,
        }),
    }
}

pub struct RunContext {
    config: RunConfig,
    source: RowSource,
    mask: ColumnMask,
    phase: RunPhase,
}

impl RunContext {
    /// Opens the input file and builds the column mask.
    pub fn open(config: RunConfig) -> Result<Self> {
        let source = RowSource::open(&config.file, config.format)?;
        Ok(Self::with_source(config, source))
    }

    pub fn with_source(config: RunConfig, source: RowSource) -> Self {
        let mask = ColumnMask::build(source.columns(), config.fields.as_ref());
        info!("Columns to process: {}", mask);
        if let Some(fields) = &config.fields {
            let unmatched = mask.unmatched(fields);
            if !unmatched.is_empty() {
                warn!("Fields not found in {}: {}", config.file.display(), unmatched.join(", "));
            }
        }

        Self {
            config,
            source,
            mask,
            phase: RunPhase::Configured,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Settles the target collection, then copies every row into it.
    pub async fn import<S: DocumentSink + ?Sized>(mut self, sink: &mut S) -> Result<RunSummary> {
        self.phase = RunPhase::Connected;
        let outcome = self.import_rows(sink).await;
        self.finish(outcome)
    }

    /// Copies every row without inspecting or clearing the target.
    pub async fn preview<S: DocumentSink + ?Sized>(mut self, sink: &mut S) -> Result<RunSummary> {
        self.phase = RunPhase::Processing;
        let outcome = self.copy_rows(sink).await.map(|processed| RunSummary {
            format: self.source.format(),
            processed,
            resolution: None,
        });
        self.finish(outcome)
    }

    async fn import_rows<S: DocumentSink + ?Sized>(&mut self, sink: &mut S) -> Result<RunSummary> {
        let resolution = resolve_conflict(sink, &self.config.collection, self.config.action).await?;
        if let ConflictResolution::Dropped { .. } = resolution {
            self.phase = RunPhase::Cleared;
        }

        info!("Processing...");
        self.phase = RunPhase::Processing;
        let processed = self.copy_rows(sink).await?;

        Ok(RunSummary {
            format: self.source.format(),
            processed,
            resolution: Some(resolution),
        })
    }

    async fn copy_rows<S: DocumentSink + ?Sized>(&mut self, sink: &mut S) -> Result<u64> {
        let mut processed = 0u64;
        while let Some(row) = self.source.next_row()? {
            let row_num = processed + 1;
            let document = self.mask.to_document(row, row_num)?;
            if self.config.debug {
                debug!(row = row_num, "{}", document);
            }
            sink.insert(document).await?;
            processed = row_num;

            if processed % PROGRESS_INTERVAL == 0 {
                info!("Processed {} records so far", processed);
            }
        }
        Ok(processed)
    }

    fn finish(mut self, outcome: Result<RunSummary>) -> Result<RunSummary> {
        match &outcome {
            Ok(summary) => {
                self.phase = RunPhase::Done;
                info!("Processed records: {}", summary.processed);
            }
            Err(e) => {
                debug!(phase = %self.phase, "Run failed: {}", e);
                self.phase = RunPhase::Failed;
            }
        }
        outcome
    }
}

/// Runs a whole import: open the input, connect, settle the collection, copy.
///
/// The MongoDB client is shut down on every path once connected.
pub async fn run(config: RunConfig) -> Result<RunSummary> {
    if let Ok(dump) = serde_json::to_string(&config) {
        debug!("Run configuration: {}", dump);
    }

    let context = RunContext::open(config)?;

    if context.config().dry_run {
        info!("Dry run: documents are printed, not written");
        let mut sink = JsonLinesSink::new(std::io::stdout());
        return context.preview(&mut sink).await;
    }

    let target = context.config().mongo.clone();
    let collection = context.config().collection.clone();
    info!("Connecting mongo at {}...", target.endpoint);
    let mut sink = mongo::connect(&target.uri, &target.database, &collection).await?;

    info!("Getting collection {}...", sink.namespace());
    let outcome = context.import(&mut sink).await;
    sink.shutdown().await;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bson::{doc, Document};

    struct MemorySink(Vec<Document>);

    impl MemorySink {
        fn new() -> Self {
            Self(Vec::new())
        }

        fn with_documents(documents: Vec<Document>) -> Self {
            Self(documents)
        }

        fn documents(&self) -> &[Document] {
            &self.0
        }
    }

    #[async_trait]
    impl DocumentSink for MemorySink {
        async fn count(&self) -> Result<u64> {
            Ok(self.0.len() as u64)
        }

        async fn clear(&mut self) -> Result<()> {
            self.0.clear();
            Ok(())
        }

        async fn insert(&mut self, document: Document) -> Result<()> {
            self.0.push(document);
            Ok(())
        }
    }

    fn existing(n: i32) -> Vec<Document> {
        (0..n).map(|i| doc! { "old": i }).collect()
    }

    #[tokio::test]
    async fn test_empty_collection_proceeds_without_action() {
        let mut sink = MemorySink::new();
        let resolution = resolve_conflict(&mut sink, "c", None).await.unwrap();
        assert_eq!(resolution, ConflictResolution::Empty);
    }

    #[tokio::test]
    async fn test_non_empty_without_action_aborts() {
        let mut sink = MemorySink::with_documents(existing(5));
        let err = resolve_conflict(&mut sink, "c", None).await.unwrap_err();
        assert!(matches!(
            err,
            Sas2MongoError::CollectionNotEmpty { count: 5, .. }
        ));
        assert_eq!(sink.documents().len(), 5);
    }

    #[tokio::test]
    async fn test_drop_clears_collection() {
        let mut sink = MemorySink::with_documents(existing(5));
        let resolution = resolve_conflict(&mut sink, "c", Some(ConflictAction::Drop))
            .await
            .unwrap();
        assert_eq!(resolution, ConflictResolution::Dropped { previous: 5 });
        assert!(sink.documents().is_empty());
    }

    #[tokio::test]
    async fn test_append_keeps_documents() {
        let mut sink = MemorySink::with_documents(existing(5));
        let resolution = resolve_conflict(&mut sink, "c", Some(ConflictAction::Append))
            .await
            .unwrap();
        assert_eq!(resolution, ConflictResolution::Appended { existing: 5 });
        assert_eq!(sink.documents().len(), 5);
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(RunPhase::Configured.to_string(), "configured");
        assert_eq!(RunPhase::Failed.to_string(), "failed");
    }
}
