//! Copy the rows of a SAS7BDAT or CSV table into a MongoDB collection.
//!
//! A run opens the input, applies an optional column selection to every row,
//! settles a non-empty target collection (drop, append or abort) and inserts
//! one document per row.

pub mod cli;
pub mod error;
pub mod logging;
pub mod mapping;
pub mod mongo;
pub mod run;
pub mod sink;
pub mod source;
pub mod transform;

pub use cli::{Cli, ConflictAction, RunConfig};
pub use error::{Result, Sas2MongoError};
pub use mapping::ColumnMask;
pub use run::{run, ConflictResolution, RunContext, RunPhase, RunSummary};
pub use sink::{DocumentSink, JsonLinesSink};
pub use source::{Cell, RowSource, SourceFormat};
