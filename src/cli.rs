// src/cli.rs
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;

use crate::error::{Result, Sas2MongoError};
use crate::mongo::{host_uri, redact_uri};
use crate::source::SourceFormat;

/// What to do when the target collection already holds documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictAction {
    /// Keep the existing documents and add the new ones
    Append,
    /// Drop the collection before copying
    Drop,
}

impl fmt::Display for ConflictAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Drop => write!(f, "drop"),
        }
    }
}

/// Copy rows from a SAS7BDAT or CSV file into a MongoDB collection
#[derive(Parser, Debug)]
#[command(name = "sas2mongo", author, version, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Input file (.sas7bdat or .csv)
    #[arg(short = 'i', long)]
    pub file: PathBuf,

    /// Output mongo collection
    #[arg(short = 'o', long)]
    pub collection: String,

    /// What to do if the collection is not empty
    #[arg(short = 'a', long, value_enum)]
    pub action: Option<ConflictAction>,

    /// Comma separated list of fields (all fields by default)
    #[arg(short = 'f', long, value_delimiter = ',')]
    pub fields: Option<Vec<String>>,

    /// Mongo database
    #[arg(short = 'd', long)]
    pub mongo_db: String,

    /// Mongo host
    #[arg(short = 'h', long, default_value = "localhost")]
    pub mongo_host: String,

    /// Mongo port
    #[arg(short = 'p', long, default_value_t = 27017)]
    pub mongo_port: u16,

    /// Full connection string; replaces --mongo-host and --mongo-port
    #[arg(long)]
    pub mongo_uri: Option<String>,

    /// Print documents as JSON lines instead of writing to MongoDB
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose logging, including every mapped document
    #[arg(long)]
    pub debug: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

/// Where documents are written.
#[derive(Debug, Clone, Serialize)]
pub struct MongoTarget {
    #[serde(skip)]
    pub uri: String,
    pub endpoint: String,
    pub database: String,
}

/// Everything a run needs, fixed before the input is opened.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub file: PathBuf,
    pub format: SourceFormat,
    pub collection: String,
    pub action: Option<ConflictAction>,
    /// `None` keeps every column
    pub fields: Option<BTreeSet<String>>,
    pub mongo: MongoTarget,
    pub dry_run: bool,
    pub debug: bool,
}

fn required(value: &str, flag: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Sas2MongoError::configuration(format!(
            "Missing required option --{}",
            flag
        )));
    }
    Ok(())
}

impl Cli {
    /// Validates the parsed arguments and resolves the input format.
    pub fn into_config(self) -> Result<RunConfig> {
        required(&self.file.to_string_lossy(), "file")?;
        required(&self.collection, "collection")?;
        required(&self.mongo_db, "mongo-db")?;

        let format = SourceFormat::from_path(&self.file)?;

        let fields = self
            .fields
            .map(|list| {
                list.into_iter()
                    .filter(|f| !f.is_empty())
                    .collect::<BTreeSet<String>>()
            })
            .filter(|set| !set.is_empty());

        let uri = match self.mongo_uri {
            Some(uri) => {
                required(&uri, "mongo-uri")?;
                uri
            }
            None => {
                required(&self.mongo_host, "mongo-host")?;
                host_uri(&self.mongo_host, self.mongo_port)
            }
        };

        Ok(RunConfig {
            file: self.file,
            format,
            collection: self.collection,
            action: self.action,
            fields,
            mongo: MongoTarget {
                endpoint: redact_uri(&uri),
                uri,
                database: self.mongo_db,
            },
            dry_run: self.dry_run,
            debug: self.debug,
        })
    }
}
