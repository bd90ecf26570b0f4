//! Row sources: an input table seen as a column header plus a forward-only
//! sequence of rows.
//!
//! The format is picked once from the file name, and both formats are read
//! through the same `columns` / `next_row` contract.

mod csv_source;
mod sas_source;

use std::fmt;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{Result, Sas2MongoError};

pub use csv_source::CsvRowSource;
pub use sas_source::SasRowSource;

/// Input formats, selected by file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Sas,
    Csv,
}

impl SourceFormat {
    /// Picks the format from the file name suffix, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.ends_with(".sas7bdat") {
            Ok(Self::Sas)
        } else if name.ends_with(".csv") {
            Ok(Self::Csv)
        } else {
            Err(Sas2MongoError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sas => write!(f, "sas7bdat"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// A single cell value as read from the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Seconds since midnight
    Time(f64),
}

/// One row of cells, in column order.
pub type RawRow = Vec<Cell>;

/// An opened input file.
pub enum RowSource {
    Sas(SasRowSource),
    Csv(CsvRowSource),
}

impl RowSource {
    pub fn open(path: &Path, format: SourceFormat) -> Result<Self> {
        match format {
            SourceFormat::Sas => SasRowSource::open(path).map(Self::Sas),
            SourceFormat::Csv => CsvRowSource::open(path).map(Self::Csv),
        }
    }

    pub fn format(&self) -> SourceFormat {
        match self {
            Self::Sas(_) => SourceFormat::Sas,
            Self::Csv(_) => SourceFormat::Csv,
        }
    }

    /// Column names in file order.
    pub fn columns(&self) -> &[String] {
        match self {
            Self::Sas(source) => source.columns(),
            Self::Csv(source) => source.columns(),
        }
    }

    /// Next data row, or `None` at end of file.
    pub fn next_row(&mut self) -> Result<Option<RawRow>> {
        match self {
            Self::Sas(source) => source.next_row(),
            Self::Csv(source) => source.next_row(),
        }
    }
}
