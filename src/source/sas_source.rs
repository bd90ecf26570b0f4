// src/source/sas_source.rs
use std::collections::VecDeque;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate};
use sas7bdat::{Dataset, OwnedCellValue, RowSelection};

use super::{Cell, RawRow};
use crate::error::Result;

/// Rows decoded per scan of the dataset.
const WINDOW_ROWS: u64 = 4_096;

/// SAS7BDAT input; column names come from the embedded schema.
///
/// Rows are pulled from the dataset one window at a time and handed out in
/// order, so only a window of decoded rows is held in memory.
pub struct SasRowSource {
    dataset: Dataset,
    columns: Vec<String>,
    buffered: VecDeque<RawRow>,
    next_start: u64,
    row_count: u64,
}

impl SasRowSource {
    pub fn open(path: &Path) -> Result<Self> {
        let dataset = Dataset::open(path)?;
        let columns: Vec<String> = dataset
            .columns()
            .iter()
            .map(|column| column.name().trim().to_string())
            .collect();

        let metadata = dataset.metadata();
        tracing::info!(
            dataset = metadata.table_name.as_deref().unwrap_or_default().trim(),
            encoding = metadata.encoding.as_deref().unwrap_or("unknown"),
            rows = metadata.row_count.saturating_sub(metadata.deleted_row_count),
            columns = columns.len(),
            "Opened SAS dataset"
        );
        let row_count = metadata.row_count;

        Ok(Self {
            dataset,
            columns,
            buffered: VecDeque::new(),
            next_start: 0,
            row_count,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn next_row(&mut self) -> Result<Option<RawRow>> {
        while self.buffered.is_empty() && self.next_start < self.row_count {
            let end = self.next_start.saturating_add(WINDOW_ROWS).min(self.row_count);
            let window = self
                .dataset
                .collect_rows_windowed(RowSelection::range(self.next_start, end))?;
            tracing::trace!(start = self.next_start, end, rows = window.len(), "Read SAS window");
            self.next_start = end;
            self.buffered.extend(
                window
                    .into_iter()
                    .map(|row| row.cells.into_iter().map(Cell::from).collect()),
            );
        }
        Ok(self.buffered.pop_front())
    }
}

impl From<OwnedCellValue> for Cell {
    fn from(value: OwnedCellValue) -> Self {
        match value {
            OwnedCellValue::Null => Self::Missing,
            OwnedCellValue::Int32(n) => Self::Number(f64::from(n)),
            OwnedCellValue::Int64(n) => Self::Number(n as f64),
            OwnedCellValue::Float64(n) if n.is_nan() => Self::Missing,
            OwnedCellValue::Float64(n) => Self::Number(n),
            OwnedCellValue::String(s) => Self::Text(s),
            OwnedCellValue::Bytes(b) => Self::Text(String::from_utf8_lossy(&b).into_owned()),
            // SAS dates count days from 1960-01-01
            OwnedCellValue::Date(d) => NaiveDate::from_ymd_opt(1960, 1, 1)
                .and_then(|epoch| {
                    epoch.checked_add_signed(Duration::days(i64::from(d.days_since_sas_epoch)))
                })
                .map_or(Self::Missing, Self::Date),
            OwnedCellValue::DateTime(dt) => DateTime::from_timestamp(dt.unix_seconds(), 0)
                .map_or(Self::Missing, |utc| Self::DateTime(utc.naive_utc())),
            OwnedCellValue::Time(t) => Self::Time(f64::from(t.seconds_since_midnight)),
        }
    }
}
