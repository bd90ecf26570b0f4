// src/source/csv_source.rs
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::{ByteRecord, Reader, ReaderBuilder};

use super::{Cell, RawRow};
use crate::error::{Result, Sas2MongoError};

/// CSV input; the first record is the header.
///
/// Fields that are not valid UTF-8 are read as Latin-1, so exports from
/// single-byte code pages load instead of failing the run.
pub struct CsvRowSource {
    reader: Reader<BufReader<File>>,
    columns: Vec<String>,
    record: ByteRecord,
}

fn decode_field(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(text) => text.to_string(),
        // Latin-1 code points map one to one onto the first 256 chars.
        Err(_) => raw.iter().map(|b| char::from(*b)).collect(),
    }
}

impl CsvRowSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Sas2MongoError::io(format!("Failed to open {}", path.display()), e))?;
        let reader = BufReader::new(file);
        // Rows of the wrong width are let through so the mapper can reject
        // them with the row number.
        let mut reader = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns = reader.byte_headers()?.iter().map(decode_field).collect();

        Ok(Self {
            reader,
            columns,
            record: ByteRecord::new(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn next_row(&mut self) -> Result<Option<RawRow>> {
        if !self.reader.read_byte_record(&mut self.record)? {
            return Ok(None);
        }
        Ok(Some(
            self.record
                .iter()
                .map(|value| Cell::Text(decode_field(value)))
                .collect(),
        ))
    }
}
