// src/mapping.rs
use std::collections::BTreeSet;
use std::fmt;

use bson::{Bson, Document};

use crate::error::{Result, Sas2MongoError};
use crate::source::RawRow;

/// Per-column keep/drop decision, one slot per column in file order.
///
/// A slot holds the column name when the column is copied into documents
/// and `None` when it is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMask(Vec<Option<String>>);

impl ColumnMask {
    /// Builds the mask from the file header and the optional `--fields` list.
    pub fn build(columns: &[String], fields: Option<&BTreeSet<String>>) -> Self {
        let mask = Self(columns.iter().cloned().map(Some).collect());
        match fields {
            Some(fields) => mask.restrict(fields),
            None => mask,
        }
    }

    /// Drops every retained column whose name is not in `fields`.
    pub fn restrict(&self, fields: &BTreeSet<String>) -> Self {
        Self(
            self.0
                .iter()
                .map(|slot| slot.clone().filter(|name| fields.contains(name)))
                .collect(),
        )
    }

    pub fn retained(&self) -> impl Iterator<Item = &str> {
        self.0.iter().flatten().map(String::as_str)
    }

    /// Allow-list entries that name no column of the file.
    pub fn unmatched<'a>(&self, fields: &'a BTreeSet<String>) -> Vec<&'a str> {
        fields
            .iter()
            .filter(|field| !self.retained().any(|name| name == field.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Maps one row to a document holding only the retained columns.
    ///
    /// `row_num` is 1-based and only used for the error message.
    pub fn to_document(&self, row: RawRow, row_num: u64) -> Result<Document> {
        if row.len() != self.0.len() {
            return Err(Sas2MongoError::RowLength {
                row: row_num,
                expected: self.0.len(),
                found: row.len(),
            });
        }

        let mut doc = Document::new();
        for (slot, cell) in self.0.iter().zip(row) {
            if let Some(name) = slot {
                doc.insert(name.clone(), Bson::from(cell));
            }
        }
        Ok(doc)
    }
}

impl fmt::Display for ColumnMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match slot {
                Some(name) => write!(f, "{}", name)?,
                None => write!(f, "null")?,
            }
        }
        write!(f, "]")
    }
}
