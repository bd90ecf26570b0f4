// src/transform.rs
use bson::{Bson, DateTime, Document};
use chrono::{NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::source::Cell;

fn utc_datetime(ndt: &NaiveDateTime) -> Bson {
    Bson::DateTime(DateTime::from_chrono(Utc.from_utc_datetime(ndt)))
}

impl From<Cell> for Bson {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Missing => Bson::Null,
            Cell::Text(value) => Bson::String(value),
            Cell::Number(value) | Cell::Time(value) => Bson::Double(value),
            Cell::Date(date) => match date.and_hms_opt(0, 0, 0) {
                Some(midnight) => utc_datetime(&midnight),
                None => Bson::Null,
            },
            Cell::DateTime(ndt) => utc_datetime(&ndt),
        }
    }
}

/// Renders a document as relaxed extended JSON, one value per document.
pub fn document_to_json(doc: &Document) -> Value {
    Bson::Document(doc.clone()).into_relaxed_extjson()
}
