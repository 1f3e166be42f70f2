//! LibraryThing export import
//!
//! Converts a LibraryThing JSON export (an object keyed by LibraryThing
//! book id) into catalog records. The export's `entrydate` becomes the
//! record's `date_added`, so imported books keep the date they were first
//! catalogued.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveTime};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::models::{format_timestamp, now_timestamp, Book, NewBook};

/// Placeholder for missing text fields
const MISSING: &str = "N/A";

/// Errors reading a LibraryThing export
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("The file '{path}' was not found.")]
    NotFound { path: PathBuf },

    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("The file '{path}' is not a valid JSON file: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("The file '{path}' is not a LibraryThing export (expected an object of books)")]
    UnexpectedShape { path: PathBuf },
}

/// Read and convert a LibraryThing export file
pub fn read_export(path: &Path) -> Result<Vec<Book>, ImportError> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ImportError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ImportError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let data: Value = serde_json::from_str(&content).map_err(|source| ImportError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })?;

    match data {
        Value::Object(entries) => Ok(convert(&entries)),
        _ => Err(ImportError::UnexpectedShape {
            path: path.to_path_buf(),
        }),
    }
}

/// Convert parsed export entries, keeping export order
///
/// Entries that are not objects are skipped with a warning.
pub fn convert(entries: &Map<String, Value>) -> Vec<Book> {
    entries
        .iter()
        .filter_map(|(id, entry)| match entry {
            Value::Object(fields) => Some(convert_entry(fields)),
            _ => {
                warn!(id = %id, "Skipping LibraryThing entry that is not an object");
                None
            }
        })
        .collect()
}

fn convert_entry(fields: &Map<String, Value>) -> Book {
    let title = fields
        .get("title")
        .and_then(as_text)
        .unwrap_or_else(|| MISSING.to_string());
    let author = fields
        .get("primaryauthor")
        .and_then(as_text)
        .unwrap_or_else(|| MISSING.to_string());

    let new = NewBook::new(title, author, extract_isbn(fields), extract_year(fields));
    Book::created(new, extract_entry_date(fields))
}

/// The isbn field may be an object keyed by index, a list, or a string
fn extract_isbn(fields: &Map<String, Value>) -> String {
    let isbn = match fields.get("isbn") {
        Some(Value::Object(by_index)) => by_index.get("0").and_then(as_text),
        Some(Value::Array(list)) => list.first().and_then(as_text),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };

    match isbn {
        Some(isbn) if isbn != MISSING => isbn,
        _ => fields
            .get("originalisbn")
            .and_then(as_text)
            .unwrap_or_else(|| MISSING.to_string()),
    }
}

/// Publication year from `date`; 0 when missing or not a whole year
fn extract_year(fields: &Map<String, Value>) -> i64 {
    match fields.get("date") {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

/// `entrydate` (YYYY-MM-DD) at midnight
///
/// A missing date means today at midnight; an unparsable one means now.
fn extract_entry_date(fields: &Map<String, Value>) -> String {
    let Some(raw) = fields.get("entrydate").and_then(as_text) else {
        return format_timestamp(Local::now().date_naive().and_time(NaiveTime::MIN));
    };

    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|date| format_timestamp(date.and_time(NaiveTime::MIN)))
        .unwrap_or_else(|_| now_timestamp())
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
