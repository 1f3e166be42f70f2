//! Data models for Shelf
//!
//! Defines the book record stored in the catalog and the typed inputs
//! used to create and update it.

use chrono::{Local, NaiveDateTime, SubsecRound, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Creation time given to records that were saved without one
pub const EPOCH_SENTINEL: &str = "1970-01-01T00:00:00";

pub fn epoch_sentinel() -> String {
    EPOCH_SENTINEL.to_string()
}

/// Current local wall-clock time as an ISO-8601 string
pub fn now_timestamp() -> String {
    format_timestamp(Local::now().naive_local().trunc_subsecs(6))
}

/// `YYYY-MM-DDTHH:MM:SS`, plus `.ffffff` when there are fractional seconds
pub(crate) fn format_timestamp(value: NaiveDateTime) -> String {
    let format = if value.nanosecond() == 0 {
        "%Y-%m-%dT%H:%M:%S"
    } else {
        "%Y-%m-%dT%H:%M:%S%.6f"
    };
    value.format(format).to_string()
}

/// A book in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Display title
    pub title: String,
    /// Author(s), comma-separated when there are several
    pub author: String,
    /// Unique key within a catalog (not checksum-validated)
    pub isbn: String,
    /// Publication year, 0 when unknown
    pub year: i64,
    /// Whether the book is on the shelf (false = checked out)
    #[serde(default = "default_available")]
    pub available: bool,
    /// When this book was added to the catalog (ISO-8601, kept verbatim)
    #[serde(default = "epoch_sentinel", deserialize_with = "date_added_text")]
    pub date_added: String,
}

impl Book {
    /// Build a stored record from caller input and the time it was added
    pub(crate) fn created(new: NewBook, date_added: String) -> Self {
        Self {
            title: new.title,
            author: new.author,
            isbn: new.isbn,
            year: new.year,
            available: new.available,
            date_added,
        }
    }

    /// Overwrite every field present in `update`
    pub fn apply(&mut self, update: &BookUpdate) {
        if let Some(ref title) = update.title {
            self.title = title.clone();
        }
        if let Some(ref author) = update.author {
            self.author = author.clone();
        }
        if let Some(year) = update.year {
            self.year = year;
        }
        if let Some(available) = update.available {
            self.available = available;
        }
    }

    /// Human label for the availability flag
    pub fn status_label(&self) -> &'static str {
        if self.available {
            "Available"
        } else {
            "Checked Out"
        }
    }
}

/// Input for creating a book
///
/// There is no `date_added` here: the store stamps it. Unknown fields in
/// a request body (including `date_added`) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub year: i64,
    #[serde(default = "default_available")]
    pub available: bool,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        year: i64,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            year,
            available: true,
        }
    }
}

/// Partial update of a book
///
/// Only these fields can change after creation. `isbn` and `date_added`
/// are not represented, so a request body carrying them (or any other
/// unknown name) leaves them untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl BookUpdate {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.year.is_none()
            && self.available.is_none()
    }
}

fn default_available() -> bool {
    true
}

/// Read `date_added` without interpreting it
///
/// The text is stored as found so saving writes back exactly what was
/// loaded. `null` becomes the epoch sentinel; a non-string scalar keeps
/// its JSON text rather than failing the whole file.
fn date_added_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => epoch_sentinel(),
        other => other.to_string(),
    })
}
