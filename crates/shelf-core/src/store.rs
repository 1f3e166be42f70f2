//! Record store
//!
//! The `RecordStore` owns the in-memory list of books and keeps the JSON
//! file in sync with it. Every mutation writes the whole file before
//! returning; there is no batching.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = RecordStore::open("library.json")?;  // empty on first run
//!
//! if let Some(book) = store.add(NewBook::new("Dune", "Frank Herbert", "0441013597", 1965))? {
//!     println!("added at {}", book.date_added);
//! }
//!
//! let dune = store.find("0441013597");
//! ```
//!
//! ## Concurrency
//!
//! The store itself has no locking. Callers sharing one store across tasks
//! wrap it in a lock (the HTTP server does). Two processes writing the
//! same file can still lose each other's updates.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::models::{now_timestamp, Book, BookUpdate, NewBook};
use crate::storage::{JsonPersistence, StorageResult};

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Records appended to the store
    pub added: usize,
    /// Records skipped because their isbn was already present
    pub skipped: usize,
}

/// In-memory book collection backed by a JSON file
pub struct RecordStore {
    books: Vec<Book>,
    persistence: JsonPersistence,
}

impl RecordStore {
    /// Open the store at `path`, loading whatever is there
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let mut store = Self {
            books: Vec::new(),
            persistence: JsonPersistence::new(path),
        };
        store.load()?;
        Ok(store)
    }

    /// Re-read the backing file, replacing the in-memory records
    pub fn load(&mut self) -> StorageResult<()> {
        self.books = self.persistence.load()?;
        info!(
            path = %self.persistence.path().display(),
            count = self.books.len(),
            "Catalog loaded"
        );
        Ok(())
    }

    /// Write every record to the backing file
    pub fn save(&self) -> StorageResult<()> {
        self.persistence.save(&self.books)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.persistence.path()
    }

    /// Size of the backing file in bytes
    pub fn file_size(&self) -> u64 {
        self.persistence.file_size()
    }

    /// All records, in insertion order
    pub fn list(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Check whether a record with this isbn exists
    pub fn contains(&self, isbn: &str) -> bool {
        self.find(isbn).is_some()
    }

    /// Find a record by isbn
    pub fn find(&self, isbn: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.isbn == isbn)
    }

    /// Add a new record
    ///
    /// Returns `Ok(None)` without touching the store if the isbn is taken.
    /// Otherwise stamps `date_added`, appends, saves, and returns the
    /// stored record.
    pub fn add(&mut self, new: NewBook) -> StorageResult<Option<Book>> {
        if self.contains(&new.isbn) {
            info!(isbn = %new.isbn, "Book with this ISBN already exists");
            return Ok(None);
        }

        let book = Book::created(new, now_timestamp());
        self.books.push(book.clone());
        self.save()?;

        info!(isbn = %book.isbn, title = %book.title, "Book added");
        Ok(Some(book))
    }

    /// Remove the record with this isbn
    ///
    /// Returns whether anything was removed. Saves only on removal.
    pub fn remove(&mut self, isbn: &str) -> StorageResult<bool> {
        let Some(pos) = self.books.iter().position(|b| b.isbn == isbn) else {
            info!(isbn = %isbn, "Book not found, nothing removed");
            return Ok(false);
        };

        self.books.remove(pos);
        self.save()?;

        info!(isbn = %isbn, "Book removed");
        Ok(true)
    }

    /// Apply a partial update to the record with this isbn
    ///
    /// Returns the updated record, or `Ok(None)` if there is none.
    pub fn update(&mut self, isbn: &str, changes: &BookUpdate) -> StorageResult<Option<Book>> {
        let Some(book) = self.books.iter_mut().find(|b| b.isbn == isbn) else {
            info!(isbn = %isbn, "Book not found, nothing updated");
            return Ok(None);
        };

        book.apply(changes);
        let updated = book.clone();
        self.save()?;

        info!(isbn = %isbn, "Book updated");
        Ok(Some(updated))
    }

    /// Append records that already carry their own `date_added`
    ///
    /// Used when importing from another catalog. Records whose isbn is
    /// already present (including duplicates within `books`) are skipped.
    /// Saves once at the end, and only if something was added.
    pub fn import(&mut self, books: Vec<Book>) -> StorageResult<ImportReport> {
        let mut report = ImportReport::default();

        for book in books {
            if self.contains(&book.isbn) {
                report.skipped += 1;
                continue;
            }
            self.books.push(book);
            report.added += 1;
        }

        if report.added > 0 {
            self.save()?;
        }

        info!(added = report.added, skipped = report.skipped, "Import finished");
        Ok(report)
    }
}
