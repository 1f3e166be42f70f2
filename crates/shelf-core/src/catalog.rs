//! Catalog service
//!
//! CRUD over the record store with request-level validation: missing
//! records and isbn collisions become typed errors that front ends map to
//! "not found" and "conflict" responses.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{Book, BookUpdate, NewBook};
use crate::storage::StorageError;
use crate::store::{ImportReport, RecordStore};

/// Errors returned by catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No book with this isbn
    #[error("Book not found")]
    NotFound { isbn: String },

    /// A book with this isbn already exists
    #[error("Book with this ISBN already exists")]
    Conflict { isbn: String },

    /// The catalog file could not be written
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Book catalog backed by a record store
///
/// One instance is built at startup and shared by every request handler.
pub struct Catalog {
    store: RecordStore,
}

impl Catalog {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Open the catalog stored at `path`
    pub fn open(path: impl Into<PathBuf>) -> CatalogResult<Self> {
        Ok(Self::new(RecordStore::open(path)?))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Size of the backing file in bytes
    pub fn file_size(&self) -> u64 {
        self.store.file_size()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// All books, in the order they were added
    pub fn list(&self) -> Vec<Book> {
        self.store.list().to_vec()
    }

    /// Get one book by isbn
    pub fn get(&self, isbn: &str) -> CatalogResult<Book> {
        self.store
            .find(isbn)
            .cloned()
            .ok_or_else(|| not_found(isbn))
    }

    /// Add a new book
    ///
    /// Returns the stored record, including its `date_added`.
    pub fn create(&mut self, new: NewBook) -> CatalogResult<Book> {
        if self.store.contains(&new.isbn) {
            return Err(CatalogError::Conflict { isbn: new.isbn });
        }

        let isbn = new.isbn.clone();
        self.store
            .add(new)?
            .ok_or(CatalogError::Conflict { isbn })
    }

    /// Update an existing book; the isbn itself never changes
    pub fn update(&mut self, isbn: &str, changes: &BookUpdate) -> CatalogResult<Book> {
        self.store
            .update(isbn, changes)?
            .ok_or_else(|| not_found(isbn))
    }

    /// Delete a book
    pub fn delete(&mut self, isbn: &str) -> CatalogResult<()> {
        if self.store.remove(isbn)? {
            Ok(())
        } else {
            Err(not_found(isbn))
        }
    }

    /// Bulk-add pre-dated records, skipping known isbns
    pub fn import(&mut self, books: Vec<Book>) -> CatalogResult<ImportReport> {
        Ok(self.store.import(books)?)
    }

    /// Write the current state to disk
    pub fn flush(&self) -> CatalogResult<()> {
        Ok(self.store.save()?)
    }
}

fn not_found(isbn: &str) -> CatalogError {
    CatalogError::NotFound {
        isbn: isbn.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_catalog(temp_dir: &TempDir) -> Catalog {
        Catalog::open(temp_dir.path().join("library.json")).unwrap()
    }

    #[test]
    fn test_create_returns_stored_record() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);

        let created = catalog
            .create(NewBook::new("T", "A", "123", 2020))
            .unwrap();

        assert_eq!(created.isbn, "123");
        assert!(created.available);
        assert_eq!(catalog.get("123").unwrap(), created);
    }

    #[test]
    fn test_create_conflict_leaves_store_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);
        catalog
            .create(NewBook::new("Duplicate", "Copy", "11111", 2025))
            .unwrap();

        let err = catalog
            .create(NewBook::new("Duplicate", "Copy", "11111", 2025))
            .unwrap_err();

        assert!(matches!(err, CatalogError::Conflict { ref isbn } if isbn == "11111"));
        assert_eq!(err.to_string(), "Book with this ISBN already exists");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = test_catalog(&temp_dir);

        let err = catalog.get("00000").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
        assert_eq!(err.to_string(), "Book not found");
    }

    #[test]
    fn test_update() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);
        catalog
            .create(NewBook::new("Old Title", "Old Author", "77777", 2021))
            .unwrap();

        let updated = catalog
            .update(
                "77777",
                &BookUpdate {
                    title: Some("New Title".to_string()),
                    author: Some("New Author".to_string()),
                    available: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "New Title");
        assert!(!updated.available);
        assert_eq!(catalog.get("77777").unwrap(), updated);
    }

    #[test]
    fn test_update_missing() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);

        let err = catalog.update("1", &BookUpdate::default()).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[test]
    fn test_delete_then_get_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);
        catalog
            .create(NewBook::new("To Be Deleted", "Deleter", "66666", 2020))
            .unwrap();

        catalog.delete("66666").unwrap();

        assert!(matches!(
            catalog.get("66666"),
            Err(CatalogError::NotFound { .. })
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_delete_missing() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);
        catalog.create(NewBook::new("Stay", "A", "1", 2000)).unwrap();

        let err = catalog.delete("2").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { ref isbn } if isbn == "2"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_list_in_insertion_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);
        for isbn in ["c", "a", "b"] {
            catalog.create(NewBook::new("T", "A", isbn, 0)).unwrap();
        }

        let isbns: Vec<_> = catalog.list().into_iter().map(|b| b.isbn).collect();
        assert_eq!(isbns, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_flush_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = test_catalog(&temp_dir);
        assert!(!catalog.path().exists());

        catalog.flush().unwrap();

        assert!(catalog.path().exists());
        assert_eq!(std::fs::read_to_string(catalog.path()).unwrap(), "[]");
    }
}
