//! Catalog file persistence
//!
//! Reads and writes the catalog as a single JSON array. Uses atomic writes
//! (write to temp file, sync, then rename) so a crash mid-save leaves the
//! previous file intact.
//!
//! The file format matches what earlier versions of the catalog wrote:
//! four-space indentation, non-ASCII text unescaped, records in insertion
//! order, keys `title`, `author`, `isbn`, `year`, `available`, `date_added`.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, error, warn};

use super::error::{StorageError, StorageResult};
use crate::models::Book;

/// Suffix of the copy kept when the catalog file cannot be parsed
const CORRUPT_SUFFIX: &str = ".corrupt";

/// JSON-file persistence for the book catalog
#[derive(Debug, Clone)]
pub struct JsonPersistence {
    path: PathBuf,
}

impl JsonPersistence {
    /// Create a persistence handler for the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the catalog file in bytes (0 when missing)
    pub fn file_size(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// Load all records from disk
    ///
    /// A missing file yields an empty catalog (first run). So does a file
    /// that cannot be parsed; it is copied to `<file>.corrupt` first so the
    /// next save does not destroy it. Other read failures are errors.
    pub fn load(&self) -> StorageResult<Vec<Book>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No catalog file yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(match e.kind() {
                    io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                        path: self.path.clone(),
                        source: e,
                    },
                    _ => StorageError::ReadError {
                        path: self.path.clone(),
                        source: e,
                    },
                })
            }
        };

        match serde_json::from_slice::<Vec<Book>>(&bytes) {
            Ok(books) => Ok(books),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Catalog file is not valid, starting empty"
                );
                self.backup_unreadable();
                Ok(Vec::new())
            }
        }
    }

    /// Write all records to disk, replacing the previous file
    pub fn save(&self, books: &[Book]) -> StorageResult<()> {
        let data = encode(books).map_err(|source| StorageError::Serialize {
            path: self.path.clone(),
            source,
        })?;
        atomic_write(&self.path, &data)
    }

    /// Path of the copy kept for an unparsable catalog file
    pub fn corrupt_backup_path(&self) -> PathBuf {
        with_suffix(&self.path, CORRUPT_SUFFIX)
    }

    fn backup_unreadable(&self) {
        let backup = self.corrupt_backup_path();
        match fs::copy(&self.path, &backup) {
            Ok(_) => warn!(backup = %backup.display(), "Kept a copy of the unreadable catalog"),
            Err(e) => error!(
                backup = %backup.display(),
                error = %e,
                "Failed to back up unreadable catalog"
            ),
        }
    }
}

/// Encode records as a four-space indented JSON array
fn encode(books: &[Book]) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut out, formatter);
    books.serialize(&mut serializer)?;
    Ok(out)
}

/// `path` with `suffix` appended to its file name
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = with_suffix(path, ".tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
