//! Shelf Core Library
//!
//! This crate provides the core functionality for Shelf, a personal book
//! catalog kept in a single JSON file.
//!
//! # Architecture
//!
//! - **RecordStore**: in-memory list of books, rewritten to disk on every change
//! - **Catalog**: CRUD with not-found / conflict errors, shared by the CLI and HTTP API
//! - **LookupClient**: best-effort OpenLibrary lookup to pre-fill a new book
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut catalog = Catalog::open(config.library_path())?;
//!
//! let book = catalog.create(NewBook::new("Dune", "Frank Herbert", "0441013597", 1965))?;
//! println!("added {}", book.date_added);
//! ```
//!
//! # Modules
//!
//! - `models`: Book record and its create/update inputs
//! - `store`: In-memory record store with file synchronization
//! - `storage`: JSON file persistence and storage errors
//! - `catalog`: Catalog service (main entry point)
//! - `lookup`: OpenLibrary enrichment client
//! - `librarything`: LibraryThing export import
//! - `config`: Application configuration

pub mod catalog;
pub mod config;
pub mod librarything;
pub mod lookup;
pub mod models;
pub mod storage;
pub mod store;

pub use catalog::{Catalog, CatalogError, CatalogResult};
pub use config::Config;
pub use librarything::ImportError;
pub use lookup::{BookCandidate, Lookup, LookupClient, LookupError};
pub use models::{Book, BookUpdate, NewBook};
pub use storage::{JsonPersistence, StorageError, StorageResult};
pub use store::{ImportReport, RecordStore};
