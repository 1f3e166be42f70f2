//! Storage layer
//!
//! The catalog lives in one JSON file. Every mutation rewrites the whole
//! file; at personal-library scale that is cheap enough.

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::JsonPersistence;
