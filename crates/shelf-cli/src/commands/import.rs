//! Import command handler

use std::path::Path;

use anyhow::{Context, Result};

use shelf_core::{librarything, Catalog};

use crate::output::Output;

/// Import a LibraryThing JSON export into the catalog
pub fn from_librarything(catalog: &mut Catalog, export: &Path, output: &Output) -> Result<()> {
    let books = librarything::read_export(export)?;
    let total = books.len();

    let report = catalog
        .import(books)
        .context("Failed to save imported books")?;

    tracing::debug!(total, added = report.added, "LibraryThing import done");
    output.print_import_report(&report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;

    #[test]
    fn test_import_into_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let export = temp_dir.path().join("export.json");
        std::fs::write(
            &export,
            r#"{
                "1": {"title": "A", "primaryauthor": "X", "isbn": "111", "date": "2000", "entrydate": "2020-01-01"},
                "2": {"title": "B", "primaryauthor": "Y", "isbn": ["222"], "date": "2001", "entrydate": "2020-01-02"}
            }"#,
        )
        .unwrap();

        let mut catalog = Catalog::open(temp_dir.path().join("library.json")).unwrap();
        from_librarything(&mut catalog, &export, &Output::new(OutputFormat::Quiet)).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("222").unwrap().title, "B");
        assert!(catalog.path().exists());
    }

    #[test]
    fn test_import_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = Catalog::open(temp_dir.path().join("library.json")).unwrap();

        let result = from_librarything(
            &mut catalog,
            &temp_dir.path().join("nope.json"),
            &Output::new(OutputFormat::Quiet),
        );

        assert!(result.is_err());
        assert!(!catalog.path().exists());
    }
}
