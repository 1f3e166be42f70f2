//! Status command handler

use anyhow::Result;

use shelf_core::{Catalog, Config};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(catalog: &Catalog, config: &Config, output: &Output) -> Result<()> {
    let books = catalog.list();
    let checked_out = books.iter().filter(|b| !b.available).count();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "library_file": catalog.path(),
                    "file_exists": catalog.path().exists(),
                    "file_size": catalog.file_size(),
                    "counts": {
                        "books": books.len(),
                        "checked_out": checked_out
                    },
                    "lookup_url": config.lookup_url
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", books.len());
        }
        OutputFormat::Human => {
            println!("Shelf Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  File: {}", catalog.path().display());
            println!("  Size: {}", format_size(catalog.file_size()));
            println!();
            println!("Contents:");
            println!("  Books:       {}", books.len());
            println!("  Checked out: {}", checked_out);
            println!();
            println!("Lookup:");
            println!("  Endpoint: {}", config.lookup_url);
        }
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
