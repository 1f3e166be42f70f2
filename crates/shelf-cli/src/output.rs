//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;
use shelf_core::{Book, BookCandidate, ImportReport};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single book
    pub fn print_book(&self, book: &Book) {
        match self.format {
            OutputFormat::Human => {
                println!("Title:   {}", book.title);
                println!("Author:  {}", book.author);
                println!("ISBN:    {}", book.isbn);
                println!("Year:    {}", format_year(book.year));
                println!("Status:  {}", book.status_label());
                println!("Added:   {}", book.date_added);
            }
            OutputFormat::Json => print_json(book),
            OutputFormat::Quiet => {
                println!("{}", book.isbn);
            }
        }
    }

    /// Print a list of books
    pub fn print_books(&self, books: &[Book]) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("The library is empty.");
                    return;
                }
                for book in books {
                    println!(
                        "{} | {} | {} | {} | {}",
                        truncate(&book.isbn, 13),
                        truncate(&book.title, 35),
                        truncate(&book.author, 25),
                        format_year(book.year),
                        book.status_label()
                    );
                }
                println!("\n{} book(s)", books.len());
            }
            OutputFormat::Json => print_json(books),
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.isbn);
                }
            }
        }
    }

    /// Print details found on OpenLibrary
    pub fn print_candidate(&self, candidate: &BookCandidate) {
        match self.format {
            OutputFormat::Human => {
                println!("Found on OpenLibrary:");
                println!("  Title:  {}", candidate.title);
                println!("  Author: {}", candidate.author);
                println!("  Year:   {}", format_year(candidate.year));
                println!("  ISBN:   {}", candidate.isbn);
            }
            OutputFormat::Json => print_json(candidate),
            OutputFormat::Quiet => {
                println!("{}", candidate.isbn);
            }
        }
    }

    /// Print the outcome of an import
    pub fn print_import_report(&self, report: &ImportReport) {
        match self.format {
            OutputFormat::Human => {
                println!("Imported {} book(s).", report.added);
                if report.skipped > 0 {
                    println!(
                        "Skipped {} book(s) whose ISBN is already in the library.",
                        report.skipped
                    );
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"added": report.added, "skipped": report.skipped})
                );
            }
            OutputFormat::Quiet => {
                println!("{}", report.added);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to format output as JSON: {}", e),
    }
}

/// Year for display; 0 means unknown
fn format_year(year: i64) -> String {
    if year == 0 {
        "unknown".to_string()
    } else {
        year.to_string()
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
