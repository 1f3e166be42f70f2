//! Book command handlers

use anyhow::{bail, Context, Result};

use shelf_core::{BookUpdate, Catalog, Config, Lookup, LookupClient, NewBook};

use crate::output::Output;
use crate::prompt::{confirm, is_interactive, prompt_with_default};

/// Fields accepted by `book add`
pub struct AddArgs {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub year: i64,
    pub checked_out: bool,
}

/// Add a new book
pub fn add(catalog: &mut Catalog, args: AddArgs, output: &Output) -> Result<()> {
    let mut new = NewBook::new(args.title, args.author, args.isbn, args.year);
    new.available = !args.checked_out;

    let book = catalog.create(new).context("Failed to add book")?;

    output.success(&format!("Book '{}' added successfully.", book.title));
    output.print_book(&book);
    Ok(())
}

/// List all books
pub fn list(catalog: &Catalog, output: &Output) -> Result<()> {
    output.print_books(&catalog.list());
    Ok(())
}

/// Show a single book
pub fn show(catalog: &Catalog, isbn: String, output: &Output) -> Result<()> {
    let book = catalog
        .get(&isbn)
        .with_context(|| format!("No book with ISBN {}", isbn))?;

    output.print_book(&book);
    Ok(())
}

/// Edit a book
///
/// With no field flags set, prompts for each field interactively.
pub fn edit(
    catalog: &mut Catalog,
    isbn: String,
    changes: BookUpdate,
    output: &Output,
) -> Result<()> {
    let current = catalog
        .get(&isbn)
        .with_context(|| format!("No book with ISBN {}", isbn))?;

    let changes = if changes.is_empty() && output.should_prompt() && is_interactive() {
        println!("Editing: {} ({})", current.title, current.isbn);
        println!("Press Enter to keep current value, or type new value.\n");
        prompt_changes(&current)?
    } else {
        changes
    };

    if changes.is_empty() {
        output.message("Nothing to change.");
        return Ok(());
    }

    let book = catalog
        .update(&isbn, &changes)
        .context("Failed to update book")?;

    output.success(&format!("Book with ISBN {} updated successfully.", isbn));
    output.print_book(&book);
    Ok(())
}

/// Delete a book
pub fn delete(catalog: &mut Catalog, isbn: String, yes: bool, output: &Output) -> Result<()> {
    delete_with(catalog, isbn, yes, output, is_interactive())
}

fn delete_with(
    catalog: &mut Catalog,
    isbn: String,
    yes: bool,
    output: &Output,
    interactive: bool,
) -> Result<()> {
    let book = catalog
        .get(&isbn)
        .with_context(|| format!("No book with ISBN {}", isbn))?;

    if !yes && output.should_prompt() {
        if !interactive {
            bail!(
                "Cannot ask for confirmation without a terminal. \
                 Pass --yes to delete '{}' without prompting.",
                book.title
            );
        }
        println!("Delete book: {} - {}", book.isbn, book.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    catalog.delete(&isbn).context("Failed to delete book")?;

    output.success(&format!("Book with ISBN {} removed successfully.", isbn));
    Ok(())
}

/// Look a book up on OpenLibrary, optionally adding it
pub async fn lookup(
    catalog: &mut Catalog,
    config: &Config,
    isbn: String,
    add: bool,
    output: &Output,
) -> Result<()> {
    let client = LookupClient::new(&config.lookup_url, config.lookup_timeout())
        .context("Failed to create OpenLibrary client")?;

    let candidate = match client.lookup(&isbn).await {
        Lookup::Found(candidate) => candidate,
        Lookup::NotFound => bail!("Book not found on OpenLibrary."),
    };

    output.print_candidate(&candidate);

    if add {
        let book = catalog
            .create(candidate.into())
            .context("Failed to add book")?;
        output.success(&format!("Book '{}' added successfully.", book.title));
    }

    Ok(())
}

/// Ask for each editable field, keeping the current value on blank input
fn prompt_changes(current: &shelf_core::Book) -> Result<BookUpdate> {
    let mut changes = BookUpdate {
        title: prompt_with_default("Title", &current.title)?,
        author: prompt_with_default("Author", &current.author)?,
        ..Default::default()
    };

    if let Some(year) = prompt_with_default("Year", &current.year.to_string())? {
        match year.parse() {
            Ok(year) => changes.year = Some(year),
            Err(_) => println!("Invalid year format."),
        }
    }

    let status = if current.available { "yes" } else { "no" };
    if let Some(answer) = prompt_with_default("Available (yes/no)", status)? {
        match parse_availability(&answer) {
            Some(available) => changes.available = Some(available),
            None => println!("Invalid answer, availability unchanged."),
        }
    }

    Ok(changes)
}

fn parse_availability(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" | "true" | "available" => Some(true),
        "n" | "no" | "false" | "checked out" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    fn test_catalog(temp_dir: &TempDir) -> Catalog {
        Catalog::open(temp_dir.path().join("library.json")).unwrap()
    }

    fn add_args(isbn: &str) -> AddArgs {
        AddArgs {
            title: "Test Title".to_string(),
            author: "Test Author".to_string(),
            isbn: isbn.to_string(),
            year: 2023,
            checked_out: false,
        }
    }

    #[test]
    fn test_add_and_show() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);

        add(&mut catalog, add_args("12345"), &quiet()).unwrap();

        assert_eq!(catalog.len(), 1);
        show(&catalog, "12345".to_string(), &quiet()).unwrap();
        assert!(show(&catalog, "99999".to_string(), &quiet()).is_err());
    }

    #[test]
    fn test_add_checked_out() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);

        let mut args = add_args("1");
        args.checked_out = true;
        add(&mut catalog, args, &quiet()).unwrap();

        assert!(!catalog.get("1").unwrap().available);
    }

    #[test]
    fn test_add_duplicate_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);

        add(&mut catalog, add_args("1"), &quiet()).unwrap();
        let err = add(&mut catalog, add_args("1"), &quiet()).unwrap_err();

        assert!(format!("{:#}", err).contains("already exists"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_edit_with_flags() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);
        add(&mut catalog, add_args("44556"), &quiet()).unwrap();

        let changes = BookUpdate {
            title: Some("Updated Title".to_string()),
            ..Default::default()
        };
        edit(&mut catalog, "44556".to_string(), changes, &quiet()).unwrap();

        assert_eq!(catalog.get("44556").unwrap().title, "Updated Title");
    }

    #[test]
    fn test_edit_missing_book() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);

        let result = edit(&mut catalog, "1".to_string(), BookUpdate::default(), &quiet());
        assert!(result.is_err());
    }

    #[test]
    fn test_delete_without_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);
        add(&mut catalog, add_args("67890"), &quiet()).unwrap();

        delete(&mut catalog, "67890".to_string(), false, &quiet()).unwrap();

        assert!(catalog.is_empty());
        assert!(delete(&mut catalog, "67890".to_string(), true, &quiet()).is_err());
    }

    #[test]
    fn test_delete_needs_terminal_or_yes() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = test_catalog(&temp_dir);
        add(&mut catalog, add_args("24680"), &quiet()).unwrap();
        let human = Output::new(OutputFormat::Human);

        let err = delete_with(&mut catalog, "24680".to_string(), false, &human, false).unwrap_err();
        assert!(err.to_string().contains("--yes"));
        assert_eq!(catalog.len(), 1);

        delete_with(&mut catalog, "24680".to_string(), true, &human, false).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_parse_availability() {
        assert_eq!(parse_availability("Yes"), Some(true));
        assert_eq!(parse_availability("no"), Some(false));
        assert_eq!(parse_availability("maybe"), None);
    }
}
