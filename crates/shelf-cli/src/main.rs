//! Shelf CLI
//!
//! Command-line interface and HTTP server for Shelf, a personal book catalog.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shelf_core::{BookUpdate, Catalog, Config, LookupClient};

mod api;
mod commands;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Shelf - personal library book catalog")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Library file to use instead of the configured one
    #[arg(short, long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Manage books
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },
    /// Import a LibraryThing JSON export
    Import {
        /// Path to the export file
        path: PathBuf,
    },
    /// Show library status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum BookCommands {
    /// Add a book
    #[command(alias = "create")]
    Add {
        /// Book title
        #[arg(short = 'T', long)]
        title: String,
        /// Author name
        #[arg(short, long)]
        author: String,
        /// ISBN, used as the book's key
        #[arg(short, long)]
        isbn: String,
        /// Publication year
        #[arg(short, long)]
        year: i64,
        /// Record the book as checked out
        #[arg(long)]
        checked_out: bool,
    },
    /// List all books
    #[command(alias = "ls")]
    List,
    /// Show one book
    Show {
        /// ISBN of the book
        isbn: String,
    },
    /// Edit a book (prompts when no fields are given)
    Edit {
        /// ISBN of the book
        isbn: String,
        /// New title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// New author
        #[arg(short, long)]
        author: Option<String>,
        /// New publication year
        #[arg(short, long)]
        year: Option<i64>,
        /// Availability (true = available, false = checked out)
        #[arg(long)]
        available: Option<bool>,
    },
    /// Delete a book
    #[command(alias = "rm")]
    Delete {
        /// ISBN of the book
        isbn: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Look a book up on OpenLibrary
    Lookup {
        /// ISBN to search for
        isbn: String,
        /// Add the result to the library
        #[arg(long)]
        add: bool,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, library_file, bind, lookup_url, lookup_timeout_secs)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Serve { .. }));

    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work on the config file itself, not the library
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let mut config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    if let Some(file) = cli.file {
        config.library_file = Some(file);
    }

    let mut catalog = Catalog::open(config.library_path())
        .with_context(|| format!("Failed to open {}", config.library_path().display()))?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            let lookup = LookupClient::new(&config.lookup_url, config.lookup_timeout())
                .context("Failed to create OpenLibrary client")?;
            api::serve(Arc::new(api::ApiState::new(catalog, lookup)), &bind).await
        }
        Commands::Book { command } => {
            handle_book_command(command, &mut catalog, &config, &output).await
        }
        Commands::Import { path } => {
            commands::import::from_librarything(&mut catalog, &path, &output)
        }
        Commands::Status => commands::status::show(&catalog, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

async fn handle_book_command(
    command: BookCommands,
    catalog: &mut Catalog,
    config: &Config,
    output: &Output,
) -> Result<()> {
    match command {
        BookCommands::Add {
            title,
            author,
            isbn,
            year,
            checked_out,
        } => commands::book::add(
            catalog,
            commands::book::AddArgs {
                title,
                author,
                isbn,
                year,
                checked_out,
            },
            output,
        ),
        BookCommands::List => commands::book::list(catalog, output),
        BookCommands::Show { isbn } => commands::book::show(catalog, isbn, output),
        BookCommands::Edit {
            isbn,
            title,
            author,
            year,
            available,
        } => {
            let changes = BookUpdate {
                title,
                author,
                year,
                available,
            };
            commands::book::edit(catalog, isbn, changes, output)
        }
        BookCommands::Delete { isbn, yes } => commands::book::delete(catalog, isbn, yes, output),
        BookCommands::Lookup { isbn, add } => {
            commands::book::lookup(catalog, config, isbn, add, output).await
        }
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Log to stderr so `--json` output on stdout stays parseable.
///
/// The server logs requests at info; one-shot commands only surface warnings.
/// `RUST_LOG` overrides both.
fn init_tracing(serving: bool) {
    let default_filter = if serving {
        "shelf=info,shelf_core=info,tower_http=info"
    } else {
        "shelf=warn,shelf_core=warn"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
