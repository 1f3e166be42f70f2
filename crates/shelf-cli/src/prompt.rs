//! Interactive prompts
//!
//! Line-based prompts used by `book edit` and `book delete`.

use anyhow::Result;
use std::io::{self, Write};

/// Whether stdin is a terminal someone can answer prompts on
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !is_interactive() {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let input = read_line()?.to_lowercase();
    Ok(is_yes(&input))
}

/// Prompt showing the current value; `None` when the user keeps it
pub fn prompt_with_default(prompt: &str, current: &str) -> Result<Option<String>> {
    if current.is_empty() {
        print!("{}: ", prompt);
    } else {
        print!("{} [{}]: ", prompt, current);
    }
    io::stdout().flush()?;

    Ok(non_blank(read_line()?))
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn is_yes(input: &str) -> bool {
    input == "y" || input == "yes"
}

fn non_blank(input: String) -> Option<String> {
    if input.is_empty() {
        None
    } else {
        Some(input)
    }
}
