//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use shelf_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "library_file": config.library_path(),
                    "bind": config.bind,
                    "lookup_url": config.lookup_url,
                    "lookup_timeout_secs": config.lookup_timeout_secs
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.library_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:            {}", config.data_dir.display());
            println!(
                "  library_file:        {}",
                config
                    .library_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| format!("(default: {})", config.library_path().display()))
            );
            println!("  bind:                {}", config.bind);
            println!("  lookup_url:          {}", config.lookup_url);
            println!("  lookup_timeout_secs: {}", config.lookup_timeout_secs);
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "library_file" => {
            config.library_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        "bind" => {
            config.bind = value.to_string();
        }
        "lookup_url" => {
            config.lookup_url = value.to_string();
        }
        "lookup_timeout_secs" => {
            config.lookup_timeout_secs = value
                .parse()
                .context("Invalid value for lookup_timeout_secs. Use a whole number of seconds.")?;
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, library_file, bind, lookup_url, lookup_timeout_secs",
                key
            );
        }
    }
    Ok(())
}
