//! Config command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::format_json;
use crate::util::write_output;

/// Print the effective configuration, its path, or write it to disk.
pub fn cmd_config(
    config: &Config,
    config_path: &Path,
    show_path: bool,
    init: bool,
    format: OutputFormat,
    output: Option<&PathBuf>,
    quiet: bool,
) -> Result<()> {
    if show_path {
        return write_output(output, &format!("{}\n", config_path.display()));
    }

    if init {
        config
            .save(config_path)
            .with_context(|| format!("Failed to initialize {}", config_path.display()))?;
        if !quiet {
            eprintln!("Wrote configuration to {}", config_path.display());
        }
        return Ok(());
    }

    let content = match format {
        OutputFormat::Json => format_json(config)?,
        OutputFormat::Text | OutputFormat::Csv => config.to_toml()?,
    };
    write_output(output, &content)
}
