//! Status command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};

use roomclimate_core::Registry;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_json, format_status_csv, format_status_text};
use crate::util::write_output;

pub fn cmd_status(
    registry: &Registry,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let views = registry
        .overview()
        .context("Failed to read room overview")?;

    let content = match format {
        OutputFormat::Json => format_json(&views)?,
        OutputFormat::Csv => format_status_csv(&views),
        OutputFormat::Text => format_status_text(&views, opts),
    };

    write_output(output, &content)
}
