//! Room command implementation.

use std::path::PathBuf;

use anyhow::Result;

use roomclimate_core::Registry;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_json, format_room_csv, format_room_text};
use crate::util::write_output;

pub fn cmd_room(
    registry: &Registry,
    id: u8,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let view = registry.room(id)?;

    let content = match format {
        OutputFormat::Json => format_json(&view)?,
        OutputFormat::Csv => format_room_csv(&view),
        OutputFormat::Text => format_room_text(&view, opts),
    };

    write_output(output, &content)
}
