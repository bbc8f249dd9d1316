pub mod completions;
pub mod lists;
pub mod networks;

use anyhow::Result;
use gat_cli::{cli::OutputFormat, config::AppConfig};
use std::io::Write;

/// `--format` wins over the configured default.
pub fn output_format(flag: Option<OutputFormat>, config: &AppConfig) -> Result<OutputFormat> {
    match flag {
        Some(format) => Ok(format),
        None => Ok(config.output_format()?),
    }
}

pub fn write_json<W: Write, T: serde::Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)
        .map_err(|err| anyhow::anyhow!("serializing output to JSON: {err}"))?;
    writeln!(out)?;
    Ok(())
}
