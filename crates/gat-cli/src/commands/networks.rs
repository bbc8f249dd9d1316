use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use gat_cli::cli::{NetworksCommands, OutputFormat};
use gat_cli::config::AppConfig;
use gat_core::{Diagnostics, NetworkStats};
use gat_io::{import_network, DirectoryNetworkProvider};
use serde::Serialize;
use tabwriter::TabWriter;

use super::{output_format, write_json};

pub fn handle(command: &NetworksCommands, config: &AppConfig) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        NetworksCommands::List {
            network_dir,
            format,
        } => {
            let directory = network_dir
                .clone()
                .unwrap_or_else(|| config.networks.directory.clone());
            list(&directory, output_format(*format, config)?, &mut out)
        }
        NetworksCommands::Inspect { path, format } => {
            inspect(path, output_format(*format, config)?, &mut out)
        }
    }
}

#[derive(Debug, Serialize)]
struct NetworkListing {
    directory: PathBuf,
    networks: Vec<String>,
}

fn list<W: Write>(directory: &Path, format: OutputFormat, out: &mut W) -> Result<()> {
    let provider = DirectoryNetworkProvider::new(directory);
    let networks = provider.ids()?;
    match format {
        OutputFormat::Plain => {
            for id in &networks {
                writeln!(out, "{id}")?;
            }
            Ok(())
        }
        OutputFormat::Json => write_json(
            out,
            &NetworkListing {
                directory: directory.to_path_buf(),
                networks,
            },
        ),
    }
}

#[derive(Debug, Serialize)]
struct NetworkReport<'a> {
    id: &'a str,
    variants: Vec<&'a str>,
    stats: NetworkStats,
    diagnostics: &'a Diagnostics,
}

fn inspect<W: Write>(path: &Path, format: OutputFormat, out: &mut W) -> Result<()> {
    let result = import_network(path)?;
    let network = &result.network;
    let report = NetworkReport {
        id: &network.id,
        variants: network.variants().variant_ids().collect(),
        stats: network.stats(),
        diagnostics: &result.diagnostics,
    };

    match format {
        OutputFormat::Plain => {
            writeln!(out, "Network {}", report.id)?;
            writeln!(out, "{}", report.stats)?;
            writeln!(out, "Variants: {}", report.variants.join(", "))?;
            if !report.diagnostics.is_empty() {
                let mut writer = TabWriter::new(&mut *out);
                writeln!(writer, "SEVERITY\tCATEGORY\tENTITY\tMESSAGE")?;
                for issue in report.diagnostics.issues() {
                    writeln!(
                        writer,
                        "{}\t{}\t{}\t{}",
                        issue.severity.as_str(),
                        issue.category.as_str(),
                        issue.entity.as_deref().unwrap_or("-"),
                        issue.message
                    )?;
                }
                writer.flush()?;
            }
            writeln!(out, "{}", report.diagnostics.summary())?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, &report),
    }
}
