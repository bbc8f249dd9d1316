use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "gat", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level (overrides the configuration file)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// Configuration file to use instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Contingency list operations
    Lists {
        #[command(subcommand)]
        command: ListsCommands,
    },
    /// Network snapshot operations
    Networks {
        #[command(subcommand)]
        command: NetworksCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListsCommands {
    /// Check every definition of a list file
    Validate {
        #[command(flatten)]
        source: ListSource,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Show id, type and modification date of the lists
    Metadata {
        #[command(flatten)]
        source: ListSource,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Resolve lists into contingencies
    Export {
        #[command(flatten)]
        source: ListSource,
        #[command(flatten)]
        target: NetworkTarget,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Count the contingencies the lists resolve to
    Count {
        #[command(flatten)]
        source: ListSource,
        #[command(flatten)]
        target: NetworkTarget,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Resolve lists with not-found and disconnected element diagnostics
    Inspect {
        #[command(flatten)]
        source: ListSource,
        #[command(flatten)]
        target: NetworkTarget,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Subcommand, Debug)]
pub enum NetworksCommands {
    /// List network ids available in the network directory
    List {
        #[arg(long, value_hint = clap::ValueHint::DirPath)]
        network_dir: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Import a network document and report its contents and import issues
    Inspect {
        /// Network document (JSON or YAML)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ListSource {
    /// List definition file (YAML or JSON)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub lists: PathBuf,
    /// List id to use (repeatable; default: every list in the file)
    #[arg(long = "id")]
    pub ids: Vec<Uuid>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct NetworkTarget {
    /// Network id to evaluate against; without it lists are only inspected
    #[arg(long)]
    pub network: Option<String>,
    /// Directory holding network documents (default from configuration)
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub network_dir: Option<PathBuf>,
    /// Network variant to evaluate in (default: the working variant)
    #[arg(long)]
    pub variant: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <OutputFormat as ValueEnum>::from_str(s, true)
    }
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn test_parse_export() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "gat",
            "lists",
            "export",
            "--lists",
            "lists.yaml",
            "--id",
            &id.to_string(),
            "--network",
            "north",
            "--variant",
            "N-1",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Lists {
                command:
                    ListsCommands::Export {
                        source,
                        target,
                        format,
                    },
            } => {
                assert_eq!(source.ids, vec![id]);
                assert_eq!(target.network.as_deref(), Some("north"));
                assert_eq!(target.variant.as_deref(), Some("N-1"));
                assert_eq!(format, Some(OutputFormat::Json));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_output_format_from_config_string() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
