use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use gat_cli::{
    cli::{Cli, Commands},
    config::AppConfig,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

fn init_logging(level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let level = match cli.log_level {
        Some(level) => level,
        None => config.log_level()?,
    };
    init_logging(level);

    match &cli.command {
        Commands::Lists { command } => commands::lists::handle(command, &config),
        Commands::Networks { command } => commands::networks::handle(command, &config),
        Commands::Completions { shell, out } => {
            commands::completions::handle(*shell, out.as_deref())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
