pub mod cli;
pub mod config;

pub use cli::{
    build_cli_command, Cli, Commands, ListSource, ListsCommands, NetworkTarget, NetworksCommands,
    OutputFormat,
};
pub use config::AppConfig;
