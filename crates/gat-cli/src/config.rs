//! Layered CLI configuration.
//!
//! Sources, lowest priority first:
//! 1. built-in defaults
//! 2. `gat.toml` in the working directory
//! 3. `~/.config/gat/config.toml`
//! 4. an explicit `--config` file
//! 5. `GAT_*` environment variables (`GAT_NETWORKS__DIRECTORY=/data/grids`)

use crate::cli::OutputFormat;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub networks: NetworksConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworksConfig {
    /// Directory searched for `<id>.json`, `<id>.yaml` and `<id>.yml` documents.
    #[serde(default = "default_network_directory")]
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Variant used when `--variant` is not given.
    #[serde(default)]
    pub default_variant: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_format")]
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_network_directory() -> PathBuf {
    PathBuf::from("networks")
}

fn default_output_format() -> String {
    "plain".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NetworksConfig {
    fn default() -> Self {
        Self {
            directory: default_network_directory(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load from every configuration source, with `explicit` taking priority
    /// over the default file locations.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("gat").required(false));

        if let Some(home) = dirs::home_dir() {
            let user_file = home.join(".config").join("gat").join("config.toml");
            builder = builder.add_source(
                File::from(user_file)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        builder
            .add_source(
                Environment::with_prefix("GAT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        self.output.format.parse().map_err(|_| {
            ConfigError::Message(format!(
                "output.format must be 'plain' or 'json', got '{}'",
                self.output.format
            ))
        })
    }

    pub fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        self.logging.level.parse().map_err(|_| {
            ConfigError::Message(format!("invalid logging.level '{}'", self.logging.level))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.networks.directory, PathBuf::from("networks"));
        assert_eq!(config.evaluation.default_variant, None);
        assert_eq!(config.output_format().unwrap(), OutputFormat::Plain);
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            concat!(
                "[networks]\ndirectory = \"/data/grids\"\n\n",
                "[evaluation]\ndefault_variant = \"N-1\"\n\n",
                "[output]\nformat = \"json\""
            )
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.networks.directory, PathBuf::from("/data/grids"));
        assert_eq!(config.evaluation.default_variant.as_deref(), Some("N-1"));
        assert_eq!(config.output_format().unwrap(), OutputFormat::Json);
        // untouched sections keep their defaults
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let config = AppConfig {
            output: OutputConfig {
                format: "xml".into(),
            },
            logging: LoggingConfig {
                level: "loud".into(),
            },
            ..Default::default()
        };
        assert!(config.output_format().is_err());
        assert!(config.log_level().is_err());
    }
}
