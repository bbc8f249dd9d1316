//! Format detection for network snapshot documents.

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use super::document::NetworkDocument;

/// Supported snapshot encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// All supported formats, in lookup order.
    pub const ALL: &'static [Format] = &[Format::Json, Format::Yaml];

    /// Expected file extensions for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Json => &["json"],
            Format::Yaml => &["yaml", "yml"],
        }
    }

    /// Human-readable format name.
    pub fn friendly_name(&self) -> &'static str {
        match self {
            Format::Json => "JSON network document",
            Format::Yaml => "YAML network document",
        }
    }

    /// Detect the format from the file extension.
    pub fn detect(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?;
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Decode a document in this format.
    pub fn decode(&self, data: &str) -> Result<NetworkDocument> {
        match self {
            Format::Json => serde_json::from_str(data).context("parsing network document json"),
            Format::Yaml => serde_yaml::from_str(data).context("parsing network document yaml"),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.friendly_name())
    }
}

impl std::str::FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            other => Err(anyhow!("unknown network document format '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(Format::detect(Path::new("grid.json")), Some(Format::Json));
        assert_eq!(Format::detect(Path::new("grid.YML")), Some(Format::Yaml));
        assert_eq!(Format::detect(Path::new("grid.raw")), None);
        assert_eq!(Format::detect(Path::new("grid")), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("YAML".parse::<Format>().unwrap(), Format::Yaml);
        assert!("xml".parse::<Format>().is_err());
    }
}
