//! Unified error types for the GAT contingency workspace
//!
//! This module provides a common error type [`GatError`] shared by the network
//! model, the importers and the contingency list engine. Failures that only
//! affect one requested list or one referenced element are NOT errors: the
//! engine folds them into its result payload. Everything that reaches this
//! enum aborts the current call.
//!
//! # Example
//!
//! ```
//! use gat_core::{GatError, GatResult, Network};
//!
//! fn is_open(network: &Network, variant: &str, element: &str) -> GatResult<bool> {
//!     let view = network.view(Some(variant))?;
//!     let element = view
//!         .element(element)
//!         .ok_or_else(|| GatError::Network(format!("unknown element '{element}'")))?;
//!     Ok(view.is_disconnected(&element))
//! }
//!
//! let network = Network::new("grid");
//! assert!(matches!(
//!     is_open(&network, "N-1", "L1"),
//!     Err(GatError::VariantNotFound(_))
//! ));
//! ```

use thiserror::Error;

/// Unified error type for all GAT operations.
#[derive(Error, Debug)]
pub enum GatError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed contingency list definition (bad operator, empty group,
    /// unsupported equipment type, inconsistent range bounds, ...)
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    /// The requested network snapshot does not exist
    #[error("Network '{0}' not found")]
    NetworkNotFound(String),

    /// The requested variant does not exist on the network snapshot
    #[error("Variant '{0}' not found")]
    VariantNotFound(String),

    /// A contingency list id is unknown to the definition store
    #[error("Contingency list {0} not found")]
    ListNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network structure errors
    #[error("Network error: {0}")]
    Network(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using GatError.
pub type GatResult<T> = Result<T, GatError>;

// Conversion from anyhow::Error
impl From<anyhow::Error> for GatError {
    fn from(err: anyhow::Error) -> Self {
        GatError::Other(err.to_string())
    }
}

// Conversion from string-like types for convenience
impl From<String> for GatError {
    fn from(s: String) -> Self {
        GatError::Other(s)
    }
}

impl From<&str> for GatError {
    fn from(s: &str) -> Self {
        GatError::Other(s.to_string())
    }
}

// JSON parsing errors
impl From<serde_json::Error> for GatError {
    fn from(err: serde_json::Error) -> Self {
        GatError::Parse(err.to_string())
    }
}
