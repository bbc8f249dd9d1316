//! # gat-io: network snapshot import
//!
//! Reads network snapshots from JSON or YAML documents into
//! [`gat_core::Network`] and serves them by id from a directory.
//!
//! Importers do not stop at the first bad record: records that cannot be
//! placed in the network (unknown voltage level, duplicate id, ...) are
//! skipped and reported in the returned [`gat_core::Diagnostics`].
//!
//! ```rust,no_run
//! use gat_io::importers::import_network;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let result = import_network(Path::new("grids/north.yaml"))?;
//!     println!("{}", result.network.stats());
//!     println!("{}", result.diagnostics.summary());
//!     Ok(())
//! }
//! ```

pub mod importers;
pub mod provider;

pub use importers::{import_network, Format, ImportResult, NetworkDocument};
pub use provider::DirectoryNetworkProvider;
