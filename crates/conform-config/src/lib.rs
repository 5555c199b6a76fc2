//! Conform run configuration
//!
//! Everything that decides how a suite run is dispatched and reported:
//! - Diagnostic directives (`--list-images`, `--version`, `--list-conformance-tests`)
//! - Config file (`conform.toml`)
//! - Environment overrides (`CONFORM_*`)
//! - Finalization into an immutable [`RunConfiguration`]
//!
//! # Configuration Hierarchy
//!
//! Values are merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Config file (`--config`)
//! 3. Environment variables (`CONFORM_*`)
//! 4. CLI flags
//!
//! # Example
//!
//! ```no_run
//! use conform_config::{ConfigLoader, RunOptions};
//! use std::path::Path;
//!
//! let config = ConfigLoader::new()
//!     .with_file(Path::new("conform.toml"))
//!     .load(RunOptions::default())
//!     .unwrap();
//! assert!(config.parallel_node() >= 1);
//! ```

pub mod file;
pub mod loader;
pub mod run;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use file::ConfigFile;
pub use loader::ConfigLoader;
pub use run::{Directives, RunConfiguration, RunOptions};
