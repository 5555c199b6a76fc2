//! Test fixture lookup
//!
//! Specs and diagnostics read manifests and metadata by repository-relative
//! path (e.g. `test/conformance/testdata/conformance.yaml`). The
//! [`FixtureRegistry`] answers those reads from an ordered list of
//! [`FileSource`]s: the bundles compiled into the binary first, then an
//! optional repository checkout on disk.
//!
//! # Example
//!
//! ```
//! use conform_fixtures::{bundles, FixtureRegistry};
//!
//! let mut registry = FixtureRegistry::new();
//! bundles::register_embedded(&mut registry);
//!
//! let data = registry
//!     .read("test/conformance/testdata/conformance.yaml")
//!     .unwrap();
//! assert!(!data.is_empty());
//! ```

pub mod bundles;
pub mod registry;
pub mod source;

use std::path::PathBuf;
use thiserror::Error;

/// Fixture lookup errors
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("could not find file {path} in any of the file sources: {}", .descriptions.join("; "))]
    NotFound {
        path: String,
        descriptions: Vec<String>,
    },

    #[error("fatal error retrieving test file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("test file {path} is not valid UTF-8")]
    InvalidUtf8 { path: String },
}

/// Result type for fixture operations
pub type FixtureResult<T> = Result<T, FixtureError>;

pub use registry::FixtureRegistry;
pub use source::{EmbeddedFileSource, FileSource, RootFileSource};
