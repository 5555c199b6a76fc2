//! Fixture registry - ordered fallback over file sources

use crate::source::FileSource;
use crate::{FixtureError, FixtureResult};
use std::borrow::Cow;
use std::fmt;

/// Ordered, append-only list of file sources
///
/// Lookups try sources in registration order and return the first hit.
/// The registry is filled during bootstrap and then shared behind an
/// `Arc`, which makes it read-only for the rest of the process.
#[derive(Default)]
pub struct FixtureRegistry {
    sources: Vec<Box<dyn FileSource>>,
}

impl FixtureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source; it is consulted after every source already registered
    pub fn register(&mut self, source: impl FileSource + 'static) {
        self.sources.push(Box::new(source));
    }

    /// Number of registered sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Read `path` from the first source that has it
    pub fn read(&self, path: &str) -> FixtureResult<Cow<'static, [u8]>> {
        for source in &self.sources {
            if let Some(data) = source.read(path)? {
                return Ok(data);
            }
        }

        Err(FixtureError::NotFound {
            path: path.to_string(),
            descriptions: self.descriptions(),
        })
    }

    /// Read `path` as UTF-8 text
    pub fn read_to_string(&self, path: &str) -> FixtureResult<String> {
        let data = self.read(path)?;
        String::from_utf8(data.into_owned()).map_err(|_| FixtureError::InvalidUtf8 {
            path: path.to_string(),
        })
    }

    /// Check whether any source has `path`
    pub fn exists(&self, path: &str) -> FixtureResult<bool> {
        for source in &self.sources {
            if source.read(path)?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Descriptions of every source, in lookup order
    pub fn descriptions(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.describe_files()).collect()
    }
}

impl fmt::Debug for FixtureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureRegistry")
            .field("sources", &self.descriptions())
            .finish()
    }
}
