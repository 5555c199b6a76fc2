//! File sources
//!
//! A source answers "give me the bytes for this slash-separated path".
//! `Ok(None)` means the source does not have the file, which lets the
//! registry fall through to the next one. `Err` is reserved for sources
//! that have the file but cannot produce it.

use crate::{FixtureError, FixtureResult};
use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};

/// A named provider of fixture content
pub trait FileSource: Send + Sync {
    /// Read `path`, or `Ok(None)` if this source doesn't contain it
    fn read(&self, path: &str) -> FixtureResult<Option<Cow<'static, [u8]>>>;

    /// Human-readable description of where this source looks
    fn describe_files(&self) -> String;
}

/// Files compiled into the binary, served under a fixed path prefix
///
/// `root` is the repository-relative directory the bundle was built from;
/// file names in `files` are relative to it.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedFileSource {
    root: &'static str,
    files: &'static [(&'static str, &'static [u8])],
}

impl EmbeddedFileSource {
    pub const fn new(root: &'static str, files: &'static [(&'static str, &'static [u8])]) -> Self {
        Self { root, files }
    }

    pub fn root(&self) -> &'static str {
        self.root
    }

    /// Paths of every embedded file, repository-relative
    pub fn paths(&self) -> impl Iterator<Item = String> + '_ {
        self.files
            .iter()
            .map(move |(name, _)| format!("{}/{}", self.root, name))
    }
}

impl FileSource for EmbeddedFileSource {
    fn read(&self, path: &str) -> FixtureResult<Option<Cow<'static, [u8]>>> {
        let Some(relative) = path
            .strip_prefix(self.root)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return Ok(None);
        };

        Ok(self
            .files
            .iter()
            .find(|(name, _)| *name == relative)
            .map(|(_, data)| Cow::Borrowed(*data)))
    }

    fn describe_files(&self) -> String {
        format!(
            "Test files are embedded into the binary directly under {}.",
            self.root
        )
    }
}

/// Files read from a repository checkout on disk
#[derive(Debug, Clone)]
pub struct RootFileSource {
    root: PathBuf,
}

impl RootFileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

impl FileSource for RootFileSource {
    fn read(&self, path: &str) -> FixtureResult<Option<Cow<'static, [u8]>>> {
        let full_path = self.full_path(path);
        match std::fs::read(&full_path) {
            Ok(data) => Ok(Some(Cow::Owned(data))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FixtureError::Io {
                path: full_path,
                source: e,
            }),
        }
    }

    fn describe_files(&self) -> String {
        format!(
            "Test files are expected in {} relative to the repository root.",
            self.root.display()
        )
    }
}
