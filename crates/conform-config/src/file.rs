//! Config file (conform.toml)
//!
//! Optional file-level defaults for a suite run. Every field may be
//! overridden by environment variables or CLI flags.

use crate::run::RunOptions;
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file contents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Spec selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<SuiteSection>,

    /// Report outputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportSection>,

    /// Progress streaming
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressSection>,

    /// Worker layout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<ParallelSection>,

    /// Fixture lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixtures: Option<FixturesSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SuiteSection {
    /// Only run specs whose text matches this regex
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,

    /// Skip specs whose text matches this regex
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ReportSection {
    /// Directory for JUnit XML files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Prefix inserted into JUnit file names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Path for the per-spec details dump
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_dump: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProgressSection {
    /// URL accepting progress updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ParallelSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct FixturesSection {
    /// Repository checkout searched after the embedded bundles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_root: Option<PathBuf>,
}

impl ConfigFile {
    /// Load a config file from disk
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })
    }

    /// Flatten the sections into mergeable run options
    pub fn into_options(self) -> RunOptions {
        let suite = self.suite.unwrap_or_default();
        let report = self.report.unwrap_or_default();
        let progress = self.progress.unwrap_or_default();
        let parallel = self.parallel.unwrap_or_default();
        let fixtures = self.fixtures.unwrap_or_default();

        RunOptions {
            focus: suite.focus,
            skip: suite.skip,
            report_dir: report.dir,
            report_prefix: report.prefix,
            spec_dump: report.spec_dump,
            progress_report_url: progress.url,
            parallel_node: parallel.node,
            parallel_total: parallel.total,
            repo_root: fixtures.repo_root,
            run_id: None,
        }
    }
}
