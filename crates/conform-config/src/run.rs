//! Run configuration
//!
//! [`RunOptions`] is the partial, mergeable form every source produces.
//! [`RunOptions::finalize`] validates it once and yields a
//! [`RunConfiguration`], which has no mutating API.

use crate::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Short-circuit directives evaluated before any suite setup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Directives {
    /// Print the configured test images and exit
    pub list_images: bool,
    /// Print version information and exit
    pub version: bool,
    /// Print conformance test metadata as YAML and exit
    pub list_conformance_tests: bool,
}

/// Partial run options from a single source (file, env, or flags)
///
/// `None` means "not set by this source". Empty strings are kept as-is
/// until finalization so a later source can clear an earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub focus: Option<String>,
    pub skip: Option<String>,
    pub report_dir: Option<PathBuf>,
    pub report_prefix: Option<String>,
    pub spec_dump: Option<PathBuf>,
    pub progress_report_url: Option<String>,
    pub parallel_node: Option<u32>,
    pub parallel_total: Option<u32>,
    pub repo_root: Option<PathBuf>,
    pub run_id: Option<String>,
}

impl RunOptions {
    /// Overlay `other` on top of `self`; values set in `other` win.
    pub fn merge(&mut self, other: RunOptions) {
        fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        overlay(&mut self.focus, other.focus);
        overlay(&mut self.skip, other.skip);
        overlay(&mut self.report_dir, other.report_dir);
        overlay(&mut self.report_prefix, other.report_prefix);
        overlay(&mut self.spec_dump, other.spec_dump);
        overlay(&mut self.progress_report_url, other.progress_report_url);
        overlay(&mut self.parallel_node, other.parallel_node);
        overlay(&mut self.parallel_total, other.parallel_total);
        overlay(&mut self.repo_root, other.repo_root);
        overlay(&mut self.run_id, other.run_id);
    }

    /// Validate and freeze these options.
    pub fn finalize(self, directives: Directives) -> ConfigResult<RunConfiguration> {
        let parallel_node = self.parallel_node.unwrap_or(1);
        let parallel_total = self.parallel_total.unwrap_or(1);

        if parallel_total == 0 {
            return Err(ConfigError::InvalidValue {
                field: "parallel.total".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if parallel_node == 0 {
            return Err(ConfigError::InvalidValue {
                field: "parallel.node".to_string(),
                reason: "nodes are numbered from 1".to_string(),
            });
        }
        if parallel_node > parallel_total {
            return Err(ConfigError::InvalidValue {
                field: "parallel.node".to_string(),
                reason: format!(
                    "node {} is out of range for {} total node(s)",
                    parallel_node, parallel_total
                ),
            });
        }

        Ok(RunConfiguration {
            directives,
            focus: self.focus.unwrap_or_default(),
            skip: self.skip.unwrap_or_default(),
            report_dir: non_empty_path(self.report_dir),
            report_prefix: self.report_prefix.unwrap_or_default(),
            spec_dump: non_empty_path(self.spec_dump),
            progress_report_url: self.progress_report_url.filter(|url| !url.is_empty()),
            parallel_node,
            parallel_total,
            repo_root: non_empty_path(self.repo_root),
            run_id: self.run_id.unwrap_or_default(),
        })
    }
}

fn non_empty_path(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Finalized configuration for one process
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfiguration {
    directives: Directives,
    focus: String,
    skip: String,
    report_dir: Option<PathBuf>,
    report_prefix: String,
    spec_dump: Option<PathBuf>,
    progress_report_url: Option<String>,
    parallel_node: u32,
    parallel_total: u32,
    repo_root: Option<PathBuf>,
    run_id: String,
}

impl RunConfiguration {
    pub fn directives(&self) -> Directives {
        self.directives
    }

    /// Focus regex as given; empty when unset
    pub fn focus(&self) -> &str {
        &self.focus
    }

    /// Skip regex as given; empty when unset
    pub fn skip(&self) -> &str {
        &self.skip
    }

    /// Directory for JUnit reports, if reporting to files
    pub fn report_dir(&self) -> Option<&Path> {
        self.report_dir.as_deref()
    }

    pub fn report_prefix(&self) -> &str {
        &self.report_prefix
    }

    /// Output path for the per-spec details dump
    pub fn spec_dump(&self) -> Option<&Path> {
        self.spec_dump.as_deref()
    }

    pub fn progress_report_url(&self) -> Option<&str> {
        self.progress_report_url.as_deref()
    }

    /// 1-based index of this worker process
    pub fn parallel_node(&self) -> u32 {
        self.parallel_node
    }

    pub fn parallel_total(&self) -> u32 {
        self.parallel_total
    }

    /// Repository checkout used as the last-resort fixture source
    pub fn repo_root(&self) -> Option<&Path> {
        self.repo_root.as_deref()
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}
