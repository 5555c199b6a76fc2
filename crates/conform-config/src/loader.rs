//! Configuration Loader
//!
//! Merges the config file, environment and CLI flags into one
//! [`RunConfiguration`].

use crate::file::ConfigFile;
use crate::run::{Directives, RunConfiguration, RunOptions};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Precedence, lowest first:
/// 1. Built-in defaults
/// 2. Config file (when one is given)
/// 3. Environment variables (CONFORM_*)
/// 4. CLI flags (passed to [`ConfigLoader::load`])
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    directives: Directives,
}

impl ConfigLoader {
    /// Create a loader with no config file
    pub fn new() -> Self {
        Self::default()
    }

    /// Read file-level defaults from `path`
    pub fn with_file(mut self, path: &Path) -> Self {
        self.file = Some(path.to_path_buf());
        self
    }

    /// Record the diagnostic directives for the finalized configuration
    pub fn with_directives(mut self, directives: Directives) -> Self {
        self.directives = directives;
        self
    }

    /// Merge every source and finalize
    pub fn load(&self, flags: RunOptions) -> ConfigResult<RunConfiguration> {
        let mut options = match &self.file {
            Some(path) => ConfigFile::load_from_file(path)?.into_options(),
            None => RunOptions::default(),
        };

        options.merge(Self::env_overrides()?);
        options.merge(flags);
        options.finalize(self.directives)
    }

    /// Collect overrides from the environment
    ///
    /// Variables follow the pattern CONFORM_<KEY>, e.g. CONFORM_REPORT_DIR.
    pub fn env_overrides() -> ConfigResult<RunOptions> {
        Ok(RunOptions {
            focus: env::var("CONFORM_FOCUS").ok(),
            skip: env::var("CONFORM_SKIP").ok(),
            report_dir: env::var_os("CONFORM_REPORT_DIR").map(PathBuf::from),
            report_prefix: env::var("CONFORM_REPORT_PREFIX").ok(),
            spec_dump: env::var_os("CONFORM_SPEC_DUMP").map(PathBuf::from),
            progress_report_url: env::var("CONFORM_PROGRESS_REPORT_URL").ok(),
            parallel_node: parse_env_u32("CONFORM_PARALLEL_NODE")?,
            parallel_total: parse_env_u32("CONFORM_PARALLEL_TOTAL")?,
            repo_root: env::var_os("CONFORM_REPO_ROOT").map(PathBuf::from),
            run_id: env::var("CONFORM_RUN_ID").ok(),
        })
    }
}

fn parse_env_u32(name: &str) -> ConfigResult<Option<u32>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                field: name.to_string(),
                reason: format!("expected a positive integer, got '{}'", value),
            }),
        Err(_) => Ok(None),
    }
}
