//! CLI configuration via environment variables
//!
//! Process-wide knobs that are not run options: log filtering, console
//! colors and the image registry override.

use std::env;
use std::path::PathBuf;

/// Log filter variable, read by the tracing subscriber
pub const LOG_ENV: &str = "CONFORM_LOG";
/// YAML file overriding image registries
pub const REPO_LIST_ENV: &str = "CONFORM_REPO_LIST";
/// Shared id for all workers of one launch
pub const RUN_ID_ENV: &str = "CONFORM_RUN_ID";

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Tracing filter directive (CONFORM_LOG, defaults to `info`)
    pub log_filter: String,
    /// Disable colored output (CONFORM_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
    /// Image registry overrides (CONFORM_REPO_LIST=/path/to/repo-list.yaml)
    pub repo_list: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            log_filter: env::var(LOG_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "info".to_string()),
            no_color: env::var("CONFORM_NO_COLOR").is_ok() || env::var("NO_COLOR").is_ok(),
            repo_list: env::var_os(REPO_LIST_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
