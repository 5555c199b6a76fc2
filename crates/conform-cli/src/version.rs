//! Build version information

use std::fmt;

/// Version details baked in at compile time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: &'static str,
    pub git_commit: &'static str,
    pub git_tree_state: &'static str,
    pub build_date: &'static str,
    pub platform: String,
}

impl VersionInfo {
    /// Version information for this binary
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_commit: option_env!("CONFORM_GIT_COMMIT").unwrap_or("unknown"),
            git_tree_state: option_env!("CONFORM_GIT_TREE_STATE").unwrap_or("unknown"),
            build_date: option_env!("CONFORM_BUILD_DATE").unwrap_or("unknown"),
            platform: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "conform version v{} (commit {}, tree {}, built {}, {})",
            self.version, self.git_commit, self.git_tree_state, self.build_date, self.platform
        )
    }
}
