//! Diagnostic dispatch - short-circuit actions that never run the suite

use crate::commands;
use crate::config::Config;
use anyhow::Result;
use conform_config::Directives;
use conform_fixtures::FixtureRegistry;
use std::io::Write;

/// Which diagnostic, if any, this process performs instead of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticAction {
    None,
    PrintImages,
    PrintVersion,
    PrintConformance,
}

impl DiagnosticAction {
    /// Pick the action. Images win over version, version over conformance.
    pub fn select(directives: Directives) -> Self {
        if directives.list_images {
            DiagnosticAction::PrintImages
        } else if directives.version {
            DiagnosticAction::PrintVersion
        } else if directives.list_conformance_tests {
            DiagnosticAction::PrintConformance
        } else {
            DiagnosticAction::None
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DiagnosticAction::None)
    }

    /// Perform the action, writing its output to `out`. Conformance data is
    /// read from `fixtures`.
    pub fn perform(
        self,
        config: &Config,
        fixtures: &FixtureRegistry,
        out: &mut impl Write,
    ) -> Result<()> {
        match self {
            DiagnosticAction::None => Ok(()),
            DiagnosticAction::PrintImages => commands::images::run(config.repo_list.as_deref(), out),
            DiagnosticAction::PrintVersion => commands::version::run(out),
            DiagnosticAction::PrintConformance => commands::conformance::run(fixtures, out),
        }
    }
}
