//! Console reporter - human readable progress on stdout

use crate::reporters::ReportSink;
use crate::testing::{SpecState, SpecSummary, SuiteSummary};
use anyhow::Result;
use colored::*;
use std::io::{self, Write};

/// Default reporter, always first in the sink list
pub struct ConsoleReporter {
    /// One line per spec instead of one character
    verbose: bool,
    /// Disable colored output
    no_color: bool,
    out: Box<dyn Write + Send>,
    failures: Vec<SpecSummary>,
}

impl ConsoleReporter {
    /// Create a console reporter writing to stdout
    pub fn new(verbose: bool) -> Self {
        Self::with_writer(verbose, Box::new(io::stdout()))
    }

    pub fn with_writer(verbose: bool, out: Box<dyn Write + Send>) -> Self {
        Self {
            verbose,
            no_color: false,
            out,
            failures: Vec::new(),
        }
    }

    /// Disable colored output
    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        if no_color {
            colored::control::set_override(false);
        }
        self
    }

    fn print_failures(&mut self) -> io::Result<()> {
        if self.failures.is_empty() {
            return Ok(());
        }

        writeln!(self.out)?;
        writeln!(self.out, "{}", "Summarizing Failures:".red().bold())?;
        writeln!(self.out)?;

        for spec in &self.failures {
            let label = match spec.state {
                SpecState::Panicked(_) => "[PANICKED]".magenta().bold(),
                _ => "[FAIL]".red().bold(),
            };
            writeln!(self.out, "  {} {}", label, spec.text)?;
            writeln!(self.out, "  {}", spec.location.to_string().dimmed())?;
            if let Some(failure) = spec.state.failure() {
                for line in failure.to_string().lines() {
                    writeln!(self.out, "      {}", line.dimmed())?;
                }
            }
            writeln!(self.out)?;
        }
        Ok(())
    }
}

impl ReportSink for ConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn suite_will_begin(&mut self, summary: &SuiteSummary) -> Result<()> {
        writeln!(self.out, "Running Suite: {}", summary.title.bold())?;
        writeln!(self.out, "{}", "=".repeat(50))?;
        writeln!(self.out, "Random Seed: {}", summary.seed)?;
        if summary.total_nodes > 1 {
            writeln!(
                self.out,
                "Parallel test node {}/{}",
                summary.node, summary.total_nodes
            )?;
        }
        writeln!(
            self.out,
            "Will run {} of {} specs",
            summary.specs_to_run.to_string().bold(),
            summary.total_specs
        )?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    fn spec_did_complete(&mut self, spec: &SpecSummary) -> Result<()> {
        if self.verbose {
            let label = match spec.state {
                SpecState::Passed => "PASS".green().bold(),
                SpecState::Skipped { .. } => "SKIP".cyan().bold(),
                SpecState::Failed(_) => "FAIL".red().bold(),
                SpecState::Panicked(_) => "PANIC".magenta().bold(),
            };
            writeln!(self.out, "{} {} ({:.2?})", label, spec.text, spec.run_time)?;
            if let SpecState::Skipped { reason } = &spec.state {
                writeln!(self.out, "      {}", reason.dimmed())?;
            }
        } else {
            let mark = match spec.state {
                SpecState::Passed => ".".green(),
                SpecState::Skipped { .. } => "S".cyan(),
                SpecState::Failed(_) => "F".red().bold(),
                SpecState::Panicked(_) => "P".magenta().bold(),
            };
            write!(self.out, "{}", mark)?;
            self.out.flush()?;
        }

        if spec.state.is_failure() {
            self.failures.push(spec.clone());
        }
        Ok(())
    }

    fn suite_did_end(&mut self, summary: &SuiteSummary) -> Result<()> {
        // Dots need a trailing newline
        if !self.verbose && summary.total_specs > 0 {
            writeln!(self.out)?;
        }

        self.print_failures()?;

        writeln!(self.out, "{}", "─".repeat(50))?;
        let status = if summary.failed > 0 {
            "FAIL!".red().bold()
        } else {
            "SUCCESS!".green().bold()
        };
        writeln!(
            self.out,
            "Ran {} of {} specs in {:.2?}",
            summary.passed + summary.failed,
            summary.total_specs,
            summary.run_time
        )?;
        writeln!(
            self.out,
            "{} -- {} Passed | {} Failed | {} Skipped",
            status,
            summary.passed.to_string().green().bold(),
            if summary.failed > 0 {
                summary.failed.to_string().red().bold()
            } else {
                summary.failed.to_string().normal()
            },
            summary.skipped
        )?;
        self.out.flush()?;

        if self.no_color {
            colored::control::unset_override();
        }
        Ok(())
    }
}
