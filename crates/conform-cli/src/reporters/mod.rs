//! Report sinks and their assembly for one run

pub mod console;
pub mod details;
pub mod junit;
pub mod progress;

pub use console::ConsoleReporter;
pub use details::DetailsReporter;
pub use junit::JUnitReporter;
pub use progress::ProgressReporter;

use crate::testing::{SpecLocation, SpecSummary, SuiteSummary};
use anyhow::{Context, Result};
use conform_config::RunConfiguration;
use std::fs;
use std::path::Path;

/// Receives run events. Every method defaults to doing nothing.
pub trait ReportSink: Send {
    /// Short name used when logging sink errors
    fn name(&self) -> &'static str;

    fn suite_will_begin(&mut self, _summary: &SuiteSummary) -> Result<()> {
        Ok(())
    }

    fn spec_will_run(&mut self, _text: &str, _location: &SpecLocation) -> Result<()> {
        Ok(())
    }

    fn spec_did_complete(&mut self, _spec: &SpecSummary) -> Result<()> {
        Ok(())
    }

    fn suite_did_end(&mut self, _summary: &SuiteSummary) -> Result<()> {
        Ok(())
    }
}

/// Ordered fan-out over the active sinks
#[derive(Default)]
pub struct Reporters {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl Reporters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl ReportSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn extend(&mut self, sinks: impl IntoIterator<Item = Box<dyn ReportSink>>) {
        self.sinks.extend(sinks);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }

    pub fn suite_will_begin(&mut self, summary: &SuiteSummary) {
        self.each("suite_will_begin", |sink| sink.suite_will_begin(summary));
    }

    pub fn spec_will_run(&mut self, text: &str, location: &SpecLocation) {
        self.each("spec_will_run", |sink| sink.spec_will_run(text, location));
    }

    pub fn spec_did_complete(&mut self, spec: &SpecSummary) {
        self.each("spec_did_complete", |sink| sink.spec_did_complete(spec));
    }

    pub fn suite_did_end(&mut self, summary: &SuiteSummary) {
        self.each("suite_did_end", |sink| sink.suite_did_end(summary));
    }

    fn each(&mut self, event: &str, mut deliver: impl FnMut(&mut dyn ReportSink) -> Result<()>) {
        for sink in &mut self.sinks {
            if let Err(e) = deliver(sink.as_mut()) {
                tracing::warn!(sink = sink.name(), event, "reporter failed: {:#}", e);
            }
        }
    }
}

impl std::fmt::Debug for Reporters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporters")
            .field("sinks", &self.names())
            .finish()
    }
}

/// Create the report directory if needed; existing directories are fine
pub fn ensure_report_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed creating report directory {}", dir.display()))
}

/// JUnit file name for one worker, e.g. `junit_03.xml` or `junit_gce_03.xml`
pub fn report_file_name(prefix: &str, node: u32) -> String {
    format!("junit_{}{:02}.xml", prefix, node)
}

/// Build the configured sinks: JUnit (when a report dir is set), progress
/// (always), then spec details (when a dump path is set).
pub fn assemble(config: &RunConfiguration) -> Result<Vec<Box<dyn ReportSink>>> {
    let mut sinks: Vec<Box<dyn ReportSink>> = Vec::new();

    if let Some(dir) = config.report_dir() {
        ensure_report_dir(dir)?;
        let path = dir.join(report_file_name(
            config.report_prefix(),
            config.parallel_node(),
        ));
        tracing::info!(path = %path.display(), "writing junit report");
        sinks.push(Box::new(JUnitReporter::new(path)));
    }

    sinks.push(Box::new(ProgressReporter::new(
        config.progress_report_url().map(str::to_string),
    )?));

    if let Some(path) = config.spec_dump() {
        sinks.push(Box::new(DetailsReporter::create(path)?));
    }

    Ok(sinks)
}
