//! JUnit XML reporter, one file per worker node

use crate::reporters::ReportSink;
use crate::testing::{SpecState, SpecSummary, SuiteSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

/// Collects spec results and writes them as a `<testsuite>` when the suite ends
pub struct JUnitReporter {
    path: PathBuf,
    started: Option<DateTime<Utc>>,
    cases: Vec<SpecSummary>,
}

impl JUnitReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            started: None,
            cases: Vec::new(),
        }
    }

    /// Render the collected results as a JUnit document
    pub fn render(&self, summary: &SuiteSummary) -> String {
        let errors = self
            .cases
            .iter()
            .filter(|case| matches!(case.state, SpecState::Panicked(_)))
            .count();
        let failures = self
            .cases
            .iter()
            .filter(|case| matches!(case.state, SpecState::Failed(_)))
            .count();
        let skipped = self
            .cases
            .iter()
            .filter(|case| matches!(case.state, SpecState::Skipped { .. }))
            .count();
        let timestamp = self
            .started
            .unwrap_or_else(Utc::now)
            .format("%Y-%m-%dT%H:%M:%S");

        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            xml,
            "<testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"{}\" skipped=\"{}\" time=\"{:.3}\" timestamp=\"{}\">",
            escape(&summary.title),
            self.cases.len(),
            failures,
            errors,
            skipped,
            summary.run_time.as_secs_f64(),
            timestamp
        );

        for case in &self.cases {
            let _ = write!(
                xml,
                "  <testcase name=\"{}\" classname=\"{}\" time=\"{:.3}\"",
                escape(&case.text),
                escape(&summary.title),
                case.run_time.as_secs_f64()
            );
            match &case.state {
                SpecState::Passed => xml.push_str("></testcase>\n"),
                SpecState::Skipped { reason } => {
                    let _ = writeln!(
                        xml,
                        ">\n    <skipped message=\"{}\"></skipped>\n  </testcase>",
                        escape(reason)
                    );
                }
                SpecState::Failed(failure) | SpecState::Panicked(failure) => {
                    let kind = match case.state {
                        SpecState::Panicked(_) => "Panic",
                        _ => "Failure",
                    };
                    let _ = writeln!(
                        xml,
                        ">\n    <failure type=\"{}\" message=\"{}\">{}</failure>\n  </testcase>",
                        kind,
                        escape(&failure.message),
                        escape(&failure.to_string())
                    );
                }
            }
        }

        xml.push_str("</testsuite>\n");
        xml
    }
}

impl ReportSink for JUnitReporter {
    fn name(&self) -> &'static str {
        "junit"
    }

    fn suite_will_begin(&mut self, _summary: &SuiteSummary) -> Result<()> {
        self.started = Some(Utc::now());
        self.cases.clear();
        Ok(())
    }

    fn spec_did_complete(&mut self, spec: &SpecSummary) -> Result<()> {
        self.cases.push(spec.clone());
        Ok(())
    }

    fn suite_did_end(&mut self, summary: &SuiteSummary) -> Result<()> {
        fs::write(&self.path, self.render(summary))
            .with_context(|| format!("Failed writing junit report {}", self.path.display()))
    }
}

/// Escape text for use in XML attributes and character data
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\n' | '\r' | '\t' => escaped.push(c),
            c if c.is_control() => {}
            c => escaped.push(c),
        }
    }
    escaped
}
