//! Spec details reporter - one JSON record per completed spec

use crate::reporters::ReportSink;
use crate::testing::{SpecSummary, SuiteSummary};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Machine-readable record for one spec
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecRecord {
    pub name: String,
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
    pub duration_secs: f64,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl From<&SpecSummary> for SpecRecord {
    fn from(spec: &SpecSummary) -> Self {
        Self {
            name: spec.text.clone(),
            file: spec.location.file.clone(),
            start_line: spec.location.start_line,
            end_line: spec.location.end_line,
            duration_secs: spec.run_time.as_secs_f64(),
            state: spec.state.as_str(),
            failure: spec.state.failure().map(ToString::to_string),
        }
    }
}

pub struct DetailsReporter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl DetailsReporter {
    /// Create (or truncate) the output file
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed creating spec details file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }
}

impl ReportSink for DetailsReporter {
    fn name(&self) -> &'static str {
        "details"
    }

    fn spec_did_complete(&mut self, spec: &SpecSummary) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &SpecRecord::from(spec))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn suite_did_end(&mut self, _summary: &SuiteSummary) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Failed writing spec details {}", self.path.display()))
    }
}
