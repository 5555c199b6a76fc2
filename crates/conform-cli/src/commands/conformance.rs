//! List-conformance-tests command - print conformance metadata as YAML

use anyhow::{Context, Result};
use conform_fixtures::{bundles::CONFORMANCE_YAML, FixtureRegistry};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Metadata for one conformance test
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConformanceTest {
    pub testname: String,
    pub codename: String,
    pub description: String,
    pub release: String,
    pub file: String,
}

/// Parse a conformance document. An empty document is an empty list.
pub fn parse(source: &str) -> Result<Vec<ConformanceTest>> {
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }
    let tests: Option<Vec<ConformanceTest>> =
        serde_yaml::from_str(source).context("Failed to unmarshal conformance data")?;
    Ok(tests.unwrap_or_default())
}

pub fn encode(tests: &[ConformanceTest]) -> Result<String> {
    serde_yaml::to_string(tests).context("Failed to marshal conformance data")
}

/// Read, parse and re-encode the conformance list. Output is only written
/// once encoding has fully succeeded.
pub fn run(registry: &FixtureRegistry, out: &mut impl Write) -> Result<()> {
    let source = registry
        .read_to_string(CONFORMANCE_YAML)
        .context("Failed to read conformance data")?;
    let tests = parse(&source)?;
    let encoded = encode(&tests)?;

    out.write_all(encoded.as_bytes())?;
    out.flush()?;
    Ok(())
}
