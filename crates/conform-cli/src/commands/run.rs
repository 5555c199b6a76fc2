//! Run command - bootstrap fixtures, assemble reporters and run the suite

use crate::bootstrap;
use crate::config::RUN_ID_ENV;
use crate::reporters::{self, ConsoleReporter, Reporters};
use crate::specs;
use crate::testing::{SpecFilter, SpecRunner, SuiteOutcome};
use anyhow::{Context, Result};
use conform_config::{ConfigLoader, Directives, RunOptions};
use rand::RngExt;
use std::env;
use std::path::PathBuf;

/// Arguments for the run command
#[derive(Debug, Default)]
pub struct RunArgs {
    /// Options given on the command line
    pub options: RunOptions,
    /// Optional TOML config file
    pub config_file: Option<PathBuf>,
    pub directives: Directives,
    /// Verbose console output
    pub verbose: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Fixed shuffle seed, mainly for tests
    pub seed: Option<u64>,
}

/// Fresh identifier shared by every worker of one run
pub fn new_run_id() -> String {
    format!("{:016x}", rand::rng().random::<u64>())
}

/// Run the suite for this worker process
pub fn run(args: RunArgs) -> Result<SuiteOutcome> {
    let mut options = args.options;
    if options.run_id.is_none() && env::var_os(RUN_ID_ENV).is_none() {
        options.run_id = Some(new_run_id());
    }

    let mut loader = ConfigLoader::new().with_directives(args.directives);
    if let Some(path) = &args.config_file {
        loader = loader.with_file(path);
    }
    let config = loader.load(options).context("Invalid run configuration")?;

    let filter = SpecFilter::from_config(&config).context("Invalid focus/skip pattern")?;
    tracing::debug!(
        focus = filter.focus_pattern(),
        skip = filter.skip_pattern(),
        "spec filter"
    );
    let registry = bootstrap::run_registry(config.repo_root());

    let mut sinks = Reporters::new();
    sinks.push(ConsoleReporter::new(args.verbose).with_no_color(args.no_color));
    sinks.extend(reporters::assemble(&config)?);

    let mut runner = SpecRunner::new(filter)
        .with_shard(config.parallel_node(), config.parallel_total());
    if let Some(seed) = args.seed {
        runner = runner.with_seed(seed);
    }

    tracing::info!(
        run_id = config.run_id(),
        node = config.parallel_node(),
        total = config.parallel_total(),
        seed = runner.seed(),
        "starting e2e run {} on node {}",
        config.run_id(),
        config.parallel_node()
    );

    let outcome = runner.run(&specs::suite(), &registry, &config, &mut sinks);
    if let SuiteOutcome::Failed { failed } = outcome {
        tracing::info!(failed, "e2e run finished with failures");
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_id_format() {
        let id = new_run_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    #[serial]
    fn test_run_writes_junit_report() {
        let temp = TempDir::new().unwrap();
        let reports = temp.path().join("reports");

        let outcome = run(RunArgs {
            options: RunOptions {
                report_dir: Some(reports.clone()),
                report_prefix: Some("unit_".to_string()),
                ..Default::default()
            },
            no_color: true,
            seed: Some(11),
            ..Default::default()
        })
        .unwrap();

        assert!(outcome.is_success());
        let xml = fs::read_to_string(reports.join("junit_unit_01.xml")).unwrap();
        assert!(xml.contains("<testsuite name=\"Conform e2e suite\""));
    }

    #[test]
    #[serial]
    fn test_invalid_focus_is_setup_error() {
        let err = run(RunArgs {
            options: RunOptions {
                focus: Some("([".to_string()),
                ..Default::default()
            },
            no_color: true,
            ..Default::default()
        })
        .unwrap_err();

        assert!(err.to_string().contains("Invalid focus/skip pattern"));
    }

    #[test]
    #[serial]
    fn test_out_of_range_node_is_setup_error() {
        let err = run(RunArgs {
            options: RunOptions {
                parallel_node: Some(5),
                parallel_total: Some(2),
                ..Default::default()
            },
            no_color: true,
            ..Default::default()
        })
        .unwrap_err();

        assert!(err.to_string().contains("Invalid run configuration"));
    }
}
