use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use conform_config::{Directives, RunOptions};
use conform_fixtures::FixtureRegistry;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

mod bootstrap;
mod commands;
mod config;
mod dispatch;
mod images;
mod reporters;
mod specs;
mod testing;
mod version;

use config::Config;
use dispatch::DiagnosticAction;

/// Conform e2e suite runner.
///
/// Runs the end-to-end suite against embedded fixtures and writes results to
/// the console, JUnit XML files, a progress stream and a spec details dump.
/// A diagnostic flag prints information instead of running anything.
///
/// EXAMPLES:
///     conform --list-images                         Print test image references
///     conform --list-conformance-tests              Print conformance metadata
///     conform --focus 'sig-apps' --report-dir out   Run a subset, write JUnit
///     conform --nodes 4 --report-dir out            Run on four worker processes
///
/// ENVIRONMENT VARIABLES:
///     CONFORM_LOG        Log filter (default: info), logs go to stderr
///     CONFORM_REPO_LIST  YAML file overriding image registries
///     CONFORM_<OPTION>   Any run option, e.g. CONFORM_REPORT_DIR
///     NO_COLOR           Set to disable colored output
#[derive(Parser, Debug)]
#[command(name = "conform")]
#[command(disable_version_flag = true)]
#[command(args_override_self = true)]
struct Cli {
    /// Print the test images used by the suite and exit
    #[arg(
        long,
        env = "CONFORM_LIST_IMAGES",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    list_images: bool,

    /// Print version information and exit
    #[arg(long)]
    version: bool,

    /// Print conformance test metadata as YAML and exit
    #[arg(
        long,
        env = "CONFORM_LIST_CONFORMANCE_TESTS",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    list_conformance_tests: bool,

    /// Path to a TOML config file
    #[arg(long, short = 'c', env = "CONFORM_CONFIG")]
    config: Option<PathBuf>,

    /// Only run specs whose text matches this regex
    #[arg(long)]
    focus: Option<String>,

    /// Skip specs whose text matches this regex
    #[arg(long)]
    skip: Option<String>,

    /// Directory for JUnit XML reports
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Prefix for JUnit report file names
    #[arg(long)]
    report_prefix: Option<String>,

    /// This worker's 1-based index
    #[arg(long)]
    parallel_node: Option<u32>,

    /// Total number of workers
    #[arg(long)]
    parallel_total: Option<u32>,

    /// Launch this many worker processes
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    nodes: u32,

    /// URL to POST progress updates to
    #[arg(long)]
    progress_report_url: Option<String>,

    /// Write one JSON record per spec to this file
    #[arg(long)]
    spec_dump: Option<PathBuf>,

    /// Repository root used when a fixture is not embedded
    #[arg(long)]
    repo_root: Option<PathBuf>,

    /// Print one line per spec
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Disable colored output (NO_COLOR and CONFORM_NO_COLOR are read separately)
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn directives(&self) -> Directives {
        Directives {
            list_images: self.list_images,
            version: self.version,
            list_conformance_tests: self.list_conformance_tests,
        }
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            focus: self.focus.clone(),
            skip: self.skip.clone(),
            report_dir: self.report_dir.clone(),
            report_prefix: self.report_prefix.clone(),
            spec_dump: self.spec_dump.clone(),
            progress_report_url: self.progress_report_url.clone(),
            parallel_node: self.parallel_node,
            parallel_total: self.parallel_total,
            repo_root: self.repo_root.clone(),
            run_id: None,
        }
    }

    /// Whether this process should fan out to worker processes
    fn launches_workers(&self) -> bool {
        self.nodes > 1 && self.parallel_node.is_none()
    }
}

fn init_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .try_init();
}

/// Perform a diagnostic and return the process exit status. Output is only
/// written when it fully succeeds; errors go to `err`.
fn diagnose(
    action: DiagnosticAction,
    config: &Config,
    fixtures: &FixtureRegistry,
    out: &mut impl Write,
    err: &mut impl Write,
) -> u8 {
    match action.perform(config, fixtures, out) {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(err, "{:#}", e);
            1
        }
    }
}

fn main() -> ExitCode {
    let env_config = Config::from_env();
    init_logging(&env_config.log_filter);

    let cli = Cli::parse();

    let action = DiagnosticAction::select(cli.directives());
    if !action.is_none() {
        return ExitCode::from(diagnose(
            action,
            &env_config,
            &bootstrap::embedded_registry(),
            &mut io::stdout().lock(),
            &mut io::stderr().lock(),
        ));
    }

    let outcome = if cli.launches_workers() {
        commands::launch::run(commands::launch::LaunchArgs {
            nodes: cli.nodes,
            forwarded: env::args_os().skip(1).collect(),
        })
    } else {
        commands::run::run(commands::run::RunArgs {
            options: cli.run_options(),
            config_file: cli.config.clone(),
            directives: cli.directives(),
            verbose: cli.verbose,
            no_color: cli.no_color || env_config.no_color,
            seed: None,
        })
    };

    match outcome {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_fixtures::EmbeddedFileSource;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("conform").chain(args.iter().copied())).unwrap()
    }

    #[test]
    #[serial]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.nodes, 1);
        assert_eq!(cli.directives(), Directives::default());
        assert_eq!(cli.run_options(), RunOptions::default());
        assert!(!cli.launches_workers());
    }

    #[test]
    #[serial]
    fn test_version_flag_is_a_directive() {
        let cli = parse(&["--version"]);
        assert!(cli.directives().version);
    }

    #[test]
    #[serial]
    fn test_run_options_from_flags() {
        let cli = parse(&[
            "--focus",
            "DNS",
            "--report-dir",
            "/tmp/reports",
            "--report-prefix",
            "gce_",
            "--parallel-node",
            "2",
            "--parallel-total",
            "3",
        ]);

        let options = cli.run_options();
        assert_eq!(options.focus.as_deref(), Some("DNS"));
        assert_eq!(options.report_dir, Some(PathBuf::from("/tmp/reports")));
        assert_eq!(options.report_prefix.as_deref(), Some("gce_"));
        assert_eq!(options.parallel_node, Some(2));
        assert_eq!(options.parallel_total, Some(3));
    }

    #[test]
    #[serial]
    fn test_later_flag_overrides_earlier() {
        let cli = parse(&["--nodes", "4", "--parallel-node", "2", "--nodes", "1"]);
        assert_eq!(cli.nodes, 1);
        assert!(!cli.launches_workers());
    }

    #[test]
    #[serial]
    fn test_nodes_launch_workers() {
        assert!(parse(&["--nodes", "3"]).launches_workers());
        assert!(!parse(&["--nodes", "3", "--parallel-node", "1"]).launches_workers());
    }

    #[test]
    fn test_zero_nodes_rejected() {
        assert!(Cli::try_parse_from(["conform", "--nodes", "0"]).is_err());
    }

    #[test]
    #[serial]
    fn test_directive_env_accepts_boolish_values() {
        env::set_var("CONFORM_LIST_IMAGES", "1");
        env::set_var("CONFORM_LIST_CONFORMANCE_TESTS", "yes");
        let cli = parse(&[]);
        assert!(cli.directives().list_images);
        assert!(cli.directives().list_conformance_tests);

        env::set_var("CONFORM_LIST_IMAGES", "0");
        env::set_var("CONFORM_LIST_CONFORMANCE_TESTS", "off");
        assert_eq!(parse(&[]).directives(), Directives::default());

        env::remove_var("CONFORM_LIST_IMAGES");
        env::remove_var("CONFORM_LIST_CONFORMANCE_TESTS");
    }

    #[test]
    #[serial]
    fn test_no_color_env_does_not_reach_parser() {
        env::set_var("NO_COLOR", "1");
        let parsed = Cli::try_parse_from(["conform", "--list-images"]);
        env::remove_var("NO_COLOR");

        let cli = parsed.unwrap();
        assert!(!cli.no_color);
        assert!(cli.directives().list_images);
    }

    fn config() -> Config {
        Config {
            log_filter: "info".to_string(),
            no_color: true,
            repo_list: None,
        }
    }

    #[test]
    fn test_diagnose_bad_conformance_data() {
        static MALFORMED: &[(&str, &[u8])] = &[("conformance.yaml", b"- testname: [oops\n")];
        let mut fixtures = FixtureRegistry::new();
        fixtures.register(EmbeddedFileSource::new("test/conformance/testdata", MALFORMED));

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = diagnose(
            DiagnosticAction::PrintConformance,
            &config(),
            &fixtures,
            &mut out,
            &mut err,
        );

        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert!(String::from_utf8(err)
            .unwrap()
            .contains("Failed to unmarshal conformance data"));
    }

    #[test]
    fn test_diagnose_missing_conformance_data() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = diagnose(
            DiagnosticAction::PrintConformance,
            &config(),
            &FixtureRegistry::new(),
            &mut out,
            &mut err,
        );

        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert!(String::from_utf8(err)
            .unwrap()
            .contains("Failed to read conformance data"));
    }

    #[test]
    fn test_diagnose_success_writes_only_stdout() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = diagnose(
            DiagnosticAction::PrintConformance,
            &config(),
            &bootstrap::embedded_registry(),
            &mut out,
            &mut err,
        );

        assert_eq!(code, 0);
        assert!(!out.is_empty());
        assert!(err.is_empty());
    }
}
