//! Launch command - fan a run out over several worker processes

use crate::commands::run::new_run_id;
use crate::config::RUN_ID_ENV;
use crate::testing::SuiteOutcome;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::env;
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus};

/// Arguments for the launch command
#[derive(Debug)]
pub struct LaunchArgs {
    /// Number of worker processes
    pub nodes: u32,
    /// Arguments given to this process, forwarded to every worker
    pub forwarded: Vec<OsString>,
}

/// Arguments for worker `node` of `total`. Later flags override earlier ones.
pub fn worker_args(forwarded: &[OsString], node: u32, total: u32) -> Vec<OsString> {
    let mut args = forwarded.to_vec();
    args.extend(
        [
            "--parallel-node".to_string(),
            node.to_string(),
            "--parallel-total".to_string(),
            total.to_string(),
            "--nodes".to_string(),
            "1".to_string(),
        ]
        .map(OsString::from),
    );
    args
}

fn run_worker(exe: &Path, args: &[OsString], run_id: &str, node: u32) -> Result<ExitStatus> {
    tracing::debug!(node, "starting worker process");
    Command::new(exe)
        .args(args)
        .env(RUN_ID_ENV, run_id)
        .status()
        .with_context(|| format!("Failed to start worker process {}", node))
}

/// Start every worker and wait for all of them. The run passes only if
/// every worker exits successfully.
pub fn run(args: LaunchArgs) -> Result<SuiteOutcome> {
    let exe = env::current_exe().context("Failed to locate the conform executable")?;
    let run_id = env::var(RUN_ID_ENV).unwrap_or_else(|_| new_run_id());
    let total = args.nodes;

    tracing::info!(nodes = total, run_id = %run_id, "launching worker processes");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(total as usize)
        .build()
        .context("Failed to create worker pool")?;

    let statuses: Vec<(u32, Result<ExitStatus>)> = pool.install(|| {
        (1..=total)
            .into_par_iter()
            .map(|node| {
                let worker = worker_args(&args.forwarded, node, total);
                (node, run_worker(&exe, &worker, &run_id, node))
            })
            .collect()
    });

    let mut failed = 0;
    for (node, status) in statuses {
        match status {
            Ok(status) if status.success() => {}
            Ok(status) => {
                tracing::warn!(node, %status, "worker process failed");
                failed += 1;
            }
            Err(e) => {
                tracing::error!(node, "{:#}", e);
                failed += 1;
            }
        }
    }

    Ok(if failed == 0 {
        SuiteOutcome::Passed
    } else {
        SuiteOutcome::Failed { failed }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_worker_args_append_shard_flags() {
        let forwarded = vec![OsString::from("--focus"), OsString::from("DNS")];
        let args = worker_args(&forwarded, 2, 3);

        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(
            args,
            vec![
                "--focus",
                "DNS",
                "--parallel-node",
                "2",
                "--parallel-total",
                "3",
                "--nodes",
                "1"
            ]
        );
    }

    #[test]
    fn test_worker_args_distinct_per_node() {
        let a = worker_args(&[], 1, 2);
        let b = worker_args(&[], 2, 2);
        assert_ne!(a, b);
    }
}
