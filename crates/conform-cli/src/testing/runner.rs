//! Spec runner - execute a suite shard and stream results to reporters

use crate::reporters::Reporters;
use crate::testing::assertion::{Assertions, FailHandler, Failure, Interrupt};
use crate::testing::filter::SpecFilter;
use crate::testing::spec::{Spec, SpecContext, SpecState, SpecSummary, Suite};
use conform_config::RunConfiguration;
use conform_fixtures::FixtureRegistry;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Aggregate view of a run, delivered at suite start and end
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteSummary {
    pub title: String,
    pub run_id: String,
    pub node: u32,
    pub total_nodes: u32,
    pub seed: u64,
    /// Specs registered in the whole suite
    pub total_specs: usize,
    /// Specs this node will actually execute
    pub specs_to_run: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub run_time: Duration,
}

/// Pass/fail result of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteOutcome {
    Passed,
    Failed { failed: usize },
}

impl SuiteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SuiteOutcome::Passed)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Seed derived from the wall clock, so repeated runs see different orders
pub fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

/// Runner for one worker process
#[derive(Debug, Clone)]
pub struct SpecRunner {
    filter: SpecFilter,
    node: u32,
    total_nodes: u32,
    seed: u64,
}

impl SpecRunner {
    /// Create a single-node runner seeded from the wall clock
    pub fn new(filter: SpecFilter) -> Self {
        Self {
            filter,
            node: 1,
            total_nodes: 1,
            seed: wall_clock_seed(),
        }
    }

    /// Run only the specs owned by `node` out of `total_nodes`
    pub fn with_shard(mut self, node: u32, total_nodes: u32) -> Self {
        self.node = node.max(1);
        self.total_nodes = total_nodes.max(self.node);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether the spec at `index` in registration order belongs to this node
    pub fn owns(&self, index: usize) -> bool {
        index % self.total_nodes as usize + 1 == self.node as usize
    }

    /// Run the shard, blocking until every spec has completed
    pub fn run(
        &self,
        suite: &Suite,
        fixtures: &FixtureRegistry,
        config: &RunConfiguration,
        reporters: &mut Reporters,
    ) -> SuiteOutcome {
        let started = Instant::now();
        if suite.is_empty() {
            tracing::warn!(suite = suite.title(), "suite has no specs");
        }
        let plan = self.plan(suite);

        let mut summary = SuiteSummary {
            title: suite.title().to_string(),
            run_id: config.run_id().to_string(),
            node: self.node,
            total_nodes: self.total_nodes,
            seed: self.seed,
            total_specs: suite.len(),
            specs_to_run: plan.iter().filter(|(_, selected)| *selected).count(),
            passed: 0,
            failed: 0,
            skipped: 0,
            run_time: Duration::ZERO,
        };
        reporters.suite_will_begin(&summary);

        let recorded: Arc<Mutex<Option<Failure>>> = Arc::new(Mutex::new(None));
        let handler: FailHandler = {
            let recorded = Arc::clone(&recorded);
            Arc::new(move |failure| {
                let mut slot = recorded.lock().unwrap_or_else(PoisonError::into_inner);
                if slot.is_none() {
                    *slot = Some(failure);
                }
            })
        };
        let context = SpecContext::new(fixtures, config, Assertions::new(handler));

        for (spec, selected) in plan {
            let result = if selected {
                reporters.spec_will_run(spec.text(), spec.location());
                run_spec(spec, &context, &recorded)
            } else {
                SpecSummary {
                    text: spec.text().to_string(),
                    location: spec.location().clone(),
                    state: SpecState::Skipped {
                        reason: "excluded by focus/skip".to_string(),
                    },
                    run_time: Duration::ZERO,
                }
            };

            match &result.state {
                SpecState::Passed => summary.passed += 1,
                SpecState::Skipped { .. } => summary.skipped += 1,
                SpecState::Failed(_) | SpecState::Panicked(_) => summary.failed += 1,
            }
            tracing::debug!(spec = %result.text, state = result.state.as_str(), "spec completed");
            reporters.spec_did_complete(&result);
        }

        summary.run_time = started.elapsed();
        reporters.suite_did_end(&summary);

        if summary.failed == 0 {
            SuiteOutcome::Passed
        } else {
            SuiteOutcome::Failed {
                failed: summary.failed,
            }
        }
    }

    /// This node's specs in run order, each tagged with whether the filter selects it
    fn plan<'s>(&self, suite: &'s Suite) -> Vec<(&'s Spec, bool)> {
        let mut shard: Vec<&Spec> = suite
            .specs()
            .iter()
            .enumerate()
            .filter(|(index, _)| self.owns(*index))
            .map(|(_, spec)| spec)
            .collect();

        shard.shuffle(&mut StdRng::seed_from_u64(self.seed));

        shard
            .into_iter()
            .map(|spec| (spec, self.filter.matches(spec.text())))
            .collect()
    }
}

fn take_recorded(recorded: &Mutex<Option<Failure>>) -> Option<Failure> {
    recorded
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}

/// Run a single spec body, converting interrupts and panics into a state
fn run_spec(
    spec: &Spec,
    context: &SpecContext<'_>,
    recorded: &Mutex<Option<Failure>>,
) -> SpecSummary {
    take_recorded(recorded);

    let started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| (spec.body())(context)));
    let run_time = started.elapsed();
    let failure = take_recorded(recorded);

    let fallback = |message: String| Failure {
        message,
        location: spec.location().clone(),
    };

    let state = match outcome {
        Ok(()) => match failure {
            Some(failure) => SpecState::Failed(failure),
            None => SpecState::Passed,
        },
        Err(payload) => match payload.downcast::<Interrupt>() {
            Ok(interrupt) => match *interrupt {
                Interrupt::Failed => SpecState::Failed(
                    failure.unwrap_or_else(|| fallback("spec failed".to_string())),
                ),
                Interrupt::Skipped(reason) => SpecState::Skipped { reason },
            },
            Err(payload) => SpecState::Panicked(fallback(format!(
                "Test Panicked: {}",
                panic_message(payload.as_ref())
            ))),
        },
    };

    SpecSummary {
        text: spec.text().to_string(),
        location: spec.location().clone(),
        state,
        run_time,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::ReportSink;
    use crate::testing::spec::SpecLocation;
    use conform_config::{Directives, RunOptions};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    /// Sink that records every event as a short string
    #[derive(Clone, Default)]
    struct RecordingSink {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ReportSink for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn suite_will_begin(&mut self, summary: &SuiteSummary) -> anyhow::Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("begin:{}", summary.specs_to_run));
            Ok(())
        }

        fn spec_will_run(&mut self, text: &str, _location: &SpecLocation) -> anyhow::Result<()> {
            self.events.lock().unwrap().push(format!("run:{}", text));
            Ok(())
        }

        fn spec_did_complete(&mut self, spec: &SpecSummary) -> anyhow::Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:{}", spec.state.as_str(), spec.text));
            Ok(())
        }

        fn suite_did_end(&mut self, summary: &SuiteSummary) -> anyhow::Result<()> {
            self.events.lock().unwrap().push(format!(
                "end:{}/{}/{}",
                summary.passed, summary.failed, summary.skipped
            ));
            Ok(())
        }
    }

    fn config() -> RunConfiguration {
        RunOptions::default().finalize(Directives::default()).unwrap()
    }

    fn run_suite(suite: &Suite, runner: &SpecRunner) -> (SuiteOutcome, Vec<String>) {
        let sink = RecordingSink::default();
        let mut reporters = Reporters::new();
        reporters.push(sink.clone());
        let outcome = runner.run(suite, &FixtureRegistry::new(), &config(), &mut reporters);
        (outcome, sink.events())
    }

    fn unfiltered() -> SpecFilter {
        SpecFilter::new("", "^$").unwrap()
    }

    #[test]
    fn test_all_passing() {
        let mut suite = Suite::new("passing");
        suite.it("one", |ctx| ctx.expect(true, "ok"));
        suite.it("two", |ctx| ctx.expect_eq(1, 1));

        let (outcome, events) = run_suite(&suite, &SpecRunner::new(unfiltered()).with_seed(1));

        assert!(outcome.is_success());
        assert_eq!(events.first().unwrap(), "begin:2");
        assert_eq!(events.last().unwrap(), "end:2/0/0");
    }

    #[test]
    fn test_failure_does_not_stop_remaining_specs() {
        let mut suite = Suite::new("mixed");
        suite.it("fails", |ctx| ctx.fail("boom"));
        suite.it("passes", |_| {});
        suite.it("also passes", |_| {});

        let (outcome, events) = run_suite(&suite, &SpecRunner::new(unfiltered()).with_seed(7));

        assert_eq!(outcome, SuiteOutcome::Failed { failed: 1 });
        assert!(events.contains(&"failed:fails".to_string()));
        assert!(events.contains(&"passed:passes".to_string()));
        assert!(events.contains(&"passed:also passes".to_string()));
        assert_eq!(events.last().unwrap(), "end:2/1/0");
    }

    #[test]
    fn test_failure_message_and_location_recorded() {
        let mut suite = Suite::new("failure");
        suite.it("fails", |ctx| ctx.expect(false, "expected the pod to be ready"));

        let runner = SpecRunner::new(unfiltered());
        let plan = runner.plan(&suite);
        let recorded = Arc::new(Mutex::new(None));
        let handler: FailHandler = {
            let recorded = Arc::clone(&recorded);
            Arc::new(move |failure| *recorded.lock().unwrap() = Some(failure))
        };
        let fixtures = FixtureRegistry::new();
        let config = config();
        let context = SpecContext::new(&fixtures, &config, Assertions::new(handler));

        let result = run_spec(plan[0].0, &context, &recorded);
        let failure = result.state.failure().unwrap();
        assert_eq!(failure.message, "expected the pod to be ready");
        assert!(failure.location.file.ends_with("runner.rs"));
    }

    #[test]
    fn test_panic_is_recorded_as_panicked() {
        let mut suite = Suite::new("panics");
        suite.it("panics", |_| panic!("index out of range"));

        let (outcome, events) = run_suite(&suite, &SpecRunner::new(unfiltered()));

        assert!(!outcome.is_success());
        assert!(events.contains(&"panicked:panics".to_string()));
    }

    #[test]
    fn test_skip_inside_spec() {
        let mut suite = Suite::new("skips");
        suite.it("needs a cloud provider", |ctx| ctx.skip("no provider"));

        let (outcome, events) = run_suite(&suite, &SpecRunner::new(unfiltered()));

        assert!(outcome.is_success());
        assert_eq!(events.last().unwrap(), "end:0/0/1");
    }

    #[test]
    fn test_filtered_specs_reported_skipped_without_running() {
        let mut suite = Suite::new("filtered");
        suite.it("stable spec", |_| {});
        suite.it("wobbly spec [Flaky]", |ctx| ctx.fail("must not run"));
        suite.it("gated spec [Feature:Thing]", |ctx| ctx.fail("must not run"));

        let filter = SpecFilter::new("", "").unwrap();
        let (outcome, events) = run_suite(&suite, &SpecRunner::new(filter));

        assert!(outcome.is_success());
        assert_eq!(events.first().unwrap(), "begin:1");
        assert!(!events.iter().any(|e| e.starts_with("run:wobbly")));
        assert!(events.contains(&"skipped:wobbly spec [Flaky]".to_string()));
        assert_eq!(events.last().unwrap(), "end:1/0/2");
    }

    #[test]
    fn test_will_run_precedes_did_complete() {
        let mut suite = Suite::new("ordering");
        suite.it("a", |_| {});
        suite.it("b", |_| {});
        suite.it("c", |_| {});

        let (_, events) = run_suite(&suite, &SpecRunner::new(unfiltered()).with_seed(42));

        for name in ["a", "b", "c"] {
            let run = events.iter().position(|e| e == &format!("run:{}", name)).unwrap();
            let done = events
                .iter()
                .position(|e| e == &format!("passed:{}", name))
                .unwrap();
            assert_eq!(done, run + 1);
        }
    }

    #[test]
    fn test_shards_partition_the_suite() {
        let mut suite = Suite::new("sharded");
        for i in 0..10 {
            suite.it(format!("spec {}", i), |_| {});
        }

        let total = 3;
        let mut seen = HashSet::new();
        for node in 1..=total {
            let runner = SpecRunner::new(unfiltered())
                .with_shard(node, total)
                .with_seed(u64::from(node));
            for (spec, _) in runner.plan(&suite) {
                assert!(seen.insert(spec.text().to_string()), "{} ran twice", spec.text());
            }
        }
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_same_seed_same_order() {
        let mut suite = Suite::new("seeded");
        for i in 0..20 {
            suite.it(format!("spec {}", i), |_| {});
        }

        let order = |seed| -> Vec<String> {
            SpecRunner::new(unfiltered())
                .with_seed(seed)
                .plan(&suite)
                .into_iter()
                .map(|(spec, _)| spec.text().to_string())
                .collect()
        };

        assert_eq!(order(99), order(99));
        assert_eq!(order(99).len(), 20);
    }

    #[test]
    fn test_summary_carries_run_identity() {
        let suite = Suite::new("identity");
        let sink = RecordingSink::default();
        let mut reporters = Reporters::new();
        reporters.push(sink);

        let config = RunOptions {
            run_id: Some("abc123".to_string()),
            ..Default::default()
        }
        .finalize(Directives::default())
        .unwrap();

        let outcome = SpecRunner::new(unfiltered()).run(
            &suite,
            &FixtureRegistry::new(),
            &config,
            &mut reporters,
        );
        assert!(outcome.is_success());
    }

    #[test]
    fn test_outcome_exit_codes() {
        assert!(SuiteOutcome::Passed.is_success());
        assert!(!SuiteOutcome::Failed { failed: 3 }.is_success());
    }
}
