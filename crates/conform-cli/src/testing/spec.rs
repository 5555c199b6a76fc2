//! Spec definitions and per-spec results

use crate::testing::assertion::{Assertions, Failure};
use conform_config::RunConfiguration;
use conform_fixtures::FixtureRegistry;
use std::fmt;
use std::panic::Location;
use std::time::Duration;

/// Source span of a spec definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLocation {
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
}

impl SpecLocation {
    pub fn new(file: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
        }
    }

    pub(crate) fn from_caller(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line(), location.line())
    }
}

impl fmt::Display for SpecLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.start_line)
    }
}

/// Everything a spec body can reach while running
pub struct SpecContext<'a> {
    pub fixtures: &'a FixtureRegistry,
    pub config: &'a RunConfiguration,
    assertions: Assertions,
}

impl<'a> SpecContext<'a> {
    pub fn new(
        fixtures: &'a FixtureRegistry,
        config: &'a RunConfiguration,
        assertions: Assertions,
    ) -> Self {
        Self {
            fixtures,
            config,
            assertions,
        }
    }

    /// Fail the spec unless `condition` holds
    #[track_caller]
    pub fn expect(&self, condition: bool, message: impl Into<String>) {
        self.assertions.expect(condition, message);
    }

    /// Fail the spec unless `actual == expected`
    #[track_caller]
    pub fn expect_eq<T: PartialEq + fmt::Debug>(&self, actual: T, expected: T) {
        self.assertions.expect_eq(actual, expected);
    }

    /// Unwrap `result`, failing the spec on `Err`
    #[track_caller]
    pub fn expect_ok<T, E: fmt::Display>(&self, result: Result<T, E>) -> T {
        self.assertions.expect_ok(result)
    }

    /// Fail the spec immediately
    #[track_caller]
    pub fn fail(&self, message: impl Into<String>) -> ! {
        self.assertions.fail(message)
    }

    /// Stop the spec and mark it skipped
    pub fn skip(&self, reason: impl Into<String>) -> ! {
        self.assertions.skip(reason)
    }
}

type SpecBody = Box<dyn Fn(&SpecContext<'_>) + Send + Sync>;

/// A single registered spec
pub struct Spec {
    text: String,
    location: SpecLocation,
    body: SpecBody,
}

impl Spec {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn location(&self) -> &SpecLocation {
        &self.location
    }

    /// Record the last source line of the spec definition
    pub fn ends_at(&mut self, line: u32) -> &mut Self {
        self.location.end_line = line.max(self.location.start_line);
        self
    }

    pub(crate) fn body(&self) -> &SpecBody {
        &self.body
    }
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spec")
            .field("text", &self.text)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of specs under one title
#[derive(Debug)]
pub struct Suite {
    title: String,
    specs: Vec<Spec>,
}

impl Suite {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            specs: Vec::new(),
        }
    }

    /// Register a spec; its location is the caller's
    #[track_caller]
    pub fn it<F>(&mut self, text: impl Into<String>, body: F) -> &mut Spec
    where
        F: Fn(&SpecContext<'_>) + Send + Sync + 'static,
    {
        self.specs.push(Spec {
            text: text.into(),
            location: SpecLocation::from_caller(Location::caller()),
            body: Box::new(body),
        });
        let last = self.specs.len() - 1;
        &mut self.specs[last]
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn specs(&self) -> &[Spec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Final state of a spec
#[derive(Debug, Clone, PartialEq)]
pub enum SpecState {
    Passed,
    Skipped { reason: String },
    Failed(Failure),
    Panicked(Failure),
}

impl SpecState {
    pub fn is_failure(&self) -> bool {
        matches!(self, SpecState::Failed(_) | SpecState::Panicked(_))
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            SpecState::Failed(failure) | SpecState::Panicked(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecState::Passed => "passed",
            SpecState::Skipped { .. } => "skipped",
            SpecState::Failed(_) => "failed",
            SpecState::Panicked(_) => "panicked",
        }
    }
}

/// Result of one spec, as delivered to reporters
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSummary {
    pub text: String,
    pub location: SpecLocation,
    pub state: SpecState,
    pub run_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_it_records_caller_location() {
        let mut suite = Suite::new("suite");
        let line = line!() + 1;
        suite.it("records location", |_| {});

        let spec = &suite.specs()[0];
        assert_eq!(spec.location().start_line, line);
        assert_eq!(spec.location().end_line, line);
        assert!(spec.location().file.ends_with("spec.rs"));
    }

    #[test]
    fn test_ends_at_extends_span() {
        let mut suite = Suite::new("suite");
        let start = line!() + 1;
        suite.it("spans lines", |_| {
            let _ = 1 + 1;
        })
        .ends_at(line!());

        let location = suite.specs()[0].location();
        assert_eq!(location.start_line, start);
        assert_eq!(location.end_line, start + 3);
    }

    #[test]
    fn test_ends_at_never_precedes_start() {
        let mut suite = Suite::new("suite");
        suite.it("backwards", |_| {}).ends_at(1);

        let location = suite.specs()[0].location();
        assert_eq!(location.end_line, location.start_line);
    }

    #[test]
    fn test_state_helpers() {
        let failure = Failure {
            message: "boom".to_string(),
            location: SpecLocation::new("x.rs", 1, 1),
        };

        assert!(!SpecState::Passed.is_failure());
        assert!(SpecState::Failed(failure.clone()).is_failure());
        assert!(SpecState::Panicked(failure.clone()).is_failure());
        assert_eq!(
            SpecState::Failed(failure.clone()).failure(),
            Some(&failure)
        );
        assert_eq!(
            SpecState::Skipped {
                reason: String::new()
            }
            .as_str(),
            "skipped"
        );
    }

    #[test]
    fn test_suite_preserves_registration_order() {
        let mut suite = Suite::new("ordered");
        suite.it("first", |_| {});
        suite.it("second", |_| {});
        suite.it("third", |_| {});

        let texts: Vec<_> = suite.specs().iter().map(Spec::text).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(suite.title(), "ordered");
        assert_eq!(suite.len(), 3);
    }
}
