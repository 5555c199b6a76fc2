//! Bridge between spec assertions and suite failure reporting
//!
//! Assertions hand every failure to a [`FailHandler`] installed by the
//! runner for the duration of a run, then unwind out of the spec body with
//! a private marker. The runner catches the unwind and turns the recorded
//! failure into the spec's final state.

use crate::testing::spec::SpecLocation;
use std::fmt;
use std::panic::{self, Location};
use std::sync::Arc;

/// A failed expectation and where it happened
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub message: String,
    pub location: SpecLocation,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.message, self.location)
    }
}

/// Receives assertion failures for the current run
pub type FailHandler = Arc<dyn Fn(Failure) + Send + Sync>;

/// Unwind payload used to leave a spec body early
#[derive(Debug)]
pub(crate) enum Interrupt {
    Failed,
    Skipped(String),
}

/// Assertion helpers bound to one fail handler
#[derive(Clone)]
pub struct Assertions {
    handler: FailHandler,
}

impl Assertions {
    pub fn new(handler: FailHandler) -> Self {
        Self { handler }
    }

    #[track_caller]
    pub fn fail(&self, message: impl Into<String>) -> ! {
        let caller = Location::caller();
        (self.handler)(Failure {
            message: message.into(),
            location: SpecLocation::from_caller(caller),
        });
        panic::resume_unwind(Box::new(Interrupt::Failed))
    }

    #[track_caller]
    pub fn expect(&self, condition: bool, message: impl Into<String>) {
        if !condition {
            self.fail(message);
        }
    }

    #[track_caller]
    pub fn expect_eq<T: PartialEq + fmt::Debug>(&self, actual: T, expected: T) {
        if actual != expected {
            self.fail(format!(
                "Expected\n    {:?}\nto equal\n    {:?}",
                actual, expected
            ));
        }
    }

    #[track_caller]
    pub fn expect_ok<T, E: fmt::Display>(&self, result: Result<T, E>) -> T {
        match result {
            Ok(value) => value,
            Err(e) => self.fail(format!("Unexpected error:\n    {}", e)),
        }
    }

    pub fn skip(&self, reason: impl Into<String>) -> ! {
        panic::resume_unwind(Box::new(Interrupt::Skipped(reason.into())))
    }
}

impl fmt::Debug for Assertions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertions").finish_non_exhaustive()
    }
}
