//! Spec execution engine
//!
//! Specs are registered into a [`Suite`], selected with a [`SpecFilter`],
//! sharded across worker processes and run one at a time by the
//! [`SpecRunner`], which streams every result to the active reporters.

pub mod assertion;
pub mod filter;
pub mod runner;
pub mod spec;

pub use filter::SpecFilter;
pub use runner::{SpecRunner, SuiteOutcome, SuiteSummary};
pub use spec::{SpecContext, SpecLocation, SpecState, SpecSummary, Suite};
