//! Command implementations. Each one returns a result that `main` maps to
//! an exit code.

pub mod conformance;
pub mod images;
pub mod launch;
pub mod run;
pub mod version;
