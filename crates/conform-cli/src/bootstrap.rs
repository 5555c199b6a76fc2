//! Fixture registry setup

use conform_fixtures::{bundles, FixtureRegistry, RootFileSource};
use std::path::Path;
use std::sync::Arc;

/// Registry holding only the embedded bundles. Diagnostics use this.
pub fn embedded_registry() -> FixtureRegistry {
    let mut registry = FixtureRegistry::new();
    bundles::register_embedded(&mut registry);
    registry
}

/// Registry for a suite run: embedded bundles first, then the repo root
/// when one is configured. Read-only once shared.
pub fn run_registry(repo_root: Option<&Path>) -> Arc<FixtureRegistry> {
    let mut registry = embedded_registry();
    if let Some(root) = repo_root {
        tracing::info!(root = %root.display(), "falling back to repository files");
        registry.register(RootFileSource::new(root));
    }
    Arc::new(registry)
}
