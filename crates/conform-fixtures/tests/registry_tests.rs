//! Bootstrap-shaped registry tests: embedded bundles first, repo root last

use conform_fixtures::bundles::{self, CONFORMANCE_YAML};
use conform_fixtures::{FixtureError, FixtureRegistry, RootFileSource};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn bootstrap(repo_root: Option<&Path>) -> FixtureRegistry {
    let mut registry = FixtureRegistry::new();
    bundles::register_embedded(&mut registry);
    if let Some(root) = repo_root {
        registry.register(RootFileSource::new(root));
    }
    registry
}

#[test]
fn test_embedded_conformance_data_takes_precedence_over_disk() {
    let repo = TempDir::new().unwrap();
    let on_disk = repo.path().join("test/conformance/testdata");
    fs::create_dir_all(&on_disk).unwrap();
    fs::write(on_disk.join("conformance.yaml"), "[]\n").unwrap();

    let registry = bootstrap(Some(repo.path()));
    let text = registry.read_to_string(CONFORMANCE_YAML).unwrap();

    assert!(text.contains("testname:"));
}

#[test]
fn test_repo_root_serves_files_missing_from_bundles() {
    let repo = TempDir::new().unwrap();
    let secret_dir = repo.path().join("test/e2e/testing-manifests/ingress");
    fs::create_dir_all(&secret_dir).unwrap();
    fs::write(secret_dir.join("secret.yaml"), "kind: Secret\n").unwrap();

    let registry = bootstrap(Some(repo.path()));

    assert_eq!(registry.len(), 4);
    assert_eq!(
        registry
            .read_to_string("test/e2e/testing-manifests/ingress/secret.yaml")
            .unwrap(),
        "kind: Secret\n"
    );
}

#[test]
fn test_without_repo_root_disk_only_files_are_missing() {
    let registry = bootstrap(None);

    assert_eq!(registry.len(), 3);
    let err = registry
        .read("test/e2e/testing-manifests/ingress/secret.yaml")
        .unwrap_err();
    assert!(matches!(err, FixtureError::NotFound { .. }));
}

#[test]
fn test_shared_registry_concurrent_reads() {
    let registry = Arc::new(bootstrap(None));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.read(CONFORMANCE_YAML).unwrap().len())
        })
        .collect();

    let sizes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(sizes.windows(2).all(|w| w[0] == w[1]));
}
