//! Fixture bundles compiled into the binary

use crate::registry::FixtureRegistry;
use crate::source::EmbeddedFileSource;

/// Repository path of the conformance test metadata
pub const CONFORMANCE_YAML: &str = "test/conformance/testdata/conformance.yaml";

static TESTING_MANIFESTS: &[(&str, &[u8])] = &[
    (
        "statefulset/nginx/service.yaml",
        include_bytes!("../data/testing-manifests/statefulset/nginx/service.yaml"),
    ),
    (
        "statefulset/nginx/statefulset.yaml",
        include_bytes!("../data/testing-manifests/statefulset/nginx/statefulset.yaml"),
    ),
    (
        "storage-csi/controller-role.yaml",
        include_bytes!("../data/testing-manifests/storage-csi/controller-role.yaml"),
    ),
];

static TEST_FIXTURES: &[(&str, &[u8])] = &[
    (
        "doc-yaml/user-guide/pod.yaml",
        include_bytes!("../data/fixtures/doc-yaml/user-guide/pod.yaml"),
    ),
    (
        "pkg/kubectl/cmd/apply/cm.yaml",
        include_bytes!("../data/fixtures/pkg/kubectl/cmd/apply/cm.yaml"),
    ),
];

static CONFORMANCE_TESTDATA: &[(&str, &[u8])] = &[(
    "conformance.yaml",
    include_bytes!("../data/conformance/conformance.yaml"),
)];

/// Manifests used by e2e specs (`test/e2e/testing-manifests`)
pub fn testing_manifests() -> EmbeddedFileSource {
    EmbeddedFileSource::new("test/e2e/testing-manifests", TESTING_MANIFESTS)
}

/// Shared test fixtures (`test/fixtures`)
pub fn test_fixtures() -> EmbeddedFileSource {
    EmbeddedFileSource::new("test/fixtures", TEST_FIXTURES)
}

/// Conformance test metadata (`test/conformance/testdata`)
pub fn conformance_testdata() -> EmbeddedFileSource {
    EmbeddedFileSource::new("test/conformance/testdata", CONFORMANCE_TESTDATA)
}

/// Register the three embedded bundles in their fixed order
pub fn register_embedded(registry: &mut FixtureRegistry) {
    registry.register(testing_manifests());
    registry.register(test_fixtures());
    registry.register(conformance_testdata());
}
