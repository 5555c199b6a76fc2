//! Built-in e2e specs

use crate::commands::conformance;
use crate::images::{self, ImageId, RegistryList};
use crate::testing::{SpecContext, Suite};
use conform_fixtures::bundles::CONFORMANCE_YAML;

pub const SUITE_TITLE: &str = "Conform e2e suite";

const NGINX_SERVICE: &str = "test/e2e/testing-manifests/statefulset/nginx/service.yaml";
const NGINX_STATEFULSET: &str = "test/e2e/testing-manifests/statefulset/nginx/statefulset.yaml";
const CSI_CONTROLLER_ROLE: &str = "test/e2e/testing-manifests/storage-csi/controller-role.yaml";
const USER_GUIDE_POD: &str = "test/fixtures/doc-yaml/user-guide/pod.yaml";
const APPLY_CONFIGMAP: &str = "test/fixtures/pkg/kubectl/cmd/apply/cm.yaml";

/// Read a fixture and parse it as a single YAML document
#[track_caller]
fn manifest(ctx: &SpecContext<'_>, path: &str) -> serde_yaml::Value {
    let source = ctx.expect_ok(ctx.fixtures.read_to_string(path));
    ctx.expect_ok(serde_yaml::from_str(&source))
}

#[track_caller]
fn expect_kind(ctx: &SpecContext<'_>, document: &serde_yaml::Value, kind: &str, name: &str) {
    ctx.expect_eq(document["kind"].as_str(), Some(kind));
    ctx.expect_eq(document["metadata"]["name"].as_str(), Some(name));
}

/// Every spec the binary knows about, in registration order
pub fn suite() -> Suite {
    let mut suite = Suite::new(SUITE_TITLE);

    suite
        .it(
            "[sig-architecture] Conformance metadata should describe every conformance test [Conformance]",
            |ctx| {
                let source = ctx.expect_ok(ctx.fixtures.read_to_string(CONFORMANCE_YAML));
                let tests = ctx.expect_ok(conformance::parse(&source));
                ctx.expect(!tests.is_empty(), "conformance metadata is empty");
                for test in &tests {
                    ctx.expect(
                        test.codename.contains("[Conformance]"),
                        format!("{} is not tagged [Conformance]", test.testname),
                    );
                    ctx.expect(!test.release.is_empty(), format!("{} has no release", test.testname));
                }
            },
        )
        .ends_at(line!());

    suite
        .it(
            "[sig-apps] StatefulSet manifests should pair the nginx statefulset with its service",
            |ctx| {
                let service = manifest(ctx, NGINX_SERVICE);
                let statefulset = manifest(ctx, NGINX_STATEFULSET);
                expect_kind(ctx, &service, "Service", "nginx");
                expect_kind(ctx, &statefulset, "StatefulSet", "web");
                ctx.expect_eq(statefulset["spec"]["serviceName"].as_str(), Some("nginx"));
            },
        )
        .ends_at(line!());

    suite
        .it(
            "[sig-storage] CSI manifests should grant the external provisioner a cluster role",
            |ctx| {
                let role = manifest(ctx, CSI_CONTROLLER_ROLE);
                expect_kind(ctx, &role, "ClusterRole", "external-provisioner-runner");
                ctx.expect(
                    role["rules"].as_sequence().is_some_and(|rules| !rules.is_empty()),
                    "cluster role has no rules",
                );
            },
        )
        .ends_at(line!());

    suite
        .it(
            "[sig-cli] Kubectl fixtures should include the user guide pod and apply configmap",
            |ctx| {
                expect_kind(ctx, &manifest(ctx, USER_GUIDE_POD), "Pod", "nginx");
                expect_kind(ctx, &manifest(ctx, APPLY_CONFIGMAP), "ConfigMap", "test");
            },
        )
        .ends_at(line!());

    suite
        .it(
            "[sig-node] Images should resolve every catalogue entry to a pull reference",
            |ctx| {
                let registries = RegistryList::default();
                for image in images::catalogue(&registries) {
                    let reference = image.e2e_image();
                    if !reference.starts_with(&image.registry) || !reference.ends_with(&image.version) {
                        ctx.fail(format!("malformed image reference {}", reference));
                    }
                }
                ctx.expect_eq(
                    images::image(ImageId::Pause, &registries).e2e_image(),
                    "registry.k8s.io/pause:3.7".to_string(),
                );
            },
        )
        .ends_at(line!());

    suite
        .it(
            "[sig-testing] Repository files should be readable from the repo root [Feature:RepoRoot]",
            |ctx| {
                if ctx.config.repo_root().is_none() {
                    ctx.skip("no repository root configured");
                }
                ctx.expect(
                    ctx.expect_ok(ctx.fixtures.exists("README.md")),
                    "README.md not found under the repository root",
                );
                // Embedded bundles still win over disk
                ctx.expect_ok(ctx.fixtures.read(CONFORMANCE_YAML));
            },
        )
        .ends_at(line!());

    suite
}
