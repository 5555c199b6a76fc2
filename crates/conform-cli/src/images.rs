//! Catalogue of container images used by the e2e suite

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Registries images are pulled from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryList {
    pub e2e_registry: String,
    pub promoter_e2e_registry: String,
    pub gc_registry: String,
    pub docker_library_registry: String,
    pub sig_storage_registry: String,
}

impl Default for RegistryList {
    fn default() -> Self {
        Self {
            e2e_registry: "gcr.io/kubernetes-e2e-test-images".to_string(),
            promoter_e2e_registry: "registry.k8s.io/e2e-test-images".to_string(),
            gc_registry: "registry.k8s.io".to_string(),
            docker_library_registry: "docker.io/library".to_string(),
            sig_storage_registry: "registry.k8s.io/sig-storage".to_string(),
        }
    }
}

impl RegistryList {
    /// Parse a repo-list document. Keys that are absent keep their defaults.
    pub fn from_yaml(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source).context("Failed to parse image repo list")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read image repo list {}", path.display()))?;
        Self::from_yaml(&source)
    }

    /// Registries from an optional repo-list file, or the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Which registry an image lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Registry {
    E2e,
    PromoterE2e,
    Gc,
    DockerLibrary,
    SigStorage,
}

impl Registry {
    fn resolve(self, list: &RegistryList) -> &str {
        match self {
            Registry::E2e => &list.e2e_registry,
            Registry::PromoterE2e => &list.promoter_e2e_registry,
            Registry::Gc => &list.gc_registry,
            Registry::DockerLibrary => &list.docker_library_registry,
            Registry::SigStorage => &list.sig_storage_registry,
        }
    }
}

/// Stable identifiers for the images the suite knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageId {
    Agnhost,
    BusyBox,
    Etcd,
    Httpd,
    HttpdNew,
    JessieDnsutils,
    Kitten,
    Nautilus,
    Nginx,
    NginxNew,
    Pause,
    Perl,
    NfsProvisioner,
    VolumeNfsServer,
}

impl ImageId {
    /// Every image, in catalogue order
    pub const ALL: [ImageId; 14] = [
        ImageId::Agnhost,
        ImageId::BusyBox,
        ImageId::Etcd,
        ImageId::Httpd,
        ImageId::HttpdNew,
        ImageId::JessieDnsutils,
        ImageId::Kitten,
        ImageId::Nautilus,
        ImageId::Nginx,
        ImageId::NginxNew,
        ImageId::Pause,
        ImageId::Perl,
        ImageId::NfsProvisioner,
        ImageId::VolumeNfsServer,
    ];

    fn entry(self) -> (Registry, &'static str, &'static str) {
        match self {
            ImageId::Agnhost => (Registry::PromoterE2e, "agnhost", "2.39"),
            ImageId::BusyBox => (Registry::PromoterE2e, "busybox", "1.29-2"),
            ImageId::Etcd => (Registry::Gc, "etcd", "3.5.3-0"),
            ImageId::Httpd => (Registry::PromoterE2e, "httpd", "2.4.38-2"),
            ImageId::HttpdNew => (Registry::PromoterE2e, "httpd", "2.4.39-2"),
            ImageId::JessieDnsutils => (Registry::PromoterE2e, "jessie-dnsutils", "1.5"),
            ImageId::Kitten => (Registry::E2e, "kitten", "1.0"),
            ImageId::Nautilus => (Registry::E2e, "nautilus", "1.0"),
            ImageId::Nginx => (Registry::PromoterE2e, "nginx", "1.14-2"),
            ImageId::NginxNew => (Registry::PromoterE2e, "nginx", "1.15-2"),
            ImageId::Pause => (Registry::Gc, "pause", "3.7"),
            ImageId::Perl => (Registry::DockerLibrary, "perl", "5.26"),
            ImageId::NfsProvisioner => (Registry::SigStorage, "nfs-provisioner", "v3.0.1"),
            ImageId::VolumeNfsServer => (Registry::PromoterE2e, "volume/nfs", "1.3"),
        }
    }
}

/// One resolved image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    pub registry: String,
    pub name: String,
    pub version: String,
}

impl ImageConfig {
    /// Full pull reference, `registry/name:version`
    pub fn e2e_image(&self) -> String {
        format!("{}/{}:{}", self.registry, self.name, self.version)
    }
}

impl fmt::Display for ImageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.e2e_image())
    }
}

/// Resolve one image against a registry list
pub fn image(id: ImageId, registries: &RegistryList) -> ImageConfig {
    let (registry, name, version) = id.entry();
    ImageConfig {
        registry: registry.resolve(registries).to_string(),
        name: name.to_string(),
        version: version.to_string(),
    }
}

/// Every image in catalogue order
pub fn catalogue(registries: &RegistryList) -> Vec<ImageConfig> {
    ImageId::ALL
        .iter()
        .map(|id| image(*id, registries))
        .collect()
}
