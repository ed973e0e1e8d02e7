// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin discovery and the immutable publisher registry.
//!
//! [`discover`] walks a directory for manifests and loads each through the
//! [`FactoryTable`]. One bad manifest never aborts discovery: it becomes a
//! [`LoadFailure`] in the [`DiscoveryReport`] and the scan moves on. Only an
//! inaccessible root is fatal.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use herald_core::{HeraldError, PublisherHandle};
use semver::Version;
use tracing::{debug, info, warn};

use crate::catalog::builtin_catalog;
use crate::factory::FactoryTable;
use crate::manifest::{PluginManifest, parse_plugin_manifest};

/// Manifest file name recognised in any directory.
const MANIFEST_FILE: &str = "plugin.toml";

/// Suffix recognised for named manifests (`event-b.plugin.toml`).
const MANIFEST_SUFFIX: &str = ".plugin.toml";

/// Where a descriptor came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSource {
    Manifest(PathBuf),
    Builtin,
}

impl fmt::Display for PluginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginSource::Manifest(path) => write!(f, "{}", path.display()),
            PluginSource::Builtin => write!(f, "builtin"),
        }
    }
}

/// A successfully loaded publisher plugin.
#[derive(Clone)]
pub struct PluginDescriptor {
    /// Dispatch name, copied from the manifest.
    pub name: String,
    pub manifest: PluginManifest,
    pub source: PluginSource,
    pub publisher: PublisherHandle,
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("channel", &self.publisher.channel())
            .finish()
    }
}

/// A manifest that could not be turned into a publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Immutable snapshot of every loaded publisher, in discovery order.
///
/// Duplicate names are kept; the router decides what to do with them.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    descriptors: Vec<PluginDescriptor>,
}

/// Outcome of a discovery run.
#[derive(Debug)]
pub struct DiscoveryReport {
    pub registry: PluginRegistry,
    pub failures: Vec<LoadFailure>,
}

impl PluginRegistry {
    /// Build a registry from explicit descriptors.
    pub fn from_descriptors(descriptors: Vec<PluginDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Load the built-in catalog through `factories`.
    pub fn from_catalog(factories: &FactoryTable) -> DiscoveryReport {
        let mut descriptors = Vec::new();
        let mut failures = Vec::new();
        for manifest in builtin_catalog() {
            let path = PathBuf::from(format!("builtin:{}", manifest.name));
            match instantiate(manifest, PluginSource::Builtin, factories) {
                Ok(Some(descriptor)) => descriptors.push(descriptor),
                Ok(None) => {}
                Err(reason) => {
                    warn!(path = %path.display(), %reason, "built-in plugin failed to load");
                    failures.push(LoadFailure { path, reason });
                }
            }
        }
        DiscoveryReport {
            registry: Self { descriptors },
            failures,
        }
    }

    /// All descriptors, in discovery order.
    pub fn descriptors(&self) -> &[PluginDescriptor] {
        &self.descriptors
    }

    pub fn into_descriptors(self) -> Vec<PluginDescriptor> {
        self.descriptors
    }

    /// Descriptors whose name equals `name` exactly.
    pub fn matching<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a PluginDescriptor> + 'a {
        self.descriptors.iter().filter(move |d| d.name == name)
    }

    /// Every loaded publisher.
    pub fn publishers(&self) -> impl Iterator<Item = &PublisherHandle> {
        self.descriptors.iter().map(|d| &d.publisher)
    }

    /// Drops descriptors switched off in `enabled`; names not listed stay.
    pub fn retain_enabled(self, enabled: &HashMap<String, bool>) -> Self {
        let descriptors = self
            .descriptors
            .into_iter()
            .filter(|d| {
                let keep = enabled.get(&d.name).copied().unwrap_or(true);
                if !keep {
                    info!(plugin = %d.name, "plugin disabled by configuration");
                }
                keep
            })
            .collect();
        Self { descriptors }
    }

    /// Number of descriptors per name, sorted by name.
    pub fn name_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for descriptor in &self.descriptors {
            *counts.entry(descriptor.name.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Discover publisher plugins under `root`.
///
/// Fails only when `root` is missing, not a directory, or unreadable.
pub fn discover(root: &Path, factories: &FactoryTable) -> Result<DiscoveryReport, HeraldError> {
    let metadata = std::fs::metadata(root).map_err(|e| HeraldError::Discovery {
        path: root.display().to_string(),
        message: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(HeraldError::Discovery {
            path: root.display().to_string(),
            message: "not a directory".to_string(),
        });
    }

    let mut candidates = Vec::new();
    let mut failures = Vec::new();
    let entries = std::fs::read_dir(root).map_err(|e| HeraldError::Discovery {
        path: root.display().to_string(),
        message: e.to_string(),
    })?;
    collect_candidates(entries, &mut candidates, &mut failures);
    candidates.sort();

    let mut descriptors = Vec::new();
    for path in candidates {
        match load_manifest(&path, factories) {
            Ok(Some(descriptor)) => {
                debug!(plugin = %descriptor.name, path = %path.display(), "plugin loaded");
                descriptors.push(descriptor);
            }
            Ok(None) => {}
            Err(reason) => {
                warn!(path = %path.display(), %reason, "plugin failed to load");
                failures.push(LoadFailure { path, reason });
            }
        }
    }

    info!(
        root = %root.display(),
        loaded = descriptors.len(),
        failed = failures.len(),
        "plugin discovery complete"
    );
    Ok(DiscoveryReport {
        registry: PluginRegistry { descriptors },
        failures,
    })
}

fn is_manifest(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == MANIFEST_FILE || n.ends_with(MANIFEST_SUFFIX))
}

/// Walks `entries` recursively. Symlinks are never followed, so link loops
/// cannot recurse.
fn collect_candidates(
    entries: std::fs::ReadDir,
    candidates: &mut Vec<PathBuf>,
    failures: &mut Vec<LoadFailure>,
) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping entry without file type");
                continue;
            }
        };

        if file_type.is_dir() {
            match std::fs::read_dir(&path) {
                Ok(children) => collect_candidates(children, candidates, failures),
                Err(e) => failures.push(LoadFailure {
                    path,
                    reason: format!("unreadable directory: {e}"),
                }),
            }
        } else if file_type.is_file() && is_manifest(&path) {
            candidates.push(path);
        }
    }
}

fn load_manifest(path: &Path, factories: &FactoryTable) -> Result<Option<PluginDescriptor>, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("unreadable manifest: {e}"))?;
    let content = String::from_utf8(bytes).map_err(|_| "manifest is not valid UTF-8".to_string())?;
    let manifest = parse_plugin_manifest(&content).map_err(|e| match e {
        HeraldError::PluginLoad { reason } => reason,
        other => other.to_string(),
    })?;
    instantiate(manifest, PluginSource::Manifest(path.to_path_buf()), factories)
}

/// Version of the running host, checked against `min_herald_version`.
fn host_version() -> Version {
    Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Version::new(0, 0, 0))
}

/// Applies the capability, name, version and dependency rules, then runs the
/// factory. `Ok(None)` means the manifest is for another capability kind.
fn instantiate(
    manifest: PluginManifest,
    source: PluginSource,
    factories: &FactoryTable,
) -> Result<Option<PluginDescriptor>, String> {
    if !manifest.is_publisher() {
        debug!(
            %source,
            capability = %manifest.capability,
            "skipping plugin with foreign capability"
        );
        return Ok(None);
    }

    if manifest.name.is_empty() {
        return Err("missing name".to_string());
    }

    if let Some(required) = &manifest.min_herald_version {
        let host = host_version();
        if *required > host {
            return Err(format!("requires herald >= {required}, running {host}"));
        }
    }

    let factory = factories
        .factory(&manifest.factory)
        .ok_or_else(|| format!("unknown factory '{}'", manifest.factory))?;
    let deps = factories.resolve(&manifest.requires)?;

    let publisher = factory
        .create(&manifest, &deps)
        .map_err(|e| format!("factory '{}' failed: {}", manifest.factory, e.detail()))?;

    Ok(Some(PluginDescriptor {
        name: manifest.name.clone(),
        manifest,
        source,
        publisher,
    }))
}
