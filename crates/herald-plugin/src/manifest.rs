// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifest parsing from `plugin.toml` files.

use herald_core::{Capability, HeraldError};
use semver::Version;
use serde::{Deserialize, Serialize};

/// Parsed plugin manifest describing one publisher plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Dispatch name the publisher answers to (e.g. "EventTypeB").
    pub name: String,
    pub version: Version,
    pub description: String,
    /// Declared capability marker, kept verbatim so unknown kinds can be
    /// skipped rather than rejected.
    pub capability: String,
    /// Key of the compiled-in factory that builds the publisher.
    pub factory: String,
    /// Channel override; the factory's default applies when absent.
    pub channel: Option<String>,
    /// Helper services the factory needs, by key.
    pub requires: Vec<String>,
    /// Minimum Herald version required.
    pub min_herald_version: Option<Version>,
}

impl PluginManifest {
    /// True when the manifest declares the event publisher capability.
    pub fn is_publisher(&self) -> bool {
        matches!(
            self.capability.parse::<Capability>(),
            Ok(Capability::EventPublisher)
        )
    }
}

/// Intermediate TOML deserialization struct for `plugin.toml`.
#[derive(Debug, Deserialize)]
struct PluginManifestFile {
    plugin: PluginSection,
}

/// The `[plugin]` section of a `plugin.toml` file.
#[derive(Debug, Deserialize)]
struct PluginSection {
    #[serde(default)]
    name: String,
    version: String,
    #[serde(default)]
    description: String,
    capability: String,
    factory: String,
    channel: Option<String>,
    #[serde(default)]
    requires: Vec<String>,
    min_herald_version: Option<String>,
}

/// Parse a plugin manifest from TOML content.
///
/// Only the document shape and the version strings are checked here; an
/// empty name or a foreign capability is left for discovery to judge.
pub fn parse_plugin_manifest(toml_content: &str) -> Result<PluginManifest, HeraldError> {
    let file: PluginManifestFile = toml::from_str(toml_content).map_err(|e| HeraldError::PluginLoad {
        reason: format!("invalid plugin manifest: {e}"),
    })?;

    let section = file.plugin;

    let version = Version::parse(section.version.trim()).map_err(|e| HeraldError::PluginLoad {
        reason: format!("plugin manifest: invalid version '{}': {e}", section.version),
    })?;

    let min_herald_version = section
        .min_herald_version
        .as_deref()
        .map(|v| {
            Version::parse(v.trim()).map_err(|e| HeraldError::PluginLoad {
                reason: format!("plugin manifest: invalid min_herald_version '{v}': {e}"),
            })
        })
        .transpose()?;

    Ok(PluginManifest {
        name: section.name.trim().to_string(),
        version,
        description: section.description,
        capability: section.capability,
        factory: section.factory,
        channel: section.channel.filter(|c| !c.trim().is_empty()),
        requires: section.requires,
        min_herald_version,
    })
}
