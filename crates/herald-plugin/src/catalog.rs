// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in publisher catalog.
//!
//! Manifests for the publishers compiled into the Herald binary, used when no
//! plugin directory is configured. No filesystem access is involved.

use herald_core::Capability;
use semver::Version;

use crate::manifest::PluginManifest;

fn builtin(name: &str, factory: &str, description: &str, requires: &[&str]) -> PluginManifest {
    PluginManifest {
        name: name.to_string(),
        version: Version::new(0, 1, 0),
        description: description.to_string(),
        capability: Capability::EventPublisher.to_string(),
        factory: factory.to_string(),
        channel: None,
        requires: requires.iter().map(|r| r.to_string()).collect(),
        min_herald_version: Some(Version::new(0, 1, 0)),
    }
}

/// Returns manifests for all built-in publishers:
/// - EventTypeA (`event-type-a`, requires `greeting`)
/// - EventTypeB (`event-type-b`)
/// - EventTypeC (`event-type-c`)
pub fn builtin_catalog() -> Vec<PluginManifest> {
    vec![
        builtin(
            "EventTypeA",
            "event-type-a",
            "Publishes type A events, greeting through a helper dependency",
            &["greeting"],
        ),
        builtin("EventTypeB", "event-type-b", "Publishes type B events", &[]),
        builtin("EventTypeC", "event-type-c", "Publishes type C events", &[]),
    ]
}
