// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publisher plugin discovery, manifest parser, and built-in catalog.
//!
//! A plugin is a `plugin.toml` or `*.plugin.toml` manifest naming a factory
//! compiled into the host. Discovery scans a directory for manifests, builds
//! each publisher through the [`FactoryTable`], and freezes the result into an
//! immutable [`PluginRegistry`]. Plugins that fail to load are reported, never
//! fatal.

pub mod catalog;
pub mod factory;
pub mod manifest;
pub mod registry;

pub use catalog::builtin_catalog;
pub use factory::{Dependencies, FactoryTable, PublisherFactory};
pub use manifest::{PluginManifest, parse_plugin_manifest};
pub use registry::{
    DiscoveryReport, LoadFailure, PluginDescriptor, PluginRegistry, PluginSource, discover,
};
