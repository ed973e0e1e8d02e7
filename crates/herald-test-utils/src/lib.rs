// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Herald integration tests.
//!
//! Everything here runs in-process: no broker, registry or plugin directory
//! outside the test is needed.
//!
//! # Components
//!
//! - [`BrokerHarness`] - in-memory broker, registry and config wired together
//! - [`FaultyTransport`] - transport wrapper with injectable send/fetch/commit faults
//! - [`UnreachableSchemaRegistry`] - registry whose every call fails
//! - [`PluginDirBuilder`] - temporary plugin directories

pub mod faulty;
pub mod harness;
pub mod plugin_dir;
pub mod registry;

pub use faulty::FaultyTransport;
pub use harness::BrokerHarness;
pub use plugin_dir::PluginDirBuilder;
pub use registry::UnreachableSchemaRegistry;
