// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event-type routing for Herald.
//!
//! [`EventRouter`] resolves a dispatch name to exactly one publisher in an
//! immutable [`herald_plugin::PluginRegistry`] snapshot, reporting a missing
//! or ambiguous name as a [`Resolution`] instead of failing.

pub mod router;

pub use router::{EventRouter, Resolution};
