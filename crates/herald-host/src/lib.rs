// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host orchestrator and consumer loop for Herald.
//!
//! The [`Host`] is the startup coordinator that:
//! - Builds the shared broker configuration, transport and schema registry
//! - Discovers publisher plugins and freezes them into a registry
//! - Injects the shared context into every publisher
//! - Dispatches events to the one publisher registered under their type
//!
//! The [`ConsumerLoop`] runs independently, one per subscribed channel.

pub mod consumer;
pub mod host;
pub mod shutdown;

pub use consumer::{ConsumerLoop, LoggingHandler, LoopState, LoopStats, RecordHandler};
pub use host::Host;
pub use shutdown::install_signal_handler;
