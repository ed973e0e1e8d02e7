// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broker client for Herald.
//!
//! [`InMemoryBroker`] implements the raw [`herald_core::BrokerTransport`];
//! [`Producer`] and [`Consumer`] layer the Avro codec on top of any
//! transport.

pub mod consumer;
pub mod memory;
pub mod producer;

pub use consumer::{ConsumeError, Consumer, Polled};
pub use memory::InMemoryBroker;
pub use producer::Producer;
