// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Herald plugin architecture.
//!
//! Async traits use `#[async_trait]` so they stay object safe and can be held
//! as `Arc<dyn ...>` by the registry and the host.

pub mod broker;
pub mod publisher;
pub mod schema;

pub use broker::{BrokerTransport, Subscription};
pub use publisher::{EventPublisher, PublisherContext, PublisherHandle};
pub use schema::SchemaRegistry;
