// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event publisher trait implemented by every publisher plugin.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::traits::broker::BrokerTransport;
use crate::traits::schema::SchemaRegistry;
use crate::types::{BrokerConfig, PublishResult};

/// Shared handle to a loaded publisher.
pub type PublisherHandle = Arc<dyn EventPublisher>;

/// Everything the host hands a publisher at injection time.
///
/// All members are shared and read-only; cloning the context is cheap.
#[derive(Clone)]
pub struct PublisherContext {
    pub config: Arc<BrokerConfig>,
    pub transport: Arc<dyn BrokerTransport>,
    pub schemas: Arc<dyn SchemaRegistry>,
    /// Log sink. Publishers record their events inside this span.
    pub span: tracing::Span,
}

impl std::fmt::Debug for PublisherContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherContext")
            .field("config", &self.config)
            .field("transport", &self.transport.name())
            .finish_non_exhaustive()
    }
}

/// Publishes one kind of domain event to its channel.
///
/// The host calls [`inject_config`](EventPublisher::inject_config) exactly
/// once after discovery; afterwards [`publish`](EventPublisher::publish) may
/// be called concurrently from any number of tasks.
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    /// The dispatch name this publisher answers to (e.g. `EventTypeB`).
    fn name(&self) -> &str;

    /// The channel this publisher writes to.
    fn channel(&self) -> &str;

    /// Stores the shared broker context. A second call fails with
    /// [`HeraldError::Config`].
    fn inject_config(&self, ctx: PublisherContext) -> Result<(), HeraldError>;

    /// Builds, encodes and produces the message for one event. Failures are
    /// reported in the returned [`PublishResult`], never panicked or dropped.
    async fn publish(&self, event_id: i64, payload: &str) -> PublishResult;
}
