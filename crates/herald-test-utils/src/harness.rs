// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process broker stack for publisher and consumer tests.

use std::sync::Arc;

use herald_broker::InMemoryBroker;
use herald_core::{BrokerConfig, BrokerTransport, PublisherContext, SchemaRegistry};
use herald_schema::InMemorySchemaRegistry;

use crate::faulty::FaultyTransport;

/// Broker, registry and config wired the way the host wires them.
///
/// The transport is a [`FaultyTransport`] over an [`InMemoryBroker`], so
/// tests can inject faults without rebuilding the stack.
#[derive(Clone)]
pub struct BrokerHarness {
    pub broker: Arc<InMemoryBroker>,
    pub transport: FaultyTransport,
    pub registry: Arc<dyn SchemaRegistry>,
    pub config: Arc<BrokerConfig>,
}

impl BrokerHarness {
    pub fn new() -> Self {
        Self::with_config(BrokerConfig::default())
    }

    pub fn with_config(config: BrokerConfig) -> Self {
        let broker = Arc::new(InMemoryBroker::with_name(config.bootstrap_servers.clone(), 1));
        Self {
            transport: FaultyTransport::new(broker.clone()),
            broker,
            registry: Arc::new(InMemorySchemaRegistry::new()),
            config: Arc::new(config),
        }
    }

    /// Replace the registry, e.g. with an unreachable one.
    pub fn with_registry(mut self, registry: Arc<dyn SchemaRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn transport(&self) -> Arc<dyn BrokerTransport> {
        Arc::new(self.transport.clone())
    }

    /// Publisher context whose span names `plugin` and the bootstrap servers.
    pub fn context(&self, plugin: &str) -> PublisherContext {
        PublisherContext {
            config: self.config.clone(),
            transport: self.transport(),
            schemas: self.registry.clone(),
            span: tracing::info_span!(
                "publisher",
                plugin,
                bootstrap_servers = %self.config.bootstrap_servers
            ),
        }
    }
}

impl Default for BrokerHarness {
    fn default() -> Self {
        Self::new()
    }
}
