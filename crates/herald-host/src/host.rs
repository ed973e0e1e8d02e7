// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup wiring and event dispatch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use herald_broker::{Consumer, InMemoryBroker};
use herald_config::HeraldConfig;
use herald_config::model::PluginsConfig;
use herald_core::{
    BrokerConfig, BrokerTransport, EventRecord, HeraldError, PublishResult, PublisherContext,
    SchemaRegistry,
};
use herald_plugin::{
    DiscoveryReport, FactoryTable, LoadFailure, PluginDescriptor, PluginRegistry, PluginSource,
    discover,
};
use herald_router::EventRouter;
use herald_schema::AvroMessage;
use tracing::{debug, info, info_span, warn};

use crate::consumer::{ConsumerLoop, RecordHandler};

/// Everything shared between publishers and consumer loops, wired once at
/// startup.
pub struct Host {
    config: Arc<BrokerConfig>,
    transport: Arc<dyn BrokerTransport>,
    schemas: Arc<dyn SchemaRegistry>,
    router: EventRouter,
    failures: Vec<LoadFailure>,
}

impl Host {
    /// Builds the host described by `config`, loading publishers through
    /// `factories`.
    ///
    /// Publishers come from `plugins.directory` when set and from the
    /// built-in catalog otherwise. Only an unreadable plugin directory or a
    /// bad registry URL fails startup; individual plugins that fail to load
    /// or to accept their configuration are reported by
    /// [`Host::load_failures`].
    pub fn start(config: &HeraldConfig, factories: &FactoryTable) -> Result<Self, HeraldError> {
        let broker_config = config.broker_config();
        let transport: Arc<dyn BrokerTransport> = Arc::new(InMemoryBroker::with_name(
            broker_config.bootstrap_servers.clone(),
            config.broker.partitions,
        ));
        let schemas = herald_schema::registry_from_config(&broker_config)?;
        let report = load_plugins(&config.plugins, factories)?;
        Self::assemble(broker_config, transport, schemas, report)
    }

    /// Wires an already discovered registry to a transport and registry,
    /// injecting the shared context into every publisher.
    ///
    /// A publisher that rejects injection is left out of the router and
    /// recorded as a [`LoadFailure`].
    pub fn assemble(
        config: BrokerConfig,
        transport: Arc<dyn BrokerTransport>,
        schemas: Arc<dyn SchemaRegistry>,
        report: DiscoveryReport,
    ) -> Result<Self, HeraldError> {
        let config = Arc::new(config);
        let DiscoveryReport {
            registry,
            mut failures,
        } = report;

        let mut injected = Vec::with_capacity(registry.len());
        for descriptor in registry.into_descriptors() {
            let ctx = PublisherContext {
                config: config.clone(),
                transport: transport.clone(),
                schemas: schemas.clone(),
                span: info_span!(
                    "publisher",
                    plugin = %descriptor.name,
                    bootstrap_servers = %config.bootstrap_servers
                ),
            };
            match descriptor.publisher.inject_config(ctx) {
                Ok(()) => {
                    debug!(plugin = %descriptor.name, source = %descriptor.source, "publisher injected");
                    injected.push(descriptor);
                }
                Err(err) => {
                    warn!(
                        plugin = %descriptor.name,
                        source = %descriptor.source,
                        reason = %err.detail(),
                        "publisher rejected its configuration"
                    );
                    failures.push(LoadFailure {
                        path: failure_path(&descriptor),
                        reason: err.detail(),
                    });
                }
            }
        }

        let router = EventRouter::new(Arc::new(PluginRegistry::from_descriptors(injected)));
        for (name, count) in router.duplicates() {
            warn!(name = %name, count, "several publishers share one name; events of this type will not dispatch");
        }

        info!(
            publishers = router.registry().len(),
            load_failures = failures.len(),
            bootstrap_servers = %config.bootstrap_servers,
            "host started"
        );

        Ok(Self {
            config,
            transport,
            schemas,
            router,
            failures,
        })
    }

    pub fn config(&self) -> &Arc<BrokerConfig> {
        &self.config
    }

    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    pub fn registry(&self) -> &PluginRegistry {
        self.router.registry()
    }

    /// Plugins that were found but could not be loaded.
    pub fn load_failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    pub fn transport(&self) -> Arc<dyn BrokerTransport> {
        self.transport.clone()
    }

    pub fn schemas(&self) -> Arc<dyn SchemaRegistry> {
        self.schemas.clone()
    }

    /// Publishes `event` through the publisher registered for its type.
    ///
    /// Resolution failures are errors; publish failures come back as a
    /// failed [`PublishResult`].
    pub async fn dispatch(&self, event: &EventRecord) -> Result<PublishResult, HeraldError> {
        let publisher = self
            .router
            .resolve(&event.event_type)
            .into_result(&event.event_type)
            .inspect_err(|e| warn!(event_id = event.event_id, error = %e, "event not dispatched"))?;

        debug!(
            event_id = event.event_id,
            event_type = %event.event_type,
            channel = publisher.channel(),
            "dispatching event"
        );
        Ok(publisher.publish(event.event_id, &event.payload).await)
    }

    /// Dispatches every event concurrently. Results keep the input order.
    pub async fn dispatch_all(&self, events: &[EventRecord]) -> Vec<Result<PublishResult, HeraldError>> {
        join_all(events.iter().map(|event| self.dispatch(event))).await
    }

    /// A consumer loop on `channel` for `group_id`, sharing this host's
    /// transport and schema registry.
    pub fn consumer_loop<K, V>(
        &self,
        group_id: &str,
        channel: &str,
        handler: Arc<dyn RecordHandler<K, V>>,
    ) -> Result<ConsumerLoop<K, V>, HeraldError>
    where
        K: AvroMessage + std::fmt::Debug,
        V: AvroMessage + std::fmt::Debug,
    {
        let consumer = Consumer::new(group_id, self.transport(), self.schemas(), &self.config)?;
        Ok(ConsumerLoop::new(consumer, channel, handler))
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("config", &self.config)
            .field("transport", &self.transport.name())
            .field("publishers", &self.router.names())
            .field("failures", &self.failures.len())
            .finish_non_exhaustive()
    }
}

fn failure_path(descriptor: &PluginDescriptor) -> PathBuf {
    match &descriptor.source {
        PluginSource::Manifest(path) => path.clone(),
        PluginSource::Builtin => PathBuf::from(format!("builtin:{}", descriptor.name)),
    }
}

/// Discovers plugins per `plugins` and drops the ones switched off.
pub fn load_plugins(
    plugins: &PluginsConfig,
    factories: &FactoryTable,
) -> Result<DiscoveryReport, HeraldError> {
    let report = match plugins.directory.as_deref() {
        Some(dir) => {
            info!(directory = dir, "discovering plugins");
            discover(Path::new(dir), factories)?
        }
        None => PluginRegistry::from_catalog(factories),
    };

    Ok(DiscoveryReport {
        registry: report.registry.retain_enabled(&plugins.enabled),
        failures: report.failures,
    })
}
