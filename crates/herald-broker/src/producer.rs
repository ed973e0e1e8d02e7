// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed producer: encodes key/value pairs and hands them to a transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use herald_core::{
    BrokerConfig, BrokerTransport, Completion, HeraldError, MessageEnvelope, SchemaRegistry,
};
use herald_schema::{AvroMessage, AvroSerializer, SubjectRole};
use tracing::debug;

static PRODUCER_SEQ: AtomicUsize = AtomicUsize::new(1);

/// Produces `K`/`V` pairs encoded against the registry.
pub struct Producer<K, V> {
    name: String,
    transport: Arc<dyn BrokerTransport>,
    keys: AvroSerializer<K>,
    values: AvroSerializer<V>,
}

impl<K: AvroMessage, V: AvroMessage> Producer<K, V> {
    /// Builds a producer named `<client_id>#producer-<n>`.
    pub fn new(
        transport: Arc<dyn BrokerTransport>,
        registry: Arc<dyn SchemaRegistry>,
        config: &BrokerConfig,
    ) -> Result<Self, HeraldError> {
        let seq = PRODUCER_SEQ.fetch_add(1, Ordering::Relaxed);
        Ok(Self {
            name: format!("{}#producer-{seq}", config.client_id),
            transport,
            keys: AvroSerializer::new(registry.clone(), SubjectRole::Key, config)?,
            values: AvroSerializer::new(registry, SubjectRole::Value, config)?,
        })
    }

    /// Client-side name of this producer, reported as the sender of results.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encodes and sends one message to `channel`.
    ///
    /// Encoding failures surface as [`HeraldError::Serialization`]; transport
    /// failures pass through unchanged.
    pub async fn produce(&self, channel: &str, key: &K, value: &V) -> Result<Completion, HeraldError> {
        let key_bytes = self.keys.serialize(channel, key).await?;
        let value_bytes = self.values.serialize(channel, value).await?;
        let completion = self.transport.send(channel, key_bytes, value_bytes).await?;
        debug!(producer = %self.name, %completion, "delivered");
        Ok(completion)
    }

    /// Sends an envelope to its channel.
    pub async fn send(&self, envelope: &MessageEnvelope<K, V>) -> Result<Completion, HeraldError> {
        self.produce(&envelope.channel, &envelope.key, &envelope.value)
            .await
    }
}

impl<K, V> std::fmt::Debug for Producer<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer")
            .field("name", &self.name)
            .field("transport", &self.transport.name())
            .finish_non_exhaustive()
    }
}
