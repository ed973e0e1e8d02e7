// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed consumer: pulls raw records from a subscription and decodes them.

use std::sync::Arc;

use bytes::Bytes;
use herald_core::{
    BrokerConfig, BrokerTransport, ConsumedRecord, HeraldError, SchemaRegistry, Subscription,
};
use herald_schema::{AvroDeserializer, AvroMessage, SubjectRole};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Outcome of one poll.
#[derive(Debug)]
pub enum Polled<K, V> {
    Record(ConsumedRecord<K, V>),
    /// The token was cancelled before a record arrived.
    Cancelled,
}

/// A recoverable poll fault. The consumer stays usable after any of these.
#[derive(Debug, Error)]
pub enum ConsumeError {
    /// `poll` was called before `subscribe` or after `close`.
    #[error("consumer is not subscribed")]
    NotSubscribed,

    /// The transport failed to hand out a record.
    #[error("fetch from {channel} failed")]
    Transport {
        channel: String,
        #[source]
        source: HeraldError,
    },

    /// A record arrived but its key or value could not be decoded.
    #[error("undecodable record at {channel} [[{partition}]] @{offset}")]
    Decode {
        channel: String,
        partition: i32,
        offset: i64,
        key: Bytes,
        value: Bytes,
        #[source]
        source: HeraldError,
    },
}

impl ConsumeError {
    /// Channel the fault happened on, when known.
    pub fn channel(&self) -> Option<&str> {
        match self {
            ConsumeError::NotSubscribed => None,
            ConsumeError::Transport { channel, .. } | ConsumeError::Decode { channel, .. } => {
                Some(channel.as_str())
            }
        }
    }
}

/// Consumes `K`/`V` pairs for one consumer group.
pub struct Consumer<K, V> {
    group_id: String,
    transport: Arc<dyn BrokerTransport>,
    keys: AvroDeserializer<K>,
    values: AvroDeserializer<V>,
    subscription: Option<Box<dyn Subscription>>,
}

impl<K: AvroMessage, V: AvroMessage> Consumer<K, V> {
    pub fn new(
        group_id: impl Into<String>,
        transport: Arc<dyn BrokerTransport>,
        registry: Arc<dyn SchemaRegistry>,
        config: &BrokerConfig,
    ) -> Result<Self, HeraldError> {
        Ok(Self {
            group_id: group_id.into(),
            transport,
            keys: AvroDeserializer::new(registry.clone(), SubjectRole::Key, config)?,
            values: AvroDeserializer::new(registry, SubjectRole::Value, config)?,
            subscription: None,
        })
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// The subscribed channel, if any.
    pub fn channel(&self) -> Option<&str> {
        self.subscription.as_ref().map(|s| s.channel())
    }

    /// Subscribes to `channel`, replacing any previous subscription.
    pub async fn subscribe(&mut self, channel: &str) -> Result<(), HeraldError> {
        if let Some(mut previous) = self.subscription.take() {
            previous.close().await?;
        }
        let subscription = self.transport.subscribe(&self.group_id, channel).await?;
        debug!(group_id = %self.group_id, channel, "consumer subscribed");
        self.subscription = Some(subscription);
        Ok(())
    }

    /// Waits for the next record or for `cancel`, whichever comes first.
    pub async fn poll(&mut self, cancel: &CancellationToken) -> Result<Polled<K, V>, ConsumeError> {
        let subscription = self
            .subscription
            .as_mut()
            .ok_or(ConsumeError::NotSubscribed)?;

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(Polled::Cancelled),
            fetched = subscription.fetch() => fetched,
        };

        let raw = fetched.map_err(|source| ConsumeError::Transport {
            channel: subscription.channel().to_string(),
            source,
        })?;

        let decoded = match self.keys.deserialize(&raw.channel, &raw.key).await {
            Ok(key) => self
                .values
                .deserialize(&raw.channel, &raw.value)
                .await
                .map(|value| (key, value)),
            Err(err) => Err(err),
        };

        match decoded {
            Ok((key, value)) => Ok(Polled::Record(ConsumedRecord {
                channel: raw.channel,
                partition: raw.partition,
                offset: raw.offset,
                key,
                value,
            })),
            Err(source) => Err(ConsumeError::Decode {
                channel: raw.channel,
                partition: raw.partition,
                offset: raw.offset,
                key: raw.key,
                value: raw.value,
                source,
            }),
        }
    }

    /// Marks `record` processed: its partition's committed position becomes
    /// at least `offset + 1`.
    pub async fn commit(&mut self, record: &ConsumedRecord<K, V>) -> Result<(), HeraldError> {
        self.commit_position(record.partition, record.offset).await
    }

    /// Commits by raw position, for records that failed to decode.
    pub async fn commit_position(&mut self, partition: i32, offset: i64) -> Result<(), HeraldError> {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.commit(partition, offset).await,
            None => Err(HeraldError::broker("commit on a closed consumer")),
        }
    }

    /// Committed position of `partition` for this group.
    pub async fn committed(&mut self, partition: i32) -> Result<Option<i64>, HeraldError> {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.committed(partition).await,
            None => Err(HeraldError::broker("consumer is not subscribed")),
        }
    }

    /// Releases the subscription. Closing twice is a no-op.
    pub async fn close(&mut self) -> Result<(), HeraldError> {
        match self.subscription.take() {
            Some(mut subscription) => subscription.close().await,
            None => Ok(()),
        }
    }
}

impl<K, V> std::fmt::Debug for Consumer<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumer")
            .field("group_id", &self.group_id)
            .field("channel", &self.subscription.as_ref().map(|s| s.channel()))
            .finish_non_exhaustive()
    }
}
