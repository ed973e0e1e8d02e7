// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process broker with partitioned channels and consumer group offsets.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use herald_core::{BrokerTransport, Completion, HeraldError, RawRecord, Subscription};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, trace};

/// A broker living inside the host process.
///
/// Channels are created on first use with a fixed number of partitions.
/// Records are routed to a partition by hashing the encoded key, so every
/// message with the same key stays in order. Committed positions are kept per
/// `(group, channel, partition)` and survive unsubscribe, so a group that
/// resubscribes resumes from its last commit.
#[derive(Debug, Clone)]
pub struct InMemoryBroker {
    name: String,
    partitions: u32,
    state: Arc<Mutex<BrokerState>>,
}

#[derive(Debug, Default)]
struct BrokerState {
    channels: HashMap<String, ChannelLog>,
    committed: HashMap<GroupPartition, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupPartition {
    group: String,
    channel: String,
    partition: i32,
}

#[derive(Debug)]
struct ChannelLog {
    partitions: Vec<Vec<(Bytes, Bytes)>>,
    notify: Arc<Notify>,
}

impl ChannelLog {
    fn new(partitions: u32) -> Self {
        Self {
            partitions: (0..partitions.max(1)).map(|_| Vec::new()).collect(),
            notify: Arc::new(Notify::new()),
        }
    }
}

impl BrokerState {
    fn channel(&mut self, channel: &str, partitions: u32) -> &mut ChannelLog {
        self.channels
            .entry(channel.to_string())
            .or_insert_with(|| ChannelLog::new(partitions))
    }
}

impl InMemoryBroker {
    /// Creates a broker whose channels have `partitions` partitions each.
    pub fn new(partitions: u32) -> Self {
        Self::with_name("memory", partitions)
    }

    /// Creates a broker that reports `name` in logs, usually the configured
    /// bootstrap endpoints.
    pub fn with_name(name: impl Into<String>, partitions: u32) -> Self {
        Self {
            name: name.into(),
            partitions: partitions.max(1),
            state: Arc::new(Mutex::new(BrokerState::default())),
        }
    }

    /// Number of records appended to `channel` across all partitions.
    pub async fn record_count(&self, channel: &str) -> usize {
        let state = self.state.lock().await;
        state
            .channels
            .get(channel)
            .map(|log| log.partitions.iter().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Committed position of `group` on `channel`/`partition`.
    pub async fn committed_offset(&self, group: &str, channel: &str, partition: i32) -> Option<i64> {
        let state = self.state.lock().await;
        state
            .committed
            .get(&GroupPartition {
                group: group.to_string(),
                channel: channel.to_string(),
                partition,
            })
            .copied()
    }

    fn partition_for(&self, key: &[u8]) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % u64::from(self.partitions)) as usize
    }
}

#[async_trait]
impl BrokerTransport for InMemoryBroker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, channel: &str, key: Bytes, value: Bytes) -> Result<Completion, HeraldError> {
        let partition = self.partition_for(&key);
        let mut state = self.state.lock().await;
        let log = state.channel(channel, self.partitions);
        let records = &mut log.partitions[partition];
        records.push((key, value));
        let offset = records.len() as i64 - 1;
        log.notify.notify_waiters();

        trace!(channel, partition, offset, "record appended");
        Ok(Completion {
            channel: channel.to_string(),
            partition: partition as i32,
            offset,
        })
    }

    async fn subscribe(
        &self,
        group_id: &str,
        channel: &str,
    ) -> Result<Box<dyn Subscription>, HeraldError> {
        let mut state = self.state.lock().await;
        let partitions = state.channel(channel, self.partitions).partitions.len();
        let notify = state.channel(channel, self.partitions).notify.clone();

        let positions = (0..partitions)
            .map(|p| {
                state
                    .committed
                    .get(&GroupPartition {
                        group: group_id.to_string(),
                        channel: channel.to_string(),
                        partition: p as i32,
                    })
                    .copied()
                    .unwrap_or(0)
            })
            .collect();

        debug!(group_id, channel, partitions, "subscribed");
        Ok(Box::new(MemorySubscription {
            group: group_id.to_string(),
            channel: channel.to_string(),
            state: self.state.clone(),
            notify,
            positions,
            next_partition: 0,
            closed: false,
        }))
    }
}

/// A group's read cursor over one channel.
struct MemorySubscription {
    group: String,
    channel: String,
    state: Arc<Mutex<BrokerState>>,
    notify: Arc<Notify>,
    /// Next offset to read, per partition.
    positions: Vec<i64>,
    next_partition: usize,
    closed: bool,
}

impl MemorySubscription {
    fn ensure_open(&self) -> Result<(), HeraldError> {
        if self.closed {
            return Err(HeraldError::broker(format!(
                "subscription to {} is closed",
                self.channel
            )));
        }
        Ok(())
    }

    fn key(&self, partition: i32) -> GroupPartition {
        GroupPartition {
            group: self.group.clone(),
            channel: self.channel.clone(),
            partition,
        }
    }

    /// Takes the next unread record, scanning partitions round-robin.
    async fn try_next(&mut self) -> Option<RawRecord> {
        let state = self.state.lock().await;
        let log = state.channels.get(&self.channel)?;
        let count = self.positions.len();

        for step in 0..count {
            let partition = (self.next_partition + step) % count;
            let position = self.positions[partition];
            if let Some((key, value)) = log.partitions[partition].get(position as usize) {
                self.positions[partition] = position + 1;
                self.next_partition = (partition + 1) % count;
                return Some(RawRecord {
                    channel: self.channel.clone(),
                    partition: partition as i32,
                    offset: position,
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }
        None
    }
}

#[async_trait]
impl Subscription for MemorySubscription {
    fn channel(&self) -> &str {
        &self.channel
    }

    async fn fetch(&mut self) -> Result<RawRecord, HeraldError> {
        self.ensure_open()?;
        let notify = self.notify.clone();
        loop {
            // Register interest before checking so an append between the
            // check and the await still wakes us.
            let notified = notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(record) = self.try_next().await {
                return Ok(record);
            }
            notified.await;
        }
    }

    async fn commit(&mut self, partition: i32, offset: i64) -> Result<(), HeraldError> {
        self.ensure_open()?;
        if partition < 0 || partition as usize >= self.positions.len() {
            return Err(HeraldError::broker(format!(
                "partition {partition} does not exist on {}",
                self.channel
            )));
        }

        let key = self.key(partition);
        let mut state = self.state.lock().await;
        let committed = state.committed.entry(key).or_insert(0);
        *committed = (*committed).max(offset + 1);
        trace!(channel = %self.channel, partition, position = *committed, "committed");
        Ok(())
    }

    async fn committed(&mut self, partition: i32) -> Result<Option<i64>, HeraldError> {
        let key = self.key(partition);
        let state = self.state.lock().await;
        Ok(state.committed.get(&key).copied())
    }

    async fn close(&mut self) -> Result<(), HeraldError> {
        if !self.closed {
            self.closed = true;
            debug!(group = %self.group, channel = %self.channel, "subscription closed");
        }
        Ok(())
    }
}
