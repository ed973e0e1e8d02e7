// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broker transport traits: raw produce and subscription primitives.
//!
//! Transports move opaque bytes. Schema encoding happens one layer up in the
//! typed producer and consumer.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::HeraldError;
use crate::types::{Completion, RawRecord};

/// A connection to a message broker.
#[async_trait]
pub trait BrokerTransport: Send + Sync + 'static {
    /// Returns a short name identifying this transport in logs.
    fn name(&self) -> &str;

    /// Appends a key/value pair to `channel` and returns where it landed.
    async fn send(&self, channel: &str, key: Bytes, value: Bytes) -> Result<Completion, HeraldError>;

    /// Joins `group_id` on `channel`. Reading starts at the group's committed
    /// position for every partition.
    async fn subscribe(
        &self,
        group_id: &str,
        channel: &str,
    ) -> Result<Box<dyn Subscription>, HeraldError>;
}

/// A live subscription to one channel on behalf of a consumer group.
///
/// Dropping the subscription releases it; [`Subscription::close`] does the
/// same explicitly and is idempotent.
#[async_trait]
pub trait Subscription: Send {
    /// The subscribed channel.
    fn channel(&self) -> &str;

    /// Blocks until the next record is available. Must be cancel safe: a fetch
    /// dropped before completion leaves the read position untouched.
    async fn fetch(&mut self) -> Result<RawRecord, HeraldError>;

    /// Advances the committed position of `partition` to at least `offset + 1`.
    async fn commit(&mut self, partition: i32, offset: i64) -> Result<(), HeraldError>;

    /// Returns the committed position of `partition`, if any.
    async fn committed(&mut self, partition: i32) -> Result<Option<i64>, HeraldError>;

    /// Releases the subscription. Further commits fail.
    async fn close(&mut self) -> Result<(), HeraldError>;
}
