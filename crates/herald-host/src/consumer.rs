// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consumer loop FSM with per-record fault isolation.
//!
//! The loop goes through states: Idle -> Subscribed -> Polling <-> Processing,
//! ending in Closed once its cancellation token fires. A record is committed
//! only after its handler succeeds; handler, commit, transport and decode
//! faults are logged and the loop keeps polling.
//!
//! Once a handler fails in a partition, later records in that partition are
//! still handled but not committed for the rest of the run, so the group's
//! position never moves past the failed record.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use herald_broker::{ConsumeError, Consumer, Polled};
use herald_core::{ConsumedRecord, HeraldError};
use herald_schema::AvroMessage;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn};

/// Pause after a transport fault before polling again.
const TRANSPORT_BACKOFF: Duration = Duration::from_millis(50);

/// States in the consumer loop FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Built, not yet subscribed.
    Idle,
    /// Subscription established.
    Subscribed,
    /// Waiting for the next record.
    Polling,
    /// Handling and committing a record.
    Processing,
    /// Cancelled; the subscription has been released.
    Closed,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::Idle => write!(f, "idle"),
            LoopState::Subscribed => write!(f, "subscribed"),
            LoopState::Polling => write!(f, "polling"),
            LoopState::Processing => write!(f, "processing"),
            LoopState::Closed => write!(f, "closed"),
        }
    }
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Records the handler accepted.
    pub processed: u64,
    /// Poll, decode, handler and commit faults.
    pub failed: u64,
    /// Successful commits.
    pub committed: u64,
    /// Accepted records left uncommitted behind an earlier failure.
    pub held: u64,
}

/// Local processing of one decoded record.
///
/// An error leaves the record uncommitted, so it is redelivered the next
/// time the group subscribes.
#[async_trait]
pub trait RecordHandler<K, V>: Send + Sync {
    async fn handle(&self, record: &ConsumedRecord<K, V>) -> Result<(), HeraldError>;
}

/// Logs each record's position, key and body.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

#[async_trait]
impl<K, V> RecordHandler<K, V> for LoggingHandler
where
    K: fmt::Display + Send + Sync,
    V: fmt::Display + Send + Sync,
{
    async fn handle(&self, record: &ConsumedRecord<K, V>) -> Result<(), HeraldError> {
        info!(
            channel = %record.channel,
            partition = record.partition,
            offset = record.offset,
            event_key = %record.key,
            event_data = %record.value,
            "event consumed"
        );
        Ok(())
    }
}

/// Polls one channel until cancelled.
pub struct ConsumerLoop<K, V> {
    consumer: Consumer<K, V>,
    channel: String,
    handler: Arc<dyn RecordHandler<K, V>>,
    state: watch::Sender<LoopState>,
    /// First offset per partition whose handler failed during this run.
    gaps: HashMap<i32, i64>,
}

impl<K, V> ConsumerLoop<K, V>
where
    K: AvroMessage + fmt::Debug,
    V: AvroMessage + fmt::Debug,
{
    pub fn new(
        consumer: Consumer<K, V>,
        channel: impl Into<String>,
        handler: Arc<dyn RecordHandler<K, V>>,
    ) -> Self {
        let (state, _) = watch::channel(LoopState::Idle);
        Self {
            consumer,
            channel: channel.into(),
            handler,
            state,
            gaps: HashMap::new(),
        }
    }

    /// Observes state transitions, including ones made after this call.
    pub fn state(&self) -> watch::Receiver<LoopState> {
        self.state.subscribe()
    }

    fn enter(&self, next: LoopState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            trace!(channel = %self.channel, from = %previous, to = %next, "consumer loop state");
        }
    }

    /// Runs until `cancel` fires.
    ///
    /// Failing to subscribe is the only error returned; every fault after
    /// that is logged and counted in the returned [`LoopStats`].
    pub async fn run(mut self, cancel: CancellationToken) -> Result<LoopStats, HeraldError> {
        self.consumer.subscribe(&self.channel).await?;
        self.enter(LoopState::Subscribed);
        info!(
            channel = %self.channel,
            group_id = self.consumer.group_id(),
            "consumer loop running"
        );

        let mut stats = LoopStats::default();
        while !cancel.is_cancelled() {
            self.enter(LoopState::Polling);
            match self.consumer.poll(&cancel).await {
                Ok(Polled::Record(record)) => {
                    self.enter(LoopState::Processing);
                    self.process(&record, &mut stats).await;
                }
                Ok(Polled::Cancelled) => break,
                Err(err) => {
                    stats.failed += 1;
                    self.report_poll_fault(&err);
                    if matches!(err, ConsumeError::Transport { .. }) {
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(TRANSPORT_BACKOFF) => {}
                        }
                    }
                }
            }
        }

        info!(channel = %self.channel, "cancellation received, closing consumer");
        if let Err(e) = self.consumer.close().await {
            warn!(channel = %self.channel, error = %e, "failed to release subscription");
        }
        self.enter(LoopState::Closed);
        info!(
            channel = %self.channel,
            processed = stats.processed,
            failed = stats.failed,
            committed = stats.committed,
            held = stats.held,
            "consumer loop stopped"
        );
        Ok(stats)
    }

    async fn process(&mut self, record: &ConsumedRecord<K, V>, stats: &mut LoopStats) {
        if let Err(e) = self.handler.handle(record).await {
            stats.failed += 1;
            error!(
                channel = %record.channel,
                partition = record.partition,
                offset = record.offset,
                key = ?record.key,
                value = ?record.value,
                reason = %e.detail(),
                "record processing failed, leaving it uncommitted"
            );
            self.gaps.entry(record.partition).or_insert(record.offset);
            return;
        }
        stats.processed += 1;

        if let Some(gap) = self.gaps.get(&record.partition) {
            stats.held += 1;
            warn!(
                channel = %record.channel,
                partition = record.partition,
                offset = record.offset,
                uncommitted_offset = *gap,
                "commit held back behind an uncommitted record"
            );
            return;
        }

        match self.consumer.commit(record).await {
            Ok(()) => stats.committed += 1,
            Err(e) => {
                stats.failed += 1;
                error!(
                    channel = %record.channel,
                    partition = record.partition,
                    offset = record.offset,
                    reason = %e.detail(),
                    "commit failed"
                );
            }
        }
    }

    fn report_poll_fault(&self, err: &ConsumeError) {
        let channel = err.channel().unwrap_or(&self.channel);
        match err {
            ConsumeError::Decode {
                partition,
                offset,
                key,
                value,
                source,
                ..
            } => error!(
                channel,
                partition,
                offset,
                raw_key = ?key,
                raw_value = ?value,
                reason = %source.detail(),
                "consume error"
            ),
            ConsumeError::Transport { source, .. } => {
                error!(channel, reason = %source.detail(), "consume error")
            }
            ConsumeError::NotSubscribed => error!(channel, reason = %err, "consume error"),
        }
    }
}

impl<K, V> fmt::Debug for ConsumerLoop<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerLoop")
            .field("channel", &self.channel)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
