// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport wrapper with injectable faults.
//!
//! `FaultyTransport` forwards to an inner transport until told to fail. Fault
//! counters are shared with every subscription it hands out, so a test can
//! arm a commit fault after the consumer loop has already subscribed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use herald_core::{BrokerTransport, Completion, HeraldError, RawRecord, Subscription};
use tracing::debug;

#[derive(Debug, Default)]
struct Faults {
    failing_sends: AtomicUsize,
    always_fail_sends: AtomicBool,
    failing_fetches: AtomicUsize,
    failing_commits: AtomicUsize,
    commits: AtomicUsize,
    closes: AtomicUsize,
}

/// Takes one unit from `counter` if any is left.
fn take(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// A [`BrokerTransport`] that can be told to fail.
#[derive(Clone)]
pub struct FaultyTransport {
    inner: Arc<dyn BrokerTransport>,
    faults: Arc<Faults>,
}

impl FaultyTransport {
    pub fn new(inner: Arc<dyn BrokerTransport>) -> Self {
        Self {
            inner,
            faults: Arc::new(Faults::default()),
        }
    }

    /// Fail the next `n` sends.
    pub fn fail_next_sends(&self, n: usize) {
        self.faults.failing_sends.store(n, Ordering::SeqCst);
    }

    /// Fail every send until switched off again.
    pub fn fail_all_sends(&self, fail: bool) {
        self.faults.always_fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Fail the next `n` fetches across all subscriptions.
    pub fn fail_next_fetches(&self, n: usize) {
        self.faults.failing_fetches.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` commits across all subscriptions.
    pub fn fail_next_commits(&self, n: usize) {
        self.faults.failing_commits.store(n, Ordering::SeqCst);
    }

    /// Commits that reached the inner transport.
    pub fn commit_count(&self) -> usize {
        self.faults.commits.load(Ordering::SeqCst)
    }

    /// Subscriptions closed so far.
    pub fn close_count(&self) -> usize {
        self.faults.closes.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for FaultyTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultyTransport")
            .field("inner", &self.inner.name())
            .field("faults", &self.faults)
            .finish()
    }
}

#[async_trait]
impl BrokerTransport for FaultyTransport {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn send(&self, channel: &str, key: Bytes, value: Bytes) -> Result<Completion, HeraldError> {
        if self.faults.always_fail_sends.load(Ordering::SeqCst) || take(&self.faults.failing_sends) {
            debug!(channel, "injected send fault");
            return Err(HeraldError::Broker {
                message: format!("delivery to {channel} failed"),
                source: Some(Box::new(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "broker connection lost",
                ))),
            });
        }
        self.inner.send(channel, key, value).await
    }

    async fn subscribe(
        &self,
        group_id: &str,
        channel: &str,
    ) -> Result<Box<dyn Subscription>, HeraldError> {
        let inner = self.inner.subscribe(group_id, channel).await?;
        Ok(Box::new(FaultySubscription {
            inner,
            faults: self.faults.clone(),
        }))
    }
}

struct FaultySubscription {
    inner: Box<dyn Subscription>,
    faults: Arc<Faults>,
}

#[async_trait]
impl Subscription for FaultySubscription {
    fn channel(&self) -> &str {
        self.inner.channel()
    }

    async fn fetch(&mut self) -> Result<RawRecord, HeraldError> {
        if take(&self.faults.failing_fetches) {
            return Err(HeraldError::broker("injected fetch fault"));
        }
        self.inner.fetch().await
    }

    async fn commit(&mut self, partition: i32, offset: i64) -> Result<(), HeraldError> {
        if take(&self.faults.failing_commits) {
            return Err(HeraldError::broker("injected commit fault"));
        }
        self.inner.commit(partition, offset).await?;
        self.faults.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn committed(&mut self, partition: i32) -> Result<Option<i64>, HeraldError> {
        self.inner.committed(partition).await
    }

    async fn close(&mut self) -> Result<(), HeraldError> {
        self.faults.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_broker::InMemoryBroker;

    #[tokio::test]
    async fn send_faults_are_consumed_one_by_one() {
        let transport = FaultyTransport::new(Arc::new(InMemoryBroker::new(1)));
        transport.fail_next_sends(1);
        assert!(transport.send("T", Bytes::new(), Bytes::new()).await.is_err());
        assert!(transport.send("T", Bytes::new(), Bytes::new()).await.is_ok());
    }

    #[tokio::test]
    async fn commit_faults_reach_existing_subscriptions() {
        let transport = FaultyTransport::new(Arc::new(InMemoryBroker::new(1)));
        let mut sub = transport.subscribe("g", "T").await.unwrap();
        transport.fail_next_commits(1);
        assert!(sub.commit(0, 0).await.is_err());
        assert!(sub.commit(0, 0).await.is_ok());
        assert_eq!(transport.commit_count(), 1);
    }
}
