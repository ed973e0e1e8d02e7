// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema-typed event publisher.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use herald_broker::Producer;
use herald_core::{
    Completion, EventPublisher, HeraldError, PublishFailure, PublishResult, PublisherContext,
};
use tracing::{Span, error, info};

use crate::enrich::{EnricherHandle, EventDraft};
use crate::greeting::Greeting;
use crate::messages::{EventBody, EventKey};

/// State fixed at injection time.
struct Injected<V> {
    producer: Producer<EventKey, V>,
    span: Span,
}

/// Publishes [`EventKey`]/`V` pairs to one channel.
///
/// Built unconfigured; [`EventPublisher::inject_config`] builds the producer
/// once and every later publish shares it.
pub struct SchemaPublisher<V> {
    name: String,
    channel: String,
    enricher: EnricherHandle,
    greeting: Option<Arc<Greeting>>,
    injected: OnceLock<Injected<V>>,
}

impl<V: EventBody> SchemaPublisher<V> {
    pub fn new(name: impl Into<String>, channel: impl Into<String>, enricher: EnricherHandle) -> Self {
        Self {
            name: name.into(),
            channel: channel.into(),
            enricher,
            greeting: None,
            injected: OnceLock::new(),
        }
    }

    /// Log `greeting` with every publish.
    pub fn with_greeting(mut self, greeting: Arc<Greeting>) -> Self {
        self.greeting = Some(greeting);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.injected.get().is_some()
    }

    fn failure(
        &self,
        sender: &str,
        correlation_id: Option<String>,
        err: &HeraldError,
        span: &Span,
    ) -> PublishResult {
        let failure = PublishFailure {
            title: format!("Error in {}", self.name),
            instance: format!("urn:herald:internalerror:{}", uuid::Uuid::new_v4()),
            detail: err.detail(),
        };
        error!(
            parent: span,
            title = %failure.title,
            instance = %failure.instance,
            detail = %failure.detail,
            "error publishing event"
        );
        PublishResult::failed(sender, &self.channel, correlation_id, failure)
    }

    async fn build_and_produce(
        &self,
        injected: &Injected<V>,
        key: &EventKey,
        event_id: i64,
        payload: &str,
    ) -> Result<(V, Completion), HeraldError> {
        let draft = self.enricher.enrich(EventDraft::new(event_id, payload)).await?;
        let body = V::from_draft(draft);
        if let Some(greeting) = &self.greeting {
            info!(parent: &injected.span, %greeting, payload, "publishing");
        }
        let completion = injected.producer.produce(&self.channel, key, &body).await?;
        Ok((body, completion))
    }
}

#[async_trait]
impl<V: EventBody> EventPublisher for SchemaPublisher<V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel(&self) -> &str {
        &self.channel
    }

    fn inject_config(&self, ctx: PublisherContext) -> Result<(), HeraldError> {
        let already = || HeraldError::Config(format!("publisher {} is already configured", self.name));
        if self.is_configured() {
            return Err(already());
        }
        let PublisherContext {
            config,
            transport,
            schemas,
            span,
        } = ctx;
        let producer = Producer::new(transport, schemas, &config)?;
        info!(parent: &span, producer = producer.name(), channel = %self.channel, "publisher configured");
        self.injected
            .set(Injected { producer, span })
            .map_err(|_| already())
    }

    async fn publish(&self, event_id: i64, payload: &str) -> PublishResult {
        let Some(injected) = self.injected.get() else {
            let err = HeraldError::Config(format!("publisher {} has not been configured", self.name));
            return self.failure(&self.name, None, &err, &Span::current());
        };

        let key = EventKey::generate();
        let sender = injected.producer.name();
        match self.build_and_produce(injected, &key, event_id, payload).await {
            Ok((body, completion)) => {
                info!(
                    parent: &injected.span,
                    event_type = %self.name,
                    channel = %self.channel,
                    event_key = %key,
                    event_body = %body,
                    %completion,
                    "event published"
                );
                PublishResult::delivered(sender, key.event_guid, completion)
            }
            Err(err) => self.failure(sender, Some(key.event_guid), &err, &injected.span),
        }
    }
}

impl<V> std::fmt::Debug for SchemaPublisher<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaPublisher")
            .field("name", &self.name)
            .field("channel", &self.channel)
            .field("configured", &self.injected.get().is_some())
            .finish_non_exhaustive()
    }
}
