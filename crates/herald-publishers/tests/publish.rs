// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publisher behaviour against the in-process broker stack.

use std::sync::Arc;

use async_trait::async_trait;
use herald_broker::{Consumer, Polled};
use herald_core::{EventPublisher, HeraldError};
use herald_publishers::{
    Enricher, EventDraft, EventKey, EventTypeABody, EventTypeBBody, Greeting, PassThrough,
    SchemaPublisher,
};
use herald_test_utils::{BrokerHarness, UnreachableSchemaRegistry};
use tokio_util::sync::CancellationToken;
use tracing_test::traced_test;

fn type_b() -> SchemaPublisher<EventTypeBBody> {
    SchemaPublisher::new("EventTypeB", "EVENT_TYPE_B_TOPIC", Arc::new(PassThrough))
}

fn configured_b(harness: &BrokerHarness) -> SchemaPublisher<EventTypeBBody> {
    let publisher = type_b();
    publisher.inject_config(harness.context("EventTypeB")).unwrap();
    publisher
}

struct Recolor(&'static str);

#[async_trait]
impl Enricher for Recolor {
    async fn enrich(&self, mut draft: EventDraft) -> Result<EventDraft, HeraldError> {
        draft.favorite_color = self.0.to_string();
        Ok(draft)
    }
}

struct Unavailable;

#[async_trait]
impl Enricher for Unavailable {
    async fn enrich(&self, _draft: EventDraft) -> Result<EventDraft, HeraldError> {
        Err(HeraldError::Internal("enrichment database unavailable".into()))
    }
}

#[tokio::test]
async fn publish_delivers_to_channel() {
    let harness = BrokerHarness::new();
    let publisher = configured_b(&harness);

    let result = publisher.publish(2, "Message 2").await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.channel_name, "EVENT_TYPE_B_TOPIC");
    assert!(result.sender_name.starts_with("herald#producer-"));
    assert!(result.description.starts_with("produced to: EVENT_TYPE_B_TOPIC"));
    let correlation = result.correlation_id.as_deref().unwrap();
    assert!(uuid::Uuid::parse_str(correlation).is_ok());
    assert_eq!(harness.broker.record_count("EVENT_TYPE_B_TOPIC").await, 1);
}

#[tokio::test]
async fn correlation_ids_differ_for_the_same_event() {
    let harness = BrokerHarness::new();
    let publisher = configured_b(&harness);

    let first = publisher.publish(2, "Message 2").await;
    let second = publisher.publish(2, "Message 2").await;

    assert!(first.success && second.success);
    assert_ne!(first.correlation_id, second.correlation_id);
    assert_ne!(first.correlation_id.as_deref(), Some("2"));
}

#[tokio::test]
async fn published_message_decodes_with_shared_schemas() {
    let harness = BrokerHarness::new();
    let publisher = configured_b(&harness);
    let result = publisher.publish(2, "Message 2").await;

    let mut consumer = Consumer::<EventKey, EventTypeBBody>::new(
        "verify",
        harness.transport(),
        harness.registry.clone(),
        &harness.config,
    )
    .unwrap();
    consumer.subscribe("EVENT_TYPE_B_TOPIC").await.unwrap();
    let Polled::Record(record) = consumer.poll(&CancellationToken::new()).await.unwrap() else {
        panic!("expected a record");
    };

    assert_eq!(Some(record.key.event_guid.as_str()), result.correlation_id.as_deref());
    assert_eq!(record.value.id, 2);
    assert_eq!(record.value.name, "Message 2");
    assert_eq!(record.value.favorite_color, "green");
    assert!((1..100).contains(&record.value.favorite_number));
}

#[tokio::test]
async fn publish_before_injection_fails_without_panicking() {
    let publisher = type_b();

    let result = publisher.publish(1, "early").await;

    assert!(!result.success);
    assert_eq!(result.sender_name, "EventTypeB");
    let failure = result.failure.unwrap();
    assert_eq!(failure.title, "Error in EventTypeB");
    assert!(failure.detail.contains("not been configured"));
}

#[tokio::test]
async fn second_injection_is_rejected() {
    let harness = BrokerHarness::new();
    let publisher = configured_b(&harness);

    let err = publisher
        .inject_config(harness.context("EventTypeB"))
        .unwrap_err();

    assert!(matches!(err, HeraldError::Config(ref msg) if msg.contains("already configured")));
    assert!(publisher.publish(2, "still works").await.success);
}

#[tokio::test]
async fn broker_fault_becomes_failed_result() {
    let harness = BrokerHarness::new();
    let publisher = configured_b(&harness);
    harness.transport.fail_next_sends(1);

    let result = publisher.publish(2, "Message 2").await;

    assert!(!result.success);
    assert!(result.correlation_id.is_some());
    let failure = result.failure.unwrap();
    assert_eq!(failure.title, "Error in EventTypeB");
    assert!(failure.instance.starts_with("urn:herald:internalerror:"));
    assert!(failure.detail.contains("broker error"));
    assert!(failure.detail.contains("broker connection lost"));
    assert_eq!(harness.broker.record_count("EVENT_TYPE_B_TOPIC").await, 0);
}

#[tokio::test]
async fn unreachable_registry_becomes_failed_result() {
    let harness = BrokerHarness::new().with_registry(Arc::new(UnreachableSchemaRegistry::new()));
    let publisher = configured_b(&harness);

    let result = publisher.publish(2, "Message 2").await;

    assert!(!result.success);
    assert!(result.failure.unwrap().detail.contains("schema registry"));
}

#[tokio::test]
async fn enricher_shapes_the_body() {
    let harness = BrokerHarness::new();
    let publisher: SchemaPublisher<EventTypeBBody> =
        SchemaPublisher::new("EventTypeB", "EVENT_TYPE_B_TOPIC", Arc::new(Recolor("blue")));
    publisher.inject_config(harness.context("EventTypeB")).unwrap();
    publisher.publish(5, "enriched").await;

    let mut consumer = Consumer::<EventKey, EventTypeBBody>::new(
        "verify",
        harness.transport(),
        harness.registry.clone(),
        &harness.config,
    )
    .unwrap();
    consumer.subscribe("EVENT_TYPE_B_TOPIC").await.unwrap();
    let Polled::Record(record) = consumer.poll(&CancellationToken::new()).await.unwrap() else {
        panic!("expected a record");
    };
    assert_eq!(record.value.favorite_color, "blue");
}

#[tokio::test]
async fn enricher_error_becomes_failed_result() {
    let harness = BrokerHarness::new();
    let publisher: SchemaPublisher<EventTypeBBody> =
        SchemaPublisher::new("EventTypeB", "EVENT_TYPE_B_TOPIC", Arc::new(Unavailable));
    publisher.inject_config(harness.context("EventTypeB")).unwrap();

    let result = publisher.publish(5, "x").await;

    assert!(!result.success);
    assert!(result.failure.unwrap().detail.contains("enrichment database unavailable"));
    assert_eq!(harness.broker.record_count("EVENT_TYPE_B_TOPIC").await, 0);
}

#[tokio::test]
async fn concurrent_publishes_share_one_producer() {
    let harness = BrokerHarness::new();
    let publisher = Arc::new(configured_b(&harness));

    let mut tasks = Vec::new();
    for id in 0..16 {
        let publisher = publisher.clone();
        tasks.push(tokio::spawn(async move {
            publisher.publish(id, "burst").await
        }));
    }

    let mut senders = Vec::new();
    for task in tasks {
        let result = task.await.unwrap();
        assert!(result.success);
        senders.push(result.sender_name);
    }
    senders.dedup();
    assert_eq!(senders.len(), 1);
    assert_eq!(harness.broker.record_count("EVENT_TYPE_B_TOPIC").await, 16);
}

#[tokio::test]
#[traced_test]
async fn success_is_logged_inside_publisher_span() {
    let harness = BrokerHarness::new();
    let publisher = configured_b(&harness);

    publisher.publish(2, "Message 2").await;

    assert!(logs_contain("event published"));
    assert!(logs_contain("bootstrap_servers=localhost:9092"));
    assert!(logs_contain("name: Message 2"));
}

#[tokio::test]
#[traced_test]
async fn failure_is_logged_at_error() {
    let harness = BrokerHarness::new();
    let publisher = configured_b(&harness);
    harness.transport.fail_all_sends(true);

    publisher.publish(2, "Message 2").await;

    assert!(logs_contain("ERROR"));
    assert!(logs_contain("Error in EventTypeB"));
}

#[tokio::test]
#[traced_test]
async fn greeting_is_logged_for_type_a() {
    let harness = BrokerHarness::new();
    let publisher: SchemaPublisher<EventTypeABody> =
        SchemaPublisher::new("EventTypeA", "EVENT_TYPE_A_TOPIC", Arc::new(PassThrough))
            .with_greeting(Arc::new(Greeting::new("greeting-helper")));
    publisher.inject_config(harness.context("EventTypeA")).unwrap();

    assert!(publisher.publish(1, "Message 1").await.success);
    assert!(logs_contain("Hello from [greeting-helper]"));
}
