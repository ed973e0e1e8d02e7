// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by publishers, the broker client, and the host.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Capability kinds a plugin manifest may declare.
///
/// The registry indexes a single kind; manifests declaring any other kind are
/// ignored during discovery.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Capability {
    EventPublisher,
}

/// Shared broker connection settings, injected read-only into every publisher
/// and into the consumer loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Comma separated bootstrap endpoints.
    pub bootstrap_servers: String,
    /// Schema registry base URL. `memory://` selects the in-process registry.
    pub schema_registry_url: String,
    /// Timeout for schema registry requests.
    pub request_timeout_ms: u64,
    /// Upper bound on cached schema lookups.
    pub max_cached_schemas: u64,
    /// Register unknown schemas on first use instead of failing.
    pub auto_register_schemas: bool,
    /// Initial capacity of the serialization buffer.
    pub buffer_bytes: usize,
    /// Client id used to name producers.
    pub client_id: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".to_string(),
            schema_registry_url: "memory://".to_string(),
            request_timeout_ms: 5000,
            max_cached_schemas: 10,
            auto_register_schemas: true,
            buffer_bytes: 100,
            client_id: "herald".to_string(),
        }
    }
}

/// An incoming domain event awaiting dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: i64,
    pub event_type: String,
    pub payload: String,
}

impl EventRecord {
    pub fn new(event_id: i64, event_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            event_id,
            event_type: event_type.into(),
            payload: payload.into(),
        }
    }
}

/// The unit exchanged with the broker: a schema-typed key/value pair bound
/// for one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEnvelope<K, V> {
    pub key: K,
    pub value: V,
    pub channel: String,
}

/// Delivery metadata returned by the broker for a produced message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub channel: String,
    pub partition: i32,
    pub offset: i64,
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [[{}]] @{}", self.channel, self.partition, self.offset)
    }
}

/// Problem details attached to a failed publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishFailure {
    /// Human readable title, derived from the publisher name.
    pub title: String,
    /// Globally unique instance id for correlating logs (`urn:herald:internalerror:<uuid>`).
    pub instance: String,
    /// Rendered error chain.
    pub detail: String,
}

/// Structured outcome of a single publish call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    pub success: bool,
    pub description: String,
    pub channel_name: String,
    pub sender_name: String,
    /// Correlation id carried in the message key, when a key was built.
    pub correlation_id: Option<String>,
    pub completion: Option<Completion>,
    pub failure: Option<PublishFailure>,
}

impl PublishResult {
    /// Result for a message the broker acknowledged.
    pub fn delivered(
        sender_name: impl Into<String>,
        correlation_id: impl Into<String>,
        completion: Completion,
    ) -> Self {
        Self {
            success: true,
            description: format!("produced to: {completion}"),
            channel_name: completion.channel.clone(),
            sender_name: sender_name.into(),
            correlation_id: Some(correlation_id.into()),
            completion: Some(completion),
            failure: None,
        }
    }

    /// Result for a publish that did not reach the broker.
    pub fn failed(
        sender_name: impl Into<String>,
        channel_name: impl Into<String>,
        correlation_id: Option<String>,
        failure: PublishFailure,
    ) -> Self {
        Self {
            success: false,
            description: format!("error producing message: {}", failure.detail),
            channel_name: channel_name.into(),
            sender_name: sender_name.into(),
            correlation_id,
            completion: None,
            failure: Some(failure),
        }
    }
}

/// An undecoded record as handed out by a broker subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub channel: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Bytes,
    pub value: Bytes,
}

/// A decoded record, alive for one processing iteration of the consumer loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumedRecord<K, V> {
    pub channel: String,
    pub partition: i32,
    pub offset: i64,
    pub key: K,
    pub value: V,
}

/// A schema as stored in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredSchema {
    pub id: i32,
    pub subject: String,
    pub version: i32,
    pub schema: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn capability_round_trips_through_strings() {
        let cap = Capability::from_str("EventPublisher").unwrap();
        assert_eq!(cap, Capability::EventPublisher);
        assert_eq!(cap.to_string(), "EventPublisher");
        assert!(Capability::from_str("MessageSender").is_err());
    }

    #[test]
    fn completion_display_matches_partition_offset_form() {
        let completion = Completion {
            channel: "EVENT_TYPE_B_TOPIC".into(),
            partition: 0,
            offset: 7,
        };
        assert_eq!(completion.to_string(), "EVENT_TYPE_B_TOPIC [[0]] @7");
    }

    #[test]
    fn delivered_result_uses_completion_channel() {
        let completion = Completion {
            channel: "EVENT_TYPE_A_TOPIC".into(),
            partition: 1,
            offset: 3,
        };
        let result = PublishResult::delivered("herald#producer-1", "abc", completion.clone());
        assert!(result.success);
        assert_eq!(result.channel_name, "EVENT_TYPE_A_TOPIC");
        assert_eq!(result.completion, Some(completion));
        assert!(result.failure.is_none());
        assert!(result.description.starts_with("produced to:"));
    }

    #[test]
    fn failed_result_carries_failure() {
        let failure = PublishFailure {
            title: "Error in EventTypeB".into(),
            instance: "urn:herald:internalerror:1".into(),
            detail: "broker error: down".into(),
        };
        let result = PublishResult::failed("EventTypeB", "EVENT_TYPE_B_TOPIC", None, failure);
        assert!(!result.success);
        assert_eq!(result.failure.as_ref().unwrap().title, "Error in EventTypeB");
        assert!(result.description.contains("broker error: down"));
    }

    #[test]
    fn failed_result_serializes_problem_details() {
        let failure = PublishFailure {
            title: "Error in EventTypeC".into(),
            instance: "urn:herald:internalerror:42".into(),
            detail: "schema registry error: unreachable".into(),
        };
        let result = PublishResult::failed("EventTypeC", "EVENT_TYPE_C_TOPIC", None, failure);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["failure"]["instance"], "urn:herald:internalerror:42");
        assert!(json["completion"].is_null());
    }

    #[test]
    fn broker_config_defaults_follow_serializer_tuning() {
        let cfg = BrokerConfig::default();
        assert_eq!(cfg.request_timeout_ms, 5000);
        assert_eq!(cfg.max_cached_schemas, 10);
        assert!(cfg.auto_register_schemas);
        assert_eq!(cfg.buffer_bytes, 100);
    }
}
