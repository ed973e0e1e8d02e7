// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Herald host.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::HashMap;

use herald_core::BrokerConfig;
use serde::{Deserialize, Serialize};

/// Top-level Herald configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional and defaults sensibly.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeraldConfig {
    /// Host identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Broker connection endpoints.
    #[serde(default)]
    pub kafka: KafkaConfig,

    /// Schema registry client tuning.
    #[serde(default)]
    pub schema_registry: SchemaRegistryConfig,

    /// Avro serializer tuning.
    #[serde(default)]
    pub serializer: SerializerConfig,

    /// Consumer loop settings.
    #[serde(default)]
    pub consumer: ConsumerConfig,

    /// In-process broker settings.
    #[serde(default)]
    pub broker: BrokerSection,

    /// Plugin discovery settings.
    #[serde(default)]
    pub plugins: PluginsConfig,
}

impl HeraldConfig {
    /// Assembles the shared, read-only broker configuration handed to
    /// publishers and the consumer loop.
    pub fn broker_config(&self) -> BrokerConfig {
        BrokerConfig {
            bootstrap_servers: self.kafka.bootstrap_servers.clone(),
            schema_registry_url: self.kafka.schema_registry_url.clone(),
            request_timeout_ms: self.schema_registry.request_timeout_ms,
            max_cached_schemas: self.schema_registry.max_cached_schemas,
            auto_register_schemas: self.serializer.auto_register_schemas,
            buffer_bytes: self.serializer.buffer_bytes,
            client_id: self.kafka.client_id.clone(),
        }
    }
}

/// Host identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the host process.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "herald".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Broker connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KafkaConfig {
    /// Comma separated bootstrap endpoints.
    #[serde(default = "default_bootstrap_servers")]
    pub bootstrap_servers: String,

    /// Schema registry base URL. `memory://` selects the in-process registry.
    #[serde(default = "default_schema_registry_url")]
    pub schema_registry_url: String,

    /// Client id prefix used to name producers.
    #[serde(default = "default_client_id")]
    pub client_id: String,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: default_bootstrap_servers(),
            schema_registry_url: default_schema_registry_url(),
            client_id: default_client_id(),
        }
    }
}

fn default_bootstrap_servers() -> String {
    "localhost:9092".to_string()
}

fn default_schema_registry_url() -> String {
    "memory://".to_string()
}

fn default_client_id() -> String {
    "herald".to_string()
}

/// Schema registry client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaRegistryConfig {
    /// Timeout for a single registry request in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Maximum number of schema lookups kept in the client cache.
    #[serde(default = "default_max_cached_schemas")]
    pub max_cached_schemas: u64,
}

impl Default for SchemaRegistryConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            max_cached_schemas: default_max_cached_schemas(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_max_cached_schemas() -> u64 {
    10
}

/// Avro serializer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SerializerConfig {
    /// Register schemas on first use instead of requiring them up front.
    #[serde(default = "default_true")]
    pub auto_register_schemas: bool,

    /// Initial capacity of the encode buffer in bytes.
    #[serde(default = "default_buffer_bytes")]
    pub buffer_bytes: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            auto_register_schemas: true,
            buffer_bytes: default_buffer_bytes(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_buffer_bytes() -> usize {
    100
}

/// Consumer loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConsumerConfig {
    /// Consumer group whose committed positions the loop reads and advances.
    #[serde(default = "default_group_id")]
    pub group_id: String,

    /// Channel consumed by `herald consume` when none is given on the command line.
    #[serde(default = "default_consumer_channel")]
    pub channel: String,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            group_id: default_group_id(),
            channel: default_consumer_channel(),
        }
    }
}

fn default_group_id() -> String {
    "EVENT_TYPE_B_CONSUMER_GROUP".to_string()
}

fn default_consumer_channel() -> String {
    "EVENT_TYPE_B_TOPIC".to_string()
}

/// In-process broker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerSection {
    /// Partitions created per channel.
    #[serde(default = "default_partitions")]
    pub partitions: u32,
}

impl Default for BrokerSection {
    fn default() -> Self {
        Self {
            partitions: default_partitions(),
        }
    }
}

fn default_partitions() -> u32 {
    1
}

/// Plugin discovery configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Directory scanned for plugin manifests. `None` loads the built-in catalog.
    #[serde(default)]
    pub directory: Option<String>,

    /// Per-plugin overrides keyed by dispatch name; `false` keeps a plugin out
    /// of the registry.
    #[serde(default)]
    pub enabled: HashMap<String, bool>,
}
