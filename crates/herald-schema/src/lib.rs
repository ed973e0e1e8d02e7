// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema-governed message encoding for Herald.
//!
//! Messages travel in Confluent framing (magic byte, big-endian schema id,
//! Avro binary datum). Schema ids come from a [`SchemaRegistry`]: either the
//! process-local [`InMemorySchemaRegistry`] or the REST
//! [`HttpSchemaRegistry`], both usually wrapped in a bounded
//! [`CachedSchemaRegistry`].

pub mod cache;
pub mod codec;
pub mod http;
pub mod memory;
pub mod wire;

use std::sync::Arc;
use std::time::Duration;

use herald_core::{BrokerConfig, HeraldError, SchemaRegistry};

pub use cache::CachedSchemaRegistry;
pub use codec::{AvroDeserializer, AvroMessage, AvroSerializer, SubjectRole};
pub use http::HttpSchemaRegistry;
pub use memory::InMemorySchemaRegistry;

/// URL scheme selecting the process-local registry.
pub const MEMORY_SCHEME: &str = "memory://";

/// Builds the cached registry client described by `config`.
///
/// `memory://` selects a fresh [`InMemorySchemaRegistry`]; `http://` and
/// `https://` select [`HttpSchemaRegistry`].
pub fn registry_from_config(config: &BrokerConfig) -> Result<Arc<dyn SchemaRegistry>, HeraldError> {
    let url = config.schema_registry_url.trim();
    let inner: Arc<dyn SchemaRegistry> = if url.starts_with(MEMORY_SCHEME) {
        Arc::new(InMemorySchemaRegistry::new())
    } else if url.starts_with("http://") || url.starts_with("https://") {
        Arc::new(HttpSchemaRegistry::new(
            url,
            Duration::from_millis(config.request_timeout_ms),
        )?)
    } else {
        return Err(HeraldError::Config(format!(
            "unsupported schema registry url `{url}`"
        )));
    };

    Ok(Arc::new(CachedSchemaRegistry::new(
        inner,
        config.max_cached_schemas,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_url_builds_registry() {
        assert!(registry_from_config(&BrokerConfig::default()).is_ok());
    }

    #[test]
    fn http_url_builds_registry() {
        let config = BrokerConfig {
            schema_registry_url: "http://localhost:8081".into(),
            ..BrokerConfig::default()
        };
        assert!(registry_from_config(&config).is_ok());
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let config = BrokerConfig {
            schema_registry_url: "kafka://registry".into(),
            ..BrokerConfig::default()
        };
        assert!(matches!(
            registry_from_config(&config),
            Err(HeraldError::Config(_))
        ));
    }
}
