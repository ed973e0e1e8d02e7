// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Avro serializer and deserializer bound to a schema registry.
//!
//! Subjects follow the topic-name strategy: `<channel>-key` for keys and
//! `<channel>-value` for values.

use std::marker::PhantomData;
use std::sync::Arc;

use apache_avro::Schema;
use bytes::Bytes;
use herald_core::{BrokerConfig, HeraldError, SchemaRegistry};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::wire;

/// A message type with a fixed Avro schema.
pub trait AvroMessage: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Avro schema in JSON form.
    const SCHEMA: &'static str;
}

/// Which half of a message a codec handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectRole {
    Key,
    Value,
}

impl SubjectRole {
    /// Registry subject for `channel` under the topic-name strategy.
    pub fn subject(self, channel: &str) -> String {
        match self {
            SubjectRole::Key => format!("{channel}-key"),
            SubjectRole::Value => format!("{channel}-value"),
        }
    }
}

/// Parsed local schema shared by both codec directions.
#[derive(Debug)]
struct LocalSchema {
    parsed: Schema,
    canonical: String,
}

impl LocalSchema {
    fn parse<T: AvroMessage>() -> Result<Self, HeraldError> {
        let parsed = Schema::parse_str(T::SCHEMA).map_err(|e| HeraldError::Serialization {
            message: format!("invalid schema for {}", std::any::type_name::<T>()),
            source: Some(Box::new(e)),
        })?;
        let canonical = parsed.canonical_form();
        Ok(Self { parsed, canonical })
    }

    /// Id the registry assigns to this schema under `subject`.
    async fn resolve_id(
        &self,
        registry: &dyn SchemaRegistry,
        subject: &str,
        auto_register: bool,
    ) -> Result<i32, HeraldError> {
        let resolved = if auto_register {
            registry.register(subject, &self.canonical).await.map(Some)
        } else {
            registry
                .lookup(subject, &self.canonical)
                .await
                .map(|found| found.map(|s| s.id))
        };

        match resolved {
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err(HeraldError::serialization(format!(
                "schema is not registered under subject `{subject}` and auto registration is disabled"
            ))),
            Err(err) => Err(HeraldError::Serialization {
                message: format!("could not resolve schema for subject `{subject}`"),
                source: Some(Box::new(err)),
            }),
        }
    }
}

/// Encodes `T` into framed Avro for one subject role.
pub struct AvroSerializer<T> {
    registry: Arc<dyn SchemaRegistry>,
    schema: LocalSchema,
    role: SubjectRole,
    auto_register: bool,
    buffer_bytes: usize,
    _message: PhantomData<fn(&T)>,
}

impl<T: AvroMessage> AvroSerializer<T> {
    pub fn new(
        registry: Arc<dyn SchemaRegistry>,
        role: SubjectRole,
        config: &BrokerConfig,
    ) -> Result<Self, HeraldError> {
        Ok(Self {
            registry,
            schema: LocalSchema::parse::<T>()?,
            role,
            auto_register: config.auto_register_schemas,
            buffer_bytes: config.buffer_bytes,
            _message: PhantomData,
        })
    }

    /// Serializes `message` for `channel`, registering the schema on first
    /// use when auto registration is enabled.
    pub async fn serialize(&self, channel: &str, message: &T) -> Result<Bytes, HeraldError> {
        let subject = self.role.subject(channel);
        let id = self
            .schema
            .resolve_id(self.registry.as_ref(), &subject, self.auto_register)
            .await?;

        let value = apache_avro::to_value(message)
            .and_then(|value| value.resolve(&self.schema.parsed))
            .map_err(|e| HeraldError::Serialization {
                message: format!("message does not match schema for subject `{subject}`"),
                source: Some(Box::new(e)),
            })?;
        let datum = apache_avro::to_avro_datum(&self.schema.parsed, value).map_err(|e| {
            HeraldError::Serialization {
                message: format!("failed to encode datum for subject `{subject}`"),
                source: Some(Box::new(e)),
            }
        })?;

        trace!(subject = %subject, schema_id = id, bytes = datum.len(), "encoded");
        Ok(wire::frame(id, &datum, self.buffer_bytes))
    }
}

/// Decodes framed Avro into `T`, rejecting frames written under a different
/// schema id than the local schema's.
pub struct AvroDeserializer<T> {
    registry: Arc<dyn SchemaRegistry>,
    schema: LocalSchema,
    role: SubjectRole,
    auto_register: bool,
    _message: PhantomData<fn() -> T>,
}

impl<T: AvroMessage> AvroDeserializer<T> {
    pub fn new(
        registry: Arc<dyn SchemaRegistry>,
        role: SubjectRole,
        config: &BrokerConfig,
    ) -> Result<Self, HeraldError> {
        Ok(Self {
            registry,
            schema: LocalSchema::parse::<T>()?,
            role,
            auto_register: config.auto_register_schemas,
            _message: PhantomData,
        })
    }

    pub async fn deserialize(&self, channel: &str, data: &[u8]) -> Result<T, HeraldError> {
        let (frame_id, mut datum) = wire::unframe(data)?;
        let subject = self.role.subject(channel);
        let expected = self
            .schema
            .resolve_id(self.registry.as_ref(), &subject, self.auto_register)
            .await?;

        if frame_id != expected {
            return Err(HeraldError::serialization(format!(
                "frame carries schema id {frame_id} but subject `{subject}` expects {expected}"
            )));
        }

        let value = apache_avro::from_avro_datum(&self.schema.parsed, &mut datum, None)
            .map_err(|e| HeraldError::Serialization {
                message: format!("failed to decode datum for subject `{subject}`"),
                source: Some(Box::new(e)),
            })?;
        apache_avro::from_value::<T>(&value).map_err(|e| HeraldError::Serialization {
            message: format!("decoded value does not fit {}", std::any::type_name::<T>()),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySchemaRegistry;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Key {
        #[serde(rename = "eventGuid")]
        event_guid: String,
    }

    impl AvroMessage for Key {
        const SCHEMA: &'static str = r#"{"type":"record","name":"EventKey","fields":[{"name":"eventGuid","type":"string"}]}"#;
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Reading {
        id: i64,
        label: String,
    }

    impl AvroMessage for Reading {
        const SCHEMA: &'static str = r#"{"type":"record","name":"Reading","fields":[{"name":"id","type":"long"},{"name":"label","type":"string"}]}"#;
    }

    fn registry() -> Arc<dyn SchemaRegistry> {
        Arc::new(InMemorySchemaRegistry::new())
    }

    #[test]
    fn subjects_follow_topic_name_strategy() {
        assert_eq!(SubjectRole::Key.subject("T"), "T-key");
        assert_eq!(SubjectRole::Value.subject("T"), "T-value");
    }

    #[tokio::test]
    async fn encoded_frames_decode_to_the_same_message() {
        let registry = registry();
        let config = BrokerConfig::default();
        let ser = AvroSerializer::<Reading>::new(registry.clone(), SubjectRole::Value, &config).unwrap();
        let de = AvroDeserializer::<Reading>::new(registry, SubjectRole::Value, &config).unwrap();

        let reading = Reading {
            id: 9,
            label: "Message 9".into(),
        };
        let bytes = ser.serialize("T", &reading).await.unwrap();
        assert_eq!(bytes[0], wire::MAGIC_BYTE);
        assert_eq!(de.deserialize("T", &bytes).await.unwrap(), reading);
    }

    #[tokio::test]
    async fn disabled_auto_register_fails_for_unknown_subject() {
        let config = BrokerConfig {
            auto_register_schemas: false,
            ..BrokerConfig::default()
        };
        let ser = AvroSerializer::<Key>::new(registry(), SubjectRole::Key, &config).unwrap();
        let err = ser
            .serialize("T", &Key { event_guid: "g".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, HeraldError::Serialization { .. }));
        assert!(err.to_string().contains("T-key"));
    }

    #[tokio::test]
    async fn disabled_auto_register_uses_existing_registration() {
        let registry = registry();
        registry.register("T-key", Key::SCHEMA).await.unwrap();
        let config = BrokerConfig {
            auto_register_schemas: false,
            ..BrokerConfig::default()
        };
        let ser = AvroSerializer::<Key>::new(registry, SubjectRole::Key, &config).unwrap();
        assert!(ser.serialize("T", &Key { event_guid: "g".into() }).await.is_ok());
    }

    #[tokio::test]
    async fn mismatched_schema_id_is_rejected() {
        let registry = registry();
        let config = BrokerConfig::default();
        // Another producer wrote the value subject with a different schema.
        let foreign = AvroSerializer::<Key>::new(registry.clone(), SubjectRole::Value, &config).unwrap();
        let bytes = foreign.serialize("T", &Key { event_guid: "g".into() }).await.unwrap();

        let de = AvroDeserializer::<Reading>::new(registry, SubjectRole::Value, &config).unwrap();
        let err = de.deserialize("T", &bytes).await.unwrap_err();
        assert!(err.to_string().contains("schema id"));
    }

    #[tokio::test]
    async fn garbage_bytes_fail_to_decode() {
        let de = AvroDeserializer::<Reading>::new(registry(), SubjectRole::Value, &BrokerConfig::default())
            .unwrap();
        assert!(de.deserialize("T", b"not avro").await.is_err());
    }
}
