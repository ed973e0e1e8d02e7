// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local schema registry.

use std::collections::HashMap;

use async_trait::async_trait;
use herald_core::{HeraldError, RegisteredSchema, SchemaRegistry};
use tokio::sync::Mutex;
use tracing::debug;

/// A schema registry living inside the host process.
///
/// Ids are assigned sequentially from 1 and are global: the same canonical
/// schema registered under two subjects shares one id, as a Confluent
/// registry would. Versions count per subject.
#[derive(Debug, Default)]
pub struct InMemorySchemaRegistry {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i32,
    ids_by_canonical: HashMap<String, i32>,
    schemas_by_id: HashMap<i32, String>,
    subjects: HashMap<String, Vec<RegisteredSchema>>,
}

impl InMemorySchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subjects with at least one registered version, sorted.
    pub async fn subjects(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut subjects: Vec<String> = state.subjects.keys().cloned().collect();
        subjects.sort();
        subjects
    }
}

fn canonicalize(schema: &str) -> Result<String, HeraldError> {
    apache_avro::Schema::parse_str(schema)
        .map(|parsed| parsed.canonical_form())
        .map_err(|e| HeraldError::SchemaRegistry {
            message: "invalid Avro schema".to_string(),
            source: Some(Box::new(e)),
        })
}

#[async_trait]
impl SchemaRegistry for InMemorySchemaRegistry {
    async fn register(&self, subject: &str, schema: &str) -> Result<i32, HeraldError> {
        let canonical = canonicalize(schema)?;
        let mut state = self.state.lock().await;

        if let Some(existing) = state
            .subjects
            .get(subject)
            .and_then(|versions| versions.iter().find(|s| s.schema == canonical))
        {
            return Ok(existing.id);
        }

        let id = match state.ids_by_canonical.get(&canonical) {
            Some(id) => *id,
            None => {
                state.next_id += 1;
                let id = state.next_id;
                state.ids_by_canonical.insert(canonical.clone(), id);
                state.schemas_by_id.insert(id, canonical.clone());
                id
            }
        };

        let versions = state.subjects.entry(subject.to_string()).or_default();
        let version = versions.len() as i32 + 1;
        versions.push(RegisteredSchema {
            id,
            subject: subject.to_string(),
            version,
            schema: canonical,
        });
        debug!(subject, id, version, "schema registered");
        Ok(id)
    }

    async fn lookup(
        &self,
        subject: &str,
        schema: &str,
    ) -> Result<Option<RegisteredSchema>, HeraldError> {
        let canonical = canonicalize(schema)?;
        let state = self.state.lock().await;
        Ok(state
            .subjects
            .get(subject)
            .and_then(|versions| versions.iter().find(|s| s.schema == canonical))
            .cloned())
    }

    async fn schema_by_id(&self, id: i32) -> Result<String, HeraldError> {
        let state = self.state.lock().await;
        state
            .schemas_by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| HeraldError::schema_registry(format!("schema {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = r#"{"type":"record","name":"EventKey","fields":[{"name":"eventGuid","type":"string"}]}"#;
    const OTHER: &str = r#"{"type":"record","name":"Other","fields":[{"name":"n","type":"long"}]}"#;

    #[tokio::test]
    async fn register_is_idempotent_per_canonical_schema() {
        let registry = InMemorySchemaRegistry::new();
        let first = registry.register("t-key", KEY).await.unwrap();
        // Whitespace differences canonicalize to the same schema.
        let spaced = KEY.replace(',', ", ");
        let second = registry.register("t-key", &spaced).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, 1);
    }

    #[tokio::test]
    async fn ids_are_sequential_and_shared_across_subjects() {
        let registry = InMemorySchemaRegistry::new();
        let key_a = registry.register("a-key", KEY).await.unwrap();
        let other = registry.register("a-value", OTHER).await.unwrap();
        let key_b = registry.register("b-key", KEY).await.unwrap();
        assert_eq!((key_a, other, key_b), (1, 2, 1));
        assert_eq!(registry.subjects().await, vec!["a-key", "a-value", "b-key"]);
    }

    #[tokio::test]
    async fn versions_count_per_subject() {
        let registry = InMemorySchemaRegistry::new();
        registry.register("s", KEY).await.unwrap();
        registry.register("s", OTHER).await.unwrap();
        let found = registry.lookup("s", OTHER).await.unwrap().unwrap();
        assert_eq!(found.version, 2);
        assert_eq!(found.id, 2);
    }

    #[tokio::test]
    async fn lookup_misses_unregistered_subject() {
        let registry = InMemorySchemaRegistry::new();
        registry.register("a-key", KEY).await.unwrap();
        assert!(registry.lookup("b-key", KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn schema_by_id_returns_canonical_text() {
        let registry = InMemorySchemaRegistry::new();
        let id = registry.register("a-key", KEY).await.unwrap();
        let text = registry.schema_by_id(id).await.unwrap();
        assert!(text.contains("EventKey"));
        assert!(registry.schema_by_id(99).await.is_err());
    }

    #[tokio::test]
    async fn invalid_schema_is_rejected() {
        let registry = InMemorySchemaRegistry::new();
        let err = registry.register("x", "{not json").await.unwrap_err();
        assert!(matches!(err, HeraldError::SchemaRegistry { .. }));
    }
}
