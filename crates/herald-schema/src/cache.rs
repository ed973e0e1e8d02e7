// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded schema lookup cache shared by every serializer in the process.

use std::sync::Arc;

use async_trait::async_trait;
use herald_core::{HeraldError, RegisteredSchema, SchemaRegistry};
use moka::future::Cache;
use tracing::trace;

type SubjectSchema = (String, String);

/// Wraps a registry client with bounded caches for registrations, lookups
/// and id resolution.
///
/// First use of a key runs the inner request once even under concurrent
/// callers; every other caller waits for that result.
pub struct CachedSchemaRegistry {
    inner: Arc<dyn SchemaRegistry>,
    registered: Cache<SubjectSchema, i32>,
    found: Cache<SubjectSchema, RegisteredSchema>,
    by_id: Cache<i32, String>,
}

impl CachedSchemaRegistry {
    /// Creates a cache holding at most `max_cached_schemas` entries per kind.
    pub fn new(inner: Arc<dyn SchemaRegistry>, max_cached_schemas: u64) -> Self {
        let capacity = max_cached_schemas.max(1);
        Self {
            inner,
            registered: Cache::builder().max_capacity(capacity).build(),
            found: Cache::builder().max_capacity(capacity).build(),
            by_id: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Number of cached registrations after pending evictions are applied.
    pub async fn cached_registrations(&self) -> u64 {
        self.registered.run_pending_tasks().await;
        self.registered.entry_count()
    }
}

impl std::fmt::Debug for CachedSchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSchemaRegistry")
            .field("registered", &self.registered.entry_count())
            .field("by_id", &self.by_id.entry_count())
            .finish_non_exhaustive()
    }
}

fn shared_failure(err: Arc<HeraldError>) -> HeraldError {
    HeraldError::SchemaRegistry {
        message: "registry request failed".to_string(),
        source: Some(Box::new(err)),
    }
}

#[async_trait]
impl SchemaRegistry for CachedSchemaRegistry {
    async fn register(&self, subject: &str, schema: &str) -> Result<i32, HeraldError> {
        let key = (subject.to_string(), schema.to_string());
        self.registered
            .try_get_with(key, async {
                trace!(subject, "schema cache miss");
                self.inner.register(subject, schema).await
            })
            .await
            .map_err(shared_failure)
    }

    async fn lookup(
        &self,
        subject: &str,
        schema: &str,
    ) -> Result<Option<RegisteredSchema>, HeraldError> {
        let key = (subject.to_string(), schema.to_string());
        if let Some(hit) = self.found.get(&key).await {
            return Ok(Some(hit));
        }

        // Misses are not cached so a later registration becomes visible.
        let result = self.inner.lookup(subject, schema).await?;
        if let Some(found) = &result {
            self.found.insert(key, found.clone()).await;
            self.by_id.insert(found.id, found.schema.clone()).await;
        }
        Ok(result)
    }

    async fn schema_by_id(&self, id: i32) -> Result<String, HeraldError> {
        self.by_id
            .try_get_with(id, self.inner.schema_by_id(id))
            .await
            .map_err(shared_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySchemaRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingRegistry {
        inner: InMemorySchemaRegistry,
        registers: AtomicUsize,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl SchemaRegistry for CountingRegistry {
        async fn register(&self, subject: &str, schema: &str) -> Result<i32, HeraldError> {
            self.registers.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.inner.register(subject, schema).await
        }

        async fn lookup(
            &self,
            subject: &str,
            schema: &str,
        ) -> Result<Option<RegisteredSchema>, HeraldError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup(subject, schema).await
        }

        async fn schema_by_id(&self, id: i32) -> Result<String, HeraldError> {
            self.inner.schema_by_id(id).await
        }
    }

    fn schema(n: usize) -> String {
        format!(r#"{{"type":"record","name":"R{n}","fields":[{{"name":"f","type":"int"}}]}}"#)
    }

    #[tokio::test]
    async fn repeated_registration_hits_inner_once() {
        let counting = Arc::new(CountingRegistry::default());
        let cache = CachedSchemaRegistry::new(counting.clone(), 10);

        for _ in 0..5 {
            assert_eq!(cache.register("s", &schema(0)).await.unwrap(), 1);
        }
        assert_eq!(counting.registers.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_use_registers_once() {
        let counting = Arc::new(CountingRegistry::default());
        let cache = Arc::new(CachedSchemaRegistry::new(counting.clone(), 10));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.register("s", &schema(0)).await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), 1);
        }
        assert_eq!(counting.registers.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cache_stays_bounded() {
        let counting = Arc::new(CountingRegistry::default());
        let cache = CachedSchemaRegistry::new(counting, 10);

        for n in 0..40 {
            cache.register(&format!("s{n}"), &schema(n)).await.unwrap();
        }
        assert!(cache.cached_registrations().await <= 10);
    }

    #[tokio::test]
    async fn lookup_miss_is_not_cached() {
        let counting = Arc::new(CountingRegistry::default());
        let cache = CachedSchemaRegistry::new(counting.clone(), 10);

        assert!(cache.lookup("s", &schema(0)).await.unwrap().is_none());
        counting.inner.register("s", &schema(0)).await.unwrap();
        assert!(cache.lookup("s", &schema(0)).await.unwrap().is_some());
        assert!(cache.lookup("s", &schema(0)).await.unwrap().is_some());
        assert_eq!(counting.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn inner_errors_are_wrapped() {
        let counting = Arc::new(CountingRegistry::default());
        let cache = CachedSchemaRegistry::new(counting, 10);

        let err = cache.schema_by_id(42).await.unwrap_err();
        assert!(matches!(err, HeraldError::SchemaRegistry { .. }));
        assert!(err.detail().contains("schema 42 not found"));
    }
}
