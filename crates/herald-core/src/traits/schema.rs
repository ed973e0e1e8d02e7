// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema registry trait.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::RegisteredSchema;

/// A service assigning stable ids to schemas, scoped by subject.
#[async_trait]
pub trait SchemaRegistry: Send + Sync + 'static {
    /// Registers `schema` under `subject` and returns its id. Registering an
    /// already known schema returns the existing id.
    async fn register(&self, subject: &str, schema: &str) -> Result<i32, HeraldError>;

    /// Looks up `schema` under `subject` without registering it.
    async fn lookup(
        &self,
        subject: &str,
        schema: &str,
    ) -> Result<Option<RegisteredSchema>, HeraldError>;

    /// Fetches the schema text registered under `id`.
    async fn schema_by_id(&self, id: i32) -> Result<String, HeraldError>;
}
