// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A schema registry that cannot be reached.

use async_trait::async_trait;
use herald_core::{HeraldError, RegisteredSchema, SchemaRegistry};

/// Fails every request the way a registry behind a dead endpoint would.
#[derive(Debug, Default, Clone)]
pub struct UnreachableSchemaRegistry;

impl UnreachableSchemaRegistry {
    pub fn new() -> Self {
        Self
    }

    fn refused() -> HeraldError {
        HeraldError::SchemaRegistry {
            message: "request to http://registry.invalid failed".to_string(),
            source: Some(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
        }
    }
}

#[async_trait]
impl SchemaRegistry for UnreachableSchemaRegistry {
    async fn register(&self, _subject: &str, _schema: &str) -> Result<i32, HeraldError> {
        Err(Self::refused())
    }

    async fn lookup(
        &self,
        _subject: &str,
        _schema: &str,
    ) -> Result<Option<RegisteredSchema>, HeraldError> {
        Err(Self::refused())
    }

    async fn schema_by_id(&self, _id: i32) -> Result<String, HeraldError> {
        Err(Self::refused())
    }
}
