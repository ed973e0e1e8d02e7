// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Enrichment hook run between building and publishing an event.

use std::sync::Arc;

use async_trait::async_trait;
use herald_core::HeraldError;
use rand::Rng;

/// Colour every draft starts with.
pub const DEFAULT_COLOR: &str = "green";

/// Event fields before they are fixed into a typed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub id: i64,
    pub name: String,
    pub favorite_number: i32,
    pub favorite_color: String,
}

impl EventDraft {
    /// Draft for `event_id` named after the payload, with a random number in
    /// `1..100` and the default colour.
    pub fn new(event_id: i64, payload: &str) -> Self {
        Self {
            id: event_id,
            name: payload.to_string(),
            favorite_number: rand::thread_rng().gen_range(1..100),
            favorite_color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// Adds data to an event before it is published, e.g. from a database.
///
/// An error fails the publish; it is reported in the publish result like any
/// other failure.
#[async_trait]
pub trait Enricher: Send + Sync + 'static {
    async fn enrich(&self, draft: EventDraft) -> Result<EventDraft, HeraldError>;
}

pub type EnricherHandle = Arc<dyn Enricher>;

/// Leaves drafts untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

#[async_trait]
impl Enricher for PassThrough {
    async fn enrich(&self, draft: EventDraft) -> Result<EventDraft, HeraldError> {
        Ok(draft)
    }
}
