// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publisher factories registered in the built-in factory table.

use std::marker::PhantomData;
use std::sync::Arc;

use herald_core::{HeraldError, PublisherHandle};
use herald_plugin::{Dependencies, PluginManifest, PublisherFactory};

use crate::enrich::EnricherHandle;
use crate::greeting::{GREETING_KEY, Greeting};
use crate::messages::EventBody;
use crate::publisher::SchemaPublisher;

/// Builds a [`SchemaPublisher`] for body type `V`.
///
/// The publisher is named after the manifest and writes to the manifest's
/// channel, or to `V::DEFAULT_CHANNEL` when none is given.
pub struct EventFactory<V> {
    enricher: EnricherHandle,
    greeting: bool,
    _body: PhantomData<fn() -> V>,
}

impl<V: EventBody> EventFactory<V> {
    pub fn new(enricher: EnricherHandle) -> Self {
        Self {
            enricher,
            greeting: false,
            _body: PhantomData,
        }
    }

    /// Require the [`Greeting`] helper; creation fails without it.
    pub fn with_greeting(mut self) -> Self {
        self.greeting = true;
        self
    }
}

impl<V: EventBody> PublisherFactory for EventFactory<V> {
    fn create(
        &self,
        manifest: &PluginManifest,
        deps: &Dependencies,
    ) -> Result<PublisherHandle, HeraldError> {
        let channel = manifest
            .channel
            .clone()
            .unwrap_or_else(|| V::DEFAULT_CHANNEL.to_string());
        let mut publisher = SchemaPublisher::<V>::new(&manifest.name, channel, self.enricher.clone());

        if self.greeting {
            let greeting = deps
                .get::<Greeting>(GREETING_KEY)
                .ok_or_else(|| HeraldError::PluginLoad {
                    reason: format!("{} requires the `{GREETING_KEY}` helper", manifest.name),
                })?;
            publisher = publisher.with_greeting(greeting);
        }

        Ok(Arc::new(publisher))
    }
}
