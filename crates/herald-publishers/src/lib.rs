// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in event publishers for Herald.
//!
//! Each publisher turns an `(event_id, payload)` pair into an [`EventKey`]
//! and a typed body, runs the body through an [`Enricher`], and produces the
//! pair through the Avro codec. [`builtin_factories`] returns the factory
//! table the host loads the publishers from.

pub mod enrich;
pub mod factory;
pub mod greeting;
pub mod messages;
pub mod publisher;

use std::sync::Arc;

use herald_plugin::FactoryTable;

pub use enrich::{Enricher, EnricherHandle, EventDraft, PassThrough};
pub use factory::EventFactory;
pub use greeting::{GREETING_KEY, Greeting};
pub use messages::{EventBody, EventKey, EventTypeABody, EventTypeBBody, EventTypeCBody};
pub use publisher::SchemaPublisher;

/// Factory key of the EventTypeA publisher.
pub const EVENT_TYPE_A_FACTORY: &str = "event-type-a";
/// Factory key of the EventTypeB publisher.
pub const EVENT_TYPE_B_FACTORY: &str = "event-type-b";
/// Factory key of the EventTypeC publisher.
pub const EVENT_TYPE_C_FACTORY: &str = "event-type-c";

/// Factory table for the built-in publishers with pass-through enrichment.
pub fn builtin_factories() -> FactoryTable {
    builtin_factories_with(Arc::new(PassThrough))
}

/// Factory table for the built-in publishers, enriching every event with
/// `enricher`.
pub fn builtin_factories_with(enricher: EnricherHandle) -> FactoryTable {
    let mut table = FactoryTable::new();
    table
        .register(
            EVENT_TYPE_A_FACTORY,
            EventFactory::<EventTypeABody>::new(enricher.clone()).with_greeting(),
        )
        .register(
            EVENT_TYPE_B_FACTORY,
            EventFactory::<EventTypeBBody>::new(enricher.clone()),
        )
        .register(EVENT_TYPE_C_FACTORY, EventFactory::<EventTypeCBody>::new(enricher))
        .provide(GREETING_KEY, Greeting::new("greeting-helper"));
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_plugin::PluginRegistry;

    #[test]
    fn builtin_table_loads_whole_catalog() {
        let report = PluginRegistry::from_catalog(&builtin_factories());
        assert!(report.failures.is_empty(), "{:?}", report.failures);

        let channels: Vec<(&str, &str)> = report
            .registry
            .descriptors()
            .iter()
            .map(|d| (d.name.as_str(), d.publisher.channel()))
            .collect();
        assert_eq!(
            channels,
            vec![
                ("EventTypeA", "EVENT_TYPE_A_TOPIC"),
                ("EventTypeB", "EVENT_TYPE_B_TOPIC"),
                ("EventTypeC", "EVENT_TYPE_C_TOPIC"),
            ]
        );
    }

    #[test]
    fn factory_keys_are_sorted() {
        let table = builtin_factories();
        let keys: Vec<&str> = table.factory_keys().collect();
        assert_eq!(
            keys,
            vec![EVENT_TYPE_A_FACTORY, EVENT_TYPE_B_FACTORY, EVENT_TYPE_C_FACTORY]
        );
    }
}
