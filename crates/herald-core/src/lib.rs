// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Herald event routing framework.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Herald workspace. Publisher plugins,
//! broker transports and schema registries all implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{BoxError, HeraldError};
pub use types::{
    BrokerConfig, Capability, Completion, ConsumedRecord, EventRecord, MessageEnvelope,
    PublishFailure, PublishResult, RawRecord, RegisteredSchema,
};

pub use traits::{
    BrokerTransport, EventPublisher, PublisherContext, PublisherHandle, SchemaRegistry,
    Subscription,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn herald_error_has_all_variants() {
        let _config = HeraldError::Config("test".into());
        let _discovery = HeraldError::Discovery {
            path: "/plugins".into(),
            message: "missing".into(),
        };
        let _load = HeraldError::PluginLoad {
            reason: "bad manifest".into(),
        };
        let _not_found = HeraldError::PublisherNotFound {
            name: "EventTypeZ".into(),
        };
        let _ambiguous = HeraldError::AmbiguousPublisher {
            name: "EventTypeA".into(),
            count: 2,
        };
        let _ser = HeraldError::serialization("bad datum");
        let _registry = HeraldError::schema_registry("unreachable");
        let _broker = HeraldError::broker("down");
        let _timeout = HeraldError::Timeout {
            duration: std::time::Duration::from_secs(5),
        };
        let _internal = HeraldError::Internal("test".into());
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_publisher<T: EventPublisher>() {}
        fn _assert_transport<T: BrokerTransport>() {}
        fn _assert_subscription<T: Subscription>() {}
        fn _assert_registry<T: SchemaRegistry>() {}
    }

    #[test]
    fn handles_are_object_safe() {
        fn _publisher(_: &PublisherHandle) {}
        fn _transport(_: &std::sync::Arc<dyn BrokerTransport>) {}
        fn _subscription(_: &Box<dyn Subscription>) {}
        fn _registry(_: &std::sync::Arc<dyn SchemaRegistry>) {}
    }
}
