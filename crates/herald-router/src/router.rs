// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Name-based publisher resolution over a registry snapshot.

use std::sync::Arc;

use herald_core::{HeraldError, PublisherHandle};
use herald_plugin::PluginRegistry;
use tracing::trace;

/// Result of resolving one dispatch name.
#[derive(Clone)]
pub enum Resolution {
    /// Exactly one publisher answers to the name.
    Found(PublisherHandle),
    NotFound,
    /// More than one publisher answers to the name; none is chosen.
    Ambiguous { count: usize },
}

impl Resolution {
    /// Converts to a `Result`, naming `name` in the error.
    pub fn into_result(self, name: &str) -> Result<PublisherHandle, HeraldError> {
        match self {
            Resolution::Found(publisher) => Ok(publisher),
            Resolution::NotFound => Err(HeraldError::PublisherNotFound {
                name: name.to_string(),
            }),
            Resolution::Ambiguous { count } => Err(HeraldError::AmbiguousPublisher {
                name: name.to_string(),
                count,
            }),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Found(publisher) => f.debug_tuple("Found").field(&publisher.name()).finish(),
            Resolution::NotFound => write!(f, "NotFound"),
            Resolution::Ambiguous { count } => {
                f.debug_struct("Ambiguous").field("count", count).finish()
            }
        }
    }
}

/// Resolves dispatch names against a shared registry snapshot.
///
/// Cloning the router is cheap and every clone sees the same snapshot.
#[derive(Debug, Clone)]
pub struct EventRouter {
    registry: Arc<PluginRegistry>,
}

impl EventRouter {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve `name` by exact, case-sensitive match.
    pub fn resolve(&self, name: &str) -> Resolution {
        let mut matches = self.registry.matching(name);
        let resolution = match (matches.next(), matches.next()) {
            (None, _) => Resolution::NotFound,
            (Some(descriptor), None) => Resolution::Found(descriptor.publisher.clone()),
            (Some(_), Some(_)) => Resolution::Ambiguous {
                count: 2 + matches.count(),
            },
        };
        trace!(name, ?resolution, "resolved");
        resolution
    }

    /// Distinct dispatch names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.registry
            .name_counts()
            .into_keys()
            .map(str::to_string)
            .collect()
    }

    /// Names registered more than once, with their descriptor counts.
    pub fn duplicates(&self) -> Vec<(String, usize)> {
        self.registry
            .name_counts()
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, count)| (name.to_string(), count))
            .collect()
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use herald_core::{EventPublisher, PublishResult, PublisherContext};
    use herald_plugin::{PluginDescriptor, PluginManifest, PluginSource};

    struct Named(String);

    #[async_trait]
    impl EventPublisher for Named {
        fn name(&self) -> &str {
            &self.0
        }

        fn channel(&self) -> &str {
            "T"
        }

        fn inject_config(&self, _ctx: PublisherContext) -> Result<(), HeraldError> {
            Ok(())
        }

        async fn publish(&self, _event_id: i64, _payload: &str) -> PublishResult {
            unreachable!("router tests never publish")
        }
    }

    fn descriptor(name: &str) -> PluginDescriptor {
        PluginDescriptor {
            name: name.to_string(),
            manifest: PluginManifest {
                name: name.to_string(),
                version: semver::Version::new(0, 1, 0),
                description: String::new(),
                capability: "EventPublisher".to_string(),
                factory: "named".to_string(),
                channel: None,
                requires: Vec::new(),
                min_herald_version: None,
            },
            source: PluginSource::Builtin,
            publisher: Arc::new(Named(name.to_string())),
        }
    }

    fn router(names: &[&str]) -> EventRouter {
        let descriptors = names.iter().map(|n| descriptor(n)).collect();
        EventRouter::new(Arc::new(PluginRegistry::from_descriptors(descriptors)))
    }

    #[test]
    fn single_match_is_found() {
        let router = router(&["EventTypeA", "EventTypeB"]);
        match router.resolve("EventTypeB") {
            Resolution::Found(publisher) => assert_eq!(publisher.name(), "EventTypeB"),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn missing_name_is_not_found() {
        let router = router(&["EventTypeA"]);
        assert!(matches!(router.resolve("EventTypeZ"), Resolution::NotFound));
        let Err(err) = router.resolve("EventTypeZ").into_result("EventTypeZ") else {
            panic!("expected PublisherNotFound");
        };
        assert!(matches!(err, HeraldError::PublisherNotFound { name } if name == "EventTypeZ"));
    }

    #[test]
    fn match_is_case_sensitive() {
        let router = router(&["EventTypeA"]);
        assert!(matches!(router.resolve("eventtypea"), Resolution::NotFound));
    }

    #[test]
    fn duplicates_are_ambiguous_with_count() {
        let router = router(&["EventTypeA", "EventTypeA", "EventTypeA", "EventTypeB"]);
        assert!(matches!(
            router.resolve("EventTypeA"),
            Resolution::Ambiguous { count: 3 }
        ));
        let Err(err) = router.resolve("EventTypeA").into_result("EventTypeA") else {
            panic!("expected AmbiguousPublisher");
        };
        assert!(matches!(err, HeraldError::AmbiguousPublisher { count: 3, .. }));
        assert_eq!(router.duplicates(), vec![("EventTypeA".to_string(), 3)]);
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        let router = router(&[]);
        assert!(!router.resolve("EventTypeA").is_found());
        assert!(router.names().is_empty());
    }

    #[test]
    fn names_are_distinct_and_sorted() {
        let router = router(&["EventTypeC", "EventTypeA", "EventTypeC"]);
        assert_eq!(router.names(), vec!["EventTypeA", "EventTypeC"]);
    }

    #[test]
    fn concurrent_resolution_sees_the_same_snapshot() {
        let router = router(&["EventTypeA", "EventTypeB"]);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let router = router.clone();
                std::thread::spawn(move || router.resolve("EventTypeB").is_found())
            })
            .collect();
        assert!(handles.into_iter().all(|h| h.join().unwrap()));
    }
}
