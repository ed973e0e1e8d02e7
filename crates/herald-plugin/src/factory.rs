// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compiled-in factory table that plugin manifests select from.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use herald_core::{HeraldError, PublisherHandle};

use crate::manifest::PluginManifest;

/// Builds a publisher for a manifest that names this factory.
pub trait PublisherFactory: Send + Sync {
    /// Create a publisher. `deps` holds exactly the services the manifest
    /// listed under `requires`.
    fn create(
        &self,
        manifest: &PluginManifest,
        deps: &Dependencies,
    ) -> Result<PublisherHandle, HeraldError>;
}

type Service = Arc<dyn Any + Send + Sync>;

/// Helper services resolved for one manifest.
#[derive(Clone, Default)]
pub struct Dependencies {
    services: HashMap<String, Service>,
}

impl Dependencies {
    /// The service registered under `key`, if it has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.services.get(key)?.clone().downcast::<T>().ok()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.services.keys().collect();
        keys.sort();
        f.debug_struct("Dependencies").field("keys", &keys).finish()
    }
}

/// Maps factory keys to publisher factories and helper keys to services.
#[derive(Clone, Default)]
pub struct FactoryTable {
    factories: BTreeMap<String, Arc<dyn PublisherFactory>>,
    services: HashMap<String, Service>,
}

impl FactoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a publisher factory under `key`, replacing any previous one.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        factory: impl PublisherFactory + 'static,
    ) -> &mut Self {
        self.factories.insert(key.into(), Arc::new(factory));
        self
    }

    /// Register a helper service that manifests may require by `key`.
    pub fn provide<T: Any + Send + Sync>(&mut self, key: impl Into<String>, service: T) -> &mut Self {
        self.services.insert(key.into(), Arc::new(service));
        self
    }

    pub fn factory(&self, key: &str) -> Option<&Arc<dyn PublisherFactory>> {
        self.factories.get(key)
    }

    /// Registered factory keys, sorted.
    pub fn factory_keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Resolve `requires` into a dependency bag. Fails with the first key
    /// that has no service behind it.
    pub fn resolve(&self, requires: &[String]) -> Result<Dependencies, String> {
        let mut services = HashMap::with_capacity(requires.len());
        for key in requires {
            let service = self
                .services
                .get(key)
                .ok_or_else(|| format!("unresolved dependency '{key}'"))?;
            services.insert(key.clone(), service.clone());
        }
        Ok(Dependencies { services })
    }
}

impl std::fmt::Debug for FactoryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut services: Vec<&String> = self.services.keys().collect();
        services.sort();
        f.debug_struct("FactoryTable")
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("services", &services)
            .finish()
    }
}
