// Copyright 2024 Resource Models Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Registry mapping resource types to model sources
//!
//! Lookups walk the [`MappableTypeHierarchy`] of a resource and stop at the
//! first type with matching sources. Every lookup result, including a miss,
//! is memoized until the registrations change, in a lookup cache bounded by
//! [`RegistryConfig::lookup_cache_capacity`]. A change clears the whole
//! lookup cache while the registrations are still write-locked, and lookups
//! populate the cache while holding the read lock, so no lookup can observe
//! a result computed from registrations older than the last completed write.

use super::hierarchy::MappableTypeHierarchy;
use super::key::{LookupKey, LookupQualifier};
use super::source::{ModelSource, ModuleId, ResolvedModelSource};
use crate::config::RegistryConfig;
use crate::resource::Resource;
use indexmap::{IndexMap, IndexSet};
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Result of a registry lookup: the matching sources, or `None`
pub type LookupResult = Option<Arc<[ResolvedModelSource]>>;

/// Maps resource types to the model sources registered for them
#[derive(Debug)]
pub struct ModelRegistry {
    type_mappings: RwLock<IndexMap<String, IndexSet<ModelSource>>>,
    /// `None` if memoization is disabled or has no capacity
    lookup_cache: Option<Mutex<LruCache<LookupKey, LookupResult>>>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with the given configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        let lookup_cache = NonZeroUsize::new(config.lookup_cache_capacity)
            .filter(|_| config.lookup_cache_enabled)
            .map(|capacity| Mutex::new(LruCache::new(capacity)));

        Self {
            type_mappings: RwLock::new(IndexMap::new()),
            lookup_cache,
        }
    }

    /// Register `source` for each of the given resource types
    pub fn add<I, S>(&self, resource_types: I, source: ModelSource)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut mappings = self.type_mappings.write();
        for resource_type in resource_types {
            mappings
                .entry(resource_type.into())
                .or_default()
                .insert(source.clone());
        }
        self.clear_memoized_lookups();
    }

    /// Remove every source contributed by `module`; returns the number of removed mappings
    pub fn remove_models_from(&self, module: &ModuleId) -> usize {
        let mut mappings = self.type_mappings.write();
        let mut removed = 0;
        for sources in mappings.values_mut() {
            let before = sources.len();
            sources.retain(|source| source.module() != module);
            removed += before - sources.len();
        }
        mappings.retain(|_, sources| !sources.is_empty());
        self.clear_memoized_lookups();
        removed
    }

    /// The models registered for the most specific type of the resource's hierarchy
    pub fn lookup_most_specific_models(&self, resource: &dyn Resource) -> LookupResult {
        self.lookup(resource, LookupQualifier::MostSpecific)
    }

    /// The most specific models assignable to `target_type`
    ///
    /// # Panics
    ///
    /// Panics if `target_type` is empty.
    pub fn lookup_most_specific_models_for_type(
        &self,
        resource: &dyn Resource,
        target_type: &str,
    ) -> LookupResult {
        assert!(!target_type.is_empty(), "The target type must not be empty");
        self.lookup(resource, LookupQualifier::TargetType(target_type.to_string()))
    }

    /// The most specific models named `model_name`
    ///
    /// # Panics
    ///
    /// Panics if `model_name` is empty.
    pub fn lookup_most_specific_models_with_name(
        &self,
        resource: &dyn Resource,
        model_name: &str,
    ) -> LookupResult {
        assert!(!model_name.is_empty(), "The model name must not be empty");
        self.lookup(resource, LookupQualifier::ModelName(model_name.to_string()))
    }

    /// The models registered for any type of the resource's hierarchy, most specific first
    pub fn lookup_all_models(&self, resource: &dyn Resource) -> LookupResult {
        self.lookup(resource, LookupQualifier::AllModels)
    }

    fn lookup(&self, resource: &dyn Resource, qualifier: LookupQualifier) -> LookupResult {
        let Some(lookup_cache) = &self.lookup_cache else {
            let hierarchy = MappableTypeHierarchy::of(resource);
            return resolve(&self.type_mappings.read(), &hierarchy, &qualifier);
        };

        let key = LookupKey::new(resource, qualifier);
        if let Some(cached) = lookup_cache.lock().get(&key) {
            return cached.clone();
        }

        // Resolved outside the cache lock, but under the registrations' read lock
        let hierarchy = MappableTypeHierarchy::of(resource);
        let mappings = self.type_mappings.read();
        let resolved = resolve(&mappings, &hierarchy, key.qualifier());
        lookup_cache.lock().put(key, resolved.clone());
        resolved
    }

    fn clear_memoized_lookups(&self) {
        if let Some(lookup_cache) = &self.lookup_cache {
            lookup_cache.lock().clear();
        }
    }

    /// Every registered source, in registration order
    pub fn model_sources(&self) -> Vec<ModelSource> {
        let mappings = self.type_mappings.read();
        let unique: IndexSet<&ModelSource> = mappings.values().flatten().collect();
        unique.into_iter().cloned().collect()
    }

    /// Every resource type to model mapping
    pub fn type_mappings(&self) -> Vec<TypeMappingView> {
        self.type_mappings
            .read()
            .iter()
            .flat_map(|(resource_type, sources)| {
                sources.iter().map(move |source| TypeMappingView {
                    resource_type: resource_type.clone(),
                    model_name: source.model_name().to_string(),
                    model_type: source.type_name().to_string(),
                    module: source.module().to_string(),
                })
            })
            .collect()
    }

    /// Every resource type to model mapping as JSON
    pub fn type_mappings_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.type_mappings())
    }

    /// Number of memoized lookups
    pub fn lookup_cache_size(&self) -> usize {
        self.lookup_cache
            .as_ref()
            .map_or(0, |lookup_cache| lookup_cache.lock().len())
    }

    /// Maximum number of memoized lookups, 0 if lookups are not memoized
    pub fn lookup_cache_capacity(&self) -> usize {
        self.lookup_cache
            .as_ref()
            .map_or(0, |lookup_cache| lookup_cache.lock().cap().get())
    }

    /// Drop all memoized lookups
    pub fn clear_lookup_caches(&self) {
        let _mappings = self.type_mappings.write();
        self.clear_memoized_lookups();
        log::debug!("Cleared the model registry lookup cache");
    }

    /// Remove all registrations and memoized lookups
    pub fn shutdown(&self) {
        let mut mappings = self.type_mappings.write();
        mappings.clear();
        self.clear_memoized_lookups();
        log::info!("Model registry shut down");
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve(
    mappings: &IndexMap<String, IndexSet<ModelSource>>,
    hierarchy: &MappableTypeHierarchy,
    qualifier: &LookupQualifier,
) -> LookupResult {
    let accepts = |source: &ModelSource| match qualifier {
        LookupQualifier::MostSpecific | LookupQualifier::AllModels => true,
        LookupQualifier::TargetType(target) => source.model_type().is_assignable_to(target),
        LookupQualifier::ModelName(name) => source.model_name() == name,
    };

    let mut resolved = Vec::new();
    for resource_type in hierarchy.iter() {
        let Some(sources) = mappings.get(resource_type) else {
            continue;
        };
        resolved.extend(
            sources
                .iter()
                .filter(|source| accepts(*source))
                .map(|source| ResolvedModelSource::new(source.clone(), resource_type)),
        );
        if !resolved.is_empty() && *qualifier != LookupQualifier::AllModels {
            break;
        }
    }

    if resolved.is_empty() {
        None
    } else {
        Some(resolved.into())
    }
}

/// A resource type to model mapping as shown to operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMappingView {
    /// Resource type
    pub resource_type: String,
    /// Model name
    pub model_name: String,
    /// Model type name
    pub model_type: String,
    /// Contributing module
    pub module: String,
}
