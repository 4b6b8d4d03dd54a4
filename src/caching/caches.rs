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

//! Facade over the pluggable result cache backends
//!
//! Caching is optional: without backends every lookup misses and every store
//! is a no-op. A failing backend is logged and skipped.

use super::key::CacheKey;
use crate::error::Result;
use crate::metadata::ModelMetadataRegistrar;
use crate::model::ResourceModel;
use crate::registry::ModelSource;
use crate::resource::Resource;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A result cache backend
///
/// Backends are called concurrently from many threads and own their
/// invalidation policy.
pub trait ResourceModelCache: Send + Sync {
    /// Name used in log messages
    fn name(&self) -> &str;

    /// The model cached under `key`
    fn get(&self, key: &CacheKey) -> Result<Option<Arc<dyn ResourceModel>>>;

    /// Cache `model`, the mapping result of `resource`, under `key`
    fn put(&self, resource: &dyn Resource, model: Arc<dyn ResourceModel>, key: CacheKey) -> Result<()>;
}

/// Aggregates every bound [`ResourceModelCache`]
pub struct ResourceModelCaches {
    caches: RwLock<Vec<Arc<dyn ResourceModelCache>>>,
    metadata: Arc<ModelMetadataRegistrar>,
}

impl ResourceModelCaches {
    /// Create a facade without backends
    pub fn new(metadata: Arc<ModelMetadataRegistrar>) -> Self {
        Self {
            caches: RwLock::new(Vec::new()),
            metadata,
        }
    }

    /// Add a backend; backends are consulted in binding order
    pub fn bind(&self, cache: Arc<dyn ResourceModelCache>) {
        log::debug!("Binding resource model cache {}", cache.name());
        self.caches.write().push(cache);
    }

    /// Remove a backend; returns whether it was bound
    pub fn unbind(&self, cache: &Arc<dyn ResourceModelCache>) -> bool {
        let mut caches = self.caches.write();
        let before = caches.len();
        caches.retain(|bound| !Arc::ptr_eq(bound, cache));
        before != caches.len()
    }

    /// Number of bound backends
    pub fn len(&self) -> usize {
        self.caches.read().len()
    }

    /// Whether no backend is bound
    pub fn is_empty(&self) -> bool {
        self.caches.read().is_empty()
    }

    /// The cached result of mapping `resource` onto the model of `source`
    ///
    /// Returns the first hit in binding order and counts it as a cache hit of
    /// the model type.
    pub fn lookup(
        &self,
        resource: &dyn Resource,
        source: &ModelSource,
    ) -> Option<Arc<dyn ResourceModel>> {
        let caches = self.snapshot();
        if caches.is_empty() {
            return None;
        }

        let key = CacheKey::new(resource, source);
        for cache in caches {
            match cache.get(&key) {
                Ok(Some(model)) => {
                    log::trace!("Cache {} hit for {key}", cache.name());
                    if let Some(metadata) = self.metadata.get(source.type_name()) {
                        metadata.statistics().count_cache_hit();
                    }
                    return Some(model);
                }
                Ok(None) => {}
                Err(error) => {
                    log::warn!("Skipping cache {} on lookup of {key}: {error}", cache.name());
                }
            }
        }
        None
    }

    /// Store the result of mapping `resource` onto the model of `source` in every backend
    pub fn store(&self, resource: &dyn Resource, source: &ModelSource, model: &Arc<dyn ResourceModel>) {
        let caches = self.snapshot();
        if caches.is_empty() {
            return;
        }

        let key = CacheKey::new(resource, source);
        for cache in caches {
            if let Err(error) = cache.put(resource, Arc::clone(model), key.clone()) {
                log::warn!("Skipping cache {} on store of {key}: {error}", cache.name());
            }
        }
    }

    // Backends may be unbound while a lookup iterates
    fn snapshot(&self) -> Vec<Arc<dyn ResourceModelCache>> {
        self.caches.read().clone()
    }
}

impl fmt::Debug for ResourceModelCaches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .caches
            .read()
            .iter()
            .map(|cache| cache.name().to_string())
            .collect();
        f.debug_struct("ResourceModelCaches")
            .field("caches", &names)
            .finish_non_exhaustive()
    }
}
