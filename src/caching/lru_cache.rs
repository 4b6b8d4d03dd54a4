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

//! Bounded in-memory result cache
//!
//! Evicts the least recently used model once the capacity is reached.

use super::caches::ResourceModelCache;
use super::key::CacheKey;
use crate::config::ResultCacheConfig;
use crate::error::Result;
use crate::model::ResourceModel;
use crate::resource::Resource;
use lru::LruCache;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Hit and miss counts of an [`LruModelCache`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
}

impl CacheStats {
    /// Hit ratio as percentage
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Reset all statistics to zero
    pub fn reset(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }
}

/// Thread-safe LRU result cache
pub struct LruModelCache {
    name: String,
    cache: RwLock<LruCache<CacheKey, Arc<dyn ResourceModel>>>,
    stats: RwLock<CacheStats>,
}

impl LruModelCache {
    /// Create a cache with the given configuration
    ///
    /// # Panics
    ///
    /// Panics if the configured capacity is 0.
    pub fn new(config: ResultCacheConfig) -> Self {
        Self::named("lru", config)
    }

    /// Create a cache with a name used in log messages
    ///
    /// # Panics
    ///
    /// Panics if the configured capacity is 0.
    pub fn named(name: impl Into<String>, config: ResultCacheConfig) -> Self {
        let Some(capacity) = NonZeroUsize::new(config.capacity) else {
            panic!("Cache capacity must be greater than 0");
        };

        Self {
            name: name.into(),
            cache: RwLock::new(LruCache::new(capacity)),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Whether a key is cached, without updating the LRU order
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.read().contains(key)
    }

    /// Remove a cached model
    pub fn remove(&self, key: &CacheKey) -> Option<Arc<dyn ResourceModel>> {
        self.cache.write().pop(key)
    }

    /// Remove every cached model and reset the statistics
    pub fn clear(&self) {
        self.cache.write().clear();
        self.stats.write().reset();
    }

    /// Number of cached models
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached models
    pub fn capacity(&self) -> usize {
        self.cache.read().cap().get()
    }

    /// Current statistics
    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }
}

impl Default for LruModelCache {
    fn default() -> Self {
        Self::new(ResultCacheConfig::default())
    }
}

impl std::fmt::Debug for LruModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruModelCache")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl ResourceModelCache for LruModelCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &CacheKey) -> Result<Option<Arc<dyn ResourceModel>>> {
        let mut cache = self.cache.write();
        let mut stats = self.stats.write();

        match cache.get(key) {
            Some(model) => {
                stats.hits += 1;
                Ok(Some(Arc::clone(model)))
            }
            None => {
                stats.misses += 1;
                Ok(None)
            }
        }
    }

    fn put(&self, _resource: &dyn Resource, model: Arc<dyn ResourceModel>, key: CacheKey) -> Result<()> {
        self.cache.write().put(key, model);
        Ok(())
    }
}
