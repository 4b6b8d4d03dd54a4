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

//! Configuration options for the registry, the mapper and the built-in result cache

/// Configuration of the [`ModelRegistry`](crate::registry::ModelRegistry)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Whether lookups are memoized until the next registration change
    pub lookup_cache_enabled: bool,

    /// Maximum number of memoized lookups; least recently used ones are evicted
    pub lookup_cache_capacity: usize,
}

impl RegistryConfig {
    /// Memoize at most `capacity` lookups
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lookup_cache_enabled: true,
            lookup_cache_capacity: capacity,
        }
    }

    /// Resolve every lookup against the registrations, without memoization
    pub fn uncached() -> Self {
        Self {
            lookup_cache_enabled: false,
            ..Self::default()
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            lookup_cache_enabled: true,
            lookup_cache_capacity: 10_000,
        }
    }
}

/// Configuration of the [`ResourceToModelMapper`](crate::mapping::ResourceToModelMapper)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingConfig {
    /// Whether mapped models are looked up in and stored to the result caches
    pub result_caching_enabled: bool,

    /// Whether mapping durations and instantiations are recorded
    pub statistics_enabled: bool,

    /// Maximum number of nested mappings for a single adaptation
    pub max_mapping_depth: usize,
}

impl MappingConfig {
    /// Create a new mapping configuration with custom settings
    pub fn new(
        result_caching_enabled: bool,
        statistics_enabled: bool,
        max_mapping_depth: usize,
    ) -> Self {
        Self {
            result_caching_enabled,
            statistics_enabled,
            max_mapping_depth,
        }
    }

    /// Create a configuration that bypasses the result caches
    pub fn uncached() -> Self {
        Self {
            result_caching_enabled: false,
            ..Self::default()
        }
    }

    /// Create a configuration for testing
    pub fn testing() -> Self {
        Self {
            result_caching_enabled: true,
            statistics_enabled: true,
            max_mapping_depth: 8, // Shallow so runaway nesting fails fast in tests
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            result_caching_enabled: true,
            statistics_enabled: true,
            max_mapping_depth: 64,
        }
    }
}

/// Configuration of the built-in [`LruModelCache`](crate::caching::LruModelCache)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCacheConfig {
    /// Maximum number of models held by the cache
    pub capacity: usize,
}

impl ResultCacheConfig {
    /// Create a new configuration with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Create a configuration optimized for low memory usage
    pub fn low_memory() -> Self {
        Self { capacity: 100 }
    }

    /// Create a configuration for large repositories
    pub fn high_capacity() -> Self {
        Self { capacity: 100_000 }
    }
}

impl Default for ResultCacheConfig {
    fn default() -> Self {
        Self { capacity: 1_000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_config() {
        assert!(RegistryConfig::default().lookup_cache_enabled);
        assert_eq!(RegistryConfig::default().lookup_cache_capacity, 10_000);
        assert!(!RegistryConfig::uncached().lookup_cache_enabled);
        assert_eq!(RegistryConfig::with_capacity(16).lookup_cache_capacity, 16);
    }

    #[test]
    fn test_mapping_config_default() {
        let config = MappingConfig::default();
        assert!(config.result_caching_enabled);
        assert!(config.statistics_enabled);
        assert_eq!(config.max_mapping_depth, 64);
    }

    #[test]
    fn test_mapping_config_presets() {
        let config = MappingConfig::uncached();
        assert!(!config.result_caching_enabled);
        assert!(config.statistics_enabled);

        let config = MappingConfig::testing();
        assert_eq!(config.max_mapping_depth, 8);

        let config = MappingConfig::new(false, false, 3);
        assert!(!config.result_caching_enabled);
        assert!(!config.statistics_enabled);
        assert_eq!(config.max_mapping_depth, 3);
    }

    #[test]
    fn test_result_cache_config() {
        assert_eq!(ResultCacheConfig::default().capacity, 1_000);
        assert_eq!(ResultCacheConfig::low_memory().capacity, 100);
        assert_eq!(ResultCacheConfig::high_capacity().capacity, 100_000);
        assert_eq!(ResultCacheConfig::new(7).capacity, 7);
    }
}
