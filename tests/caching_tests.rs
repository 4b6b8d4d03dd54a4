//! Integration tests for the result cache facade

mod common;

use common::{definition, hierarchy_repository, resource, source};
use pretty_assertions::assert_eq;
use resource_models::caching::{CacheKey, ResourceModelCaches};
use resource_models::metadata::ModelMetadataRegistrar;
use resource_models::prelude::*;
use std::sync::Arc;

#[test]
fn test_lookup_falls_through_to_later_backend() {
    let repository = hierarchy_repository();
    let a = resource(&repository, "/content/a");
    let source = source(definition("a", "app.A", &["app/a"]), "m");

    let metadata = Arc::new(ModelMetadataRegistrar::new());
    metadata.register(&source).unwrap();
    let caches = ResourceModelCaches::new(Arc::clone(&metadata));

    let empty = Arc::new(LruModelCache::named("empty", ResultCacheConfig::low_memory()));
    let filled = Arc::new(LruModelCache::named("filled", ResultCacheConfig::low_memory()));
    let model: Arc<dyn ResourceModel> = Arc::new(DynamicModel::new(Arc::clone(source.model_type())));
    filled
        .put(a.as_ref(), Arc::clone(&model), CacheKey::new(a.as_ref(), &source))
        .unwrap();
    caches.bind(empty.clone());
    caches.bind(filled.clone());

    let cached = caches.lookup(a.as_ref(), &source).unwrap();
    assert!(Arc::ptr_eq(&cached, &model));
    assert_eq!(metadata.get("app.A").unwrap().statistics().cache_hits(), 1);
    assert_eq!(empty.stats().misses, 1);
    assert_eq!(filled.stats().hits, 1);
}

#[test]
fn test_store_writes_every_backend() {
    let repository = hierarchy_repository();
    let a = resource(&repository, "/content/a");
    let source = source(definition("a", "app.A", &["app/a"]), "m");

    let caches = ResourceModelCaches::new(Arc::new(ModelMetadataRegistrar::new()));
    let first = Arc::new(LruModelCache::named("first", ResultCacheConfig::low_memory()));
    let second = Arc::new(LruModelCache::named("second", ResultCacheConfig::low_memory()));
    caches.bind(first.clone());
    caches.bind(second.clone());

    let model: Arc<dyn ResourceModel> = Arc::new(DynamicModel::new(Arc::clone(source.model_type())));
    caches.store(a.as_ref(), &source, &model);

    let key = CacheKey::new(a.as_ref(), &source);
    assert!(first.contains(&key));
    assert!(second.contains(&key));
}

#[test]
fn test_keys_are_session_scoped() {
    let repository = hierarchy_repository();
    let source = source(definition("a", "app.A", &["app/a"]), "m");

    let caches = ResourceModelCaches::new(Arc::new(ModelMetadataRegistrar::new()));
    caches.bind(Arc::new(LruModelCache::default()));

    let model: Arc<dyn ResourceModel> = Arc::new(DynamicModel::new(Arc::clone(source.model_type())));
    let first_session = resource(&repository, "/content/a");
    caches.store(first_session.as_ref(), &source, &model);

    assert!(caches.lookup(first_session.as_ref(), &source).is_some());
    let other_session = resource(&repository, "/content/a");
    assert!(caches.lookup(other_session.as_ref(), &source).is_none());
}

#[test]
fn test_eviction_of_least_recently_used() {
    let repository = hierarchy_repository();
    let a = resource(&repository, "/content/a");
    let c = resource(&repository, "/content/c");
    let cache = LruModelCache::new(ResultCacheConfig::new(1));

    let model: Arc<dyn ResourceModel> = Arc::new(DynamicModel::new(Arc::new(ModelType::new("app.A"))));
    let key_a = CacheKey::for_model_type(a.as_ref(), "app.A");
    let key_c = CacheKey::for_model_type(c.as_ref(), "app.A");
    cache.put(a.as_ref(), Arc::clone(&model), key_a.clone()).unwrap();
    cache.put(c.as_ref(), model, key_c.clone()).unwrap();

    assert!(!cache.contains(&key_a));
    assert!(cache.contains(&key_c));
    assert_eq!(cache.len(), 1);
}
