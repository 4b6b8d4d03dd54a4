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

//! Resource to model mapping
//!
//! Adapting a resource resolves the most specific model for the requested
//! type, then instantiates and populates it. Results are served from and
//! stored to the bound result caches.

use super::field_mapper::FieldValueMapper;
use crate::caching::ResourceModelCaches;
use crate::config::MappingConfig;
use crate::error::{ModelError, Result};
use crate::metadata::ModelMetadataRegistrar;
use crate::model::{ResourceModel, ResourceModelPostProcessor};
use crate::registry::{LookupResult, ModelRegistry, ModelSource};
use crate::resource::Resource;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Maps resources onto the models registered for them
///
/// The mapper is cheap to clone; clones share the registry, metadata, caches
/// and post processors.
#[derive(Clone)]
pub struct ResourceToModelMapper {
    registry: Arc<ModelRegistry>,
    metadata: Arc<ModelMetadataRegistrar>,
    caches: Arc<ResourceModelCaches>,
    post_processors: Arc<RwLock<Vec<Arc<dyn ResourceModelPostProcessor>>>>,
    config: Arc<MappingConfig>,
}

impl ResourceToModelMapper {
    /// Create a mapper with the default configuration
    pub fn new(
        registry: Arc<ModelRegistry>,
        metadata: Arc<ModelMetadataRegistrar>,
        caches: Arc<ResourceModelCaches>,
    ) -> Self {
        Self::with_config(registry, metadata, caches, MappingConfig::default())
    }

    /// Create a mapper with custom configuration
    pub fn with_config(
        registry: Arc<ModelRegistry>,
        metadata: Arc<ModelMetadataRegistrar>,
        caches: Arc<ResourceModelCaches>,
        config: MappingConfig,
    ) -> Self {
        Self {
            registry,
            metadata,
            caches,
            post_processors: Arc::new(RwLock::new(Vec::new())),
            config: Arc::new(config),
        }
    }

    /// The model registry
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// The model metadata registrar
    pub fn metadata(&self) -> &Arc<ModelMetadataRegistrar> {
        &self.metadata
    }

    /// The result caches
    pub fn caches(&self) -> &Arc<ResourceModelCaches> {
        &self.caches
    }

    /// The mapping configuration
    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Add a post processor; processors run in registration order
    pub fn add_post_processor(&self, processor: Arc<dyn ResourceModelPostProcessor>) {
        self.post_processors.write().push(processor);
    }

    /// Adapt `resource` to the most specific model assignable to `target_type`
    ///
    /// Returns `Ok(None)` if no model applies. Fails if more than one model
    /// applies at the most specific level.
    pub fn adapt_to(
        &self,
        resource: &Arc<dyn Resource>,
        target_type: &str,
    ) -> Result<Option<Arc<dyn ResourceModel>>> {
        self.adapt_at_depth(resource, target_type, 0)
    }

    /// Adapt `resource` to the most specific model named `model_name`
    pub fn adapt_to_model_name(
        &self,
        resource: &Arc<dyn Resource>,
        model_name: &str,
    ) -> Result<Option<Arc<dyn ResourceModel>>> {
        let candidates = self
            .registry
            .lookup_most_specific_models_with_name(resource.as_ref(), model_name);
        match unique_candidate(resource.as_ref(), model_name, candidates)? {
            Some(source) => self.map_at_depth(resource, &source, 0).map(Some),
            None => Ok(None),
        }
    }

    /// Map `resource` onto the model provided by `source`
    pub fn map(&self, resource: &Arc<dyn Resource>, source: &ModelSource) -> Result<Arc<dyn ResourceModel>> {
        self.map_at_depth(resource, source, 0)
    }

    pub(crate) fn adapt_at_depth(
        &self,
        resource: &Arc<dyn Resource>,
        target_type: &str,
        depth: usize,
    ) -> Result<Option<Arc<dyn ResourceModel>>> {
        let candidates = self
            .registry
            .lookup_most_specific_models_for_type(resource.as_ref(), target_type);
        match unique_candidate(resource.as_ref(), target_type, candidates)? {
            Some(source) => self.map_at_depth(resource, &source, depth).map(Some),
            None => {
                log::trace!("No model of type {target_type} for {}", resource.path());
                Ok(None)
            }
        }
    }

    fn map_at_depth(
        &self,
        resource: &Arc<dyn Resource>,
        source: &ModelSource,
        depth: usize,
    ) -> Result<Arc<dyn ResourceModel>> {
        if depth > self.config.max_mapping_depth {
            return Err(ModelError::MappingDepthExceeded {
                path: resource.path().to_string(),
                depth: self.config.max_mapping_depth,
            });
        }

        if self.config.result_caching_enabled {
            if let Some(model) = self.caches.lookup(resource.as_ref(), source) {
                return Ok(model);
            }
        }

        let metadata = match self.metadata.get(source.type_name()) {
            Some(metadata) => metadata,
            None => self.metadata.register(source)?,
        };
        let started = Instant::now();

        let mut model = source.create_model()?;
        if self.config.statistics_enabled {
            metadata.statistics().count_instantiation();
        }

        let fields = FieldValueMapper::new(self.clone(), depth);
        for field in metadata.mappable_fields() {
            if let Some(value) = fields.resolve(resource, field)? {
                model.set_field(field.name(), value).map_err(|error| match error {
                    ModelError::FieldInjection { .. } => error,
                    other => ModelError::field_injection(metadata.type_name(), field.name(), other.to_string()),
                })?;
            }
        }

        for method in metadata.after_mapping_methods() {
            log::trace!("Invoking {}::{} on {}", metadata.type_name(), method.name(), resource.path());
            model.invoke(method.name())?;
        }

        let processors = self.post_processors.read().clone();
        for processor in processors {
            model = processor.process(resource, model)?;
        }

        let model: Arc<dyn ResourceModel> = Arc::from(model);
        if self.config.statistics_enabled {
            metadata.statistics().count_mapping(started.elapsed());
        }
        if self.config.result_caching_enabled {
            self.caches.store(resource.as_ref(), source, &model);
        }

        log::debug!("Mapped {} onto {}", resource.path(), source);
        Ok(model)
    }
}

fn unique_candidate(resource: &dyn Resource, target: &str, candidates: LookupResult) -> Result<Option<ModelSource>> {
    let Some(candidates) = candidates else {
        return Ok(None);
    };
    match &*candidates {
        [] => Ok(None),
        [single] => Ok(Some(single.source().clone())),
        many => Err(ModelError::AmbiguousModels {
            resource_path: resource.path().to_string(),
            target: target.to_string(),
            candidates: many
                .iter()
                .map(|candidate| candidate.source().model_name().to_string())
                .collect(),
        }),
    }
}

impl fmt::Debug for ResourceToModelMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceToModelMapper")
            .field("config", &self.config)
            .field("caches", &self.caches)
            .field("post_processors", &self.post_processors.read().len())
            .finish_non_exhaustive()
    }
}
