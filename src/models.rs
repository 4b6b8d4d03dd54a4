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

//! Composition root wiring the registry, metadata, caches and mapper

use crate::caching::ResourceModelCaches;
use crate::config::{MappingConfig, RegistryConfig};
use crate::mapping::ResourceToModelMapper;
use crate::metadata::ModelMetadataRegistrar;
use crate::registry::{ModelRegistrar, ModelRegistry};
use std::sync::Arc;

/// One instance of every component, sharing a single metadata registrar
#[derive(Debug)]
pub struct ResourceModels {
    registry: Arc<ModelRegistry>,
    metadata: Arc<ModelMetadataRegistrar>,
    caches: Arc<ResourceModelCaches>,
    registrar: ModelRegistrar,
    mapper: ResourceToModelMapper,
}

impl Default for ResourceModels {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceModels {
    /// Create the components with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default(), MappingConfig::default())
    }

    /// Create the components with custom configuration
    pub fn with_config(registry_config: RegistryConfig, mapping_config: MappingConfig) -> Self {
        let registry = Arc::new(ModelRegistry::with_config(registry_config));
        let metadata = Arc::new(ModelMetadataRegistrar::new());
        let caches = Arc::new(ResourceModelCaches::new(Arc::clone(&metadata)));
        let registrar = ModelRegistrar::new(Arc::clone(&registry), Arc::clone(&metadata));
        let mapper = ResourceToModelMapper::with_config(
            Arc::clone(&registry),
            Arc::clone(&metadata),
            Arc::clone(&caches),
            mapping_config,
        );

        Self {
            registry,
            metadata,
            caches,
            registrar,
            mapper,
        }
    }

    /// The model registry
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// The metadata registrar
    pub fn metadata(&self) -> &Arc<ModelMetadataRegistrar> {
        &self.metadata
    }

    /// The result cache facade
    pub fn caches(&self) -> &Arc<ResourceModelCaches> {
        &self.caches
    }

    /// The registration coordinator
    pub fn registrar(&self) -> &ModelRegistrar {
        &self.registrar
    }

    /// The resource to model mapper
    pub fn mapper(&self) -> &ResourceToModelMapper {
        &self.mapper
    }

    /// Drop every registration, all metadata and the lookup caches
    pub fn shutdown(&self) {
        self.registry.shutdown();
        self.metadata.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DefinitionsFactory, DynamicModel, ModelDefinition, ModelType, ResourceModelDeclaration};
    use crate::registry::ModuleId;

    #[test]
    fn test_components_share_metadata() {
        let models = ResourceModels::new();
        let definition = ModelDefinition::new(
            "teaser",
            Arc::new(ModelType::new("app.Teaser")),
            ResourceModelDeclaration::for_types(["app/teaser"]),
        );
        let factory = DefinitionsFactory::new().with_model(definition, DynamicModel::boxed);

        let report = models
            .registrar()
            .register_models(&ModuleId::new("app"), Arc::new(factory));
        assert!(report.is_complete());
        assert!(Arc::ptr_eq(models.metadata(), models.mapper().metadata()));
        assert_eq!(models.metadata().len(), 1);
        assert_eq!(models.registry().model_sources().len(), 1);

        models.shutdown();
        assert!(models.metadata().is_empty());
        assert!(models.registry().model_sources().is_empty());
    }
}
