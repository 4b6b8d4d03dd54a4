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

//! Registrar of per-model metadata and statistics

use super::field::MappedFieldMetadata;
use super::method::MethodMetadata;
use super::statistics::{ResourceModelStatistics, StatisticsSnapshot};
use crate::error::Result;
use crate::model::ModelType;
use crate::registry::{ModelSource, ModuleId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Metadata of a resource model type
///
/// Field and method metadata are derived once; statistics are updated with
/// every mapping of the model.
#[derive(Debug)]
pub struct ResourceModelMetadata {
    model_type: Arc<ModelType>,
    mappable_fields: Vec<MappedFieldMetadata>,
    after_mapping_methods: Vec<MethodMetadata>,
    statistics: ResourceModelStatistics,
}

impl ResourceModelMetadata {
    /// Derive the metadata of a model type
    ///
    /// Fails on the first field declaration the mapper cannot support.
    pub fn new(model_type: Arc<ModelType>) -> Result<Self> {
        let mappable_fields = model_type
            .fields
            .iter()
            .map(|field| MappedFieldMetadata::new(field, &model_type))
            .collect::<Result<Vec<_>>>()?;

        let after_mapping_methods = model_type
            .methods
            .iter()
            .map(|method| MethodMetadata::new(method, &model_type))
            .filter(MethodMetadata::is_after_mapping_callback)
            .collect();

        Ok(Self {
            model_type,
            mappable_fields,
            after_mapping_methods,
            statistics: ResourceModelStatistics::new(),
        })
    }

    /// Name of the model type
    pub fn type_name(&self) -> &str {
        &self.model_type.name
    }

    /// The model type
    pub fn model_type(&self) -> &Arc<ModelType> {
        &self.model_type
    }

    /// Metadata of every mappable field, in declaration order
    pub fn mappable_fields(&self) -> &[MappedFieldMetadata] {
        &self.mappable_fields
    }

    /// Methods to invoke after all fields are mapped, in declaration order
    pub fn after_mapping_methods(&self) -> &[MethodMetadata] {
        &self.after_mapping_methods
    }

    /// Usage statistics
    pub fn statistics(&self) -> &ResourceModelStatistics {
        &self.statistics
    }

    /// Number of fields resolved on first access
    pub fn lazy_field_count(&self) -> usize {
        self.mappable_fields
            .iter()
            .filter(|field| field.is_lazy_loaded())
            .count()
    }

    /// Number of fields resolved while mapping
    pub fn greedy_field_count(&self) -> usize {
        self.mappable_fields.len() - self.lazy_field_count()
    }

    /// A serializable view of the model and its statistics
    pub fn statistics_view(&self) -> ModelStatisticsView {
        ModelStatisticsView {
            type_name: self.type_name().to_string(),
            mappable_fields: self.mappable_fields.len(),
            lazy_fields: self.lazy_field_count(),
            greedy_fields: self.greedy_field_count(),
            statistics: self.statistics.snapshot(),
        }
    }
}

/// Statistics of a model type as shown to operators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatisticsView {
    /// Model type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Number of mappable fields
    pub mappable_fields: usize,
    /// Fields resolved on first access
    pub lazy_fields: usize,
    /// Fields resolved while mapping
    pub greedy_fields: usize,
    /// Current statistics
    #[serde(flatten)]
    pub statistics: StatisticsSnapshot,
}

/// Holds the metadata of every registered model type
///
/// Metadata is computed once per model type, no matter how many modules or
/// definitions register it, and dropped when the last contributing module is
/// removed.
#[derive(Debug, Default)]
pub struct ModelMetadataRegistrar {
    metadata: DashMap<String, Arc<ResourceModelMetadata>>,
    contributions: DashMap<ModuleId, IndexSet<String>>,
}

impl ModelMetadataRegistrar {
    /// Create an empty registrar
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the model type of `source`, computing its metadata on first registration
    pub fn register(&self, source: &ModelSource) -> Result<Arc<ResourceModelMetadata>> {
        // Contributions are recorded under the metadata entry lock, see remove_metadata_for
        match self.metadata.entry(source.type_name().to_string()) {
            Entry::Occupied(entry) => {
                self.record_contribution(source);
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => {
                let metadata = Arc::new(ResourceModelMetadata::new(Arc::clone(source.model_type()))?);
                log::debug!(
                    "Registered metadata of model {} with {} mappable fields",
                    metadata.type_name(),
                    metadata.mappable_fields().len()
                );
                self.record_contribution(source);
                Ok(Arc::clone(entry.insert(metadata).value()))
            }
        }
    }

    fn record_contribution(&self, source: &ModelSource) {
        self.contributions
            .entry(source.module().clone())
            .or_default()
            .insert(source.type_name().to_string());
    }

    /// Drop the metadata contributed by `module` that no other module contributes
    pub fn remove_metadata_for(&self, module: &ModuleId) {
        let Some((_, type_names)) = self.contributions.remove(module) else {
            return;
        };

        for type_name in type_names {
            let Entry::Occupied(entry) = self.metadata.entry(type_name) else {
                continue;
            };
            let contributed_elsewhere = self
                .contributions
                .iter()
                .any(|contribution| contribution.value().contains(entry.key()));
            if !contributed_elsewhere {
                entry.remove();
            }
        }
    }

    /// Metadata of a registered model type
    pub fn get(&self, type_name: &str) -> Option<Arc<ResourceModelMetadata>> {
        self.metadata.get(type_name).map(|entry| Arc::clone(entry.value()))
    }

    /// Metadata of every registered model type, ordered by type name
    pub fn get_all(&self) -> Vec<Arc<ResourceModelMetadata>> {
        let mut all: Vec<_> = self
            .metadata
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        all.sort_by(|a, b| a.type_name().cmp(b.type_name()));
        all
    }

    /// Number of registered model types
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    /// Whether no model type is registered
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Reset the statistics of every registered model type
    pub fn reset_statistics(&self) {
        for entry in self.metadata.iter() {
            entry.value().statistics().reset();
        }
    }

    /// Statistics views of every registered model type, ordered by type name
    pub fn statistics_views(&self) -> Vec<ModelStatisticsView> {
        self.get_all()
            .iter()
            .map(|metadata| metadata.statistics_view())
            .collect()
    }

    /// Statistics of every registered model type as JSON
    pub fn statistics_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.statistics_views())
    }

    /// Drop all metadata
    pub fn clear(&self) {
        self.contributions.clear();
        self.metadata.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::model::{
        DefinitionsFactory, DynamicModel, FieldDescriptor, FieldType, MethodDescriptor,
        ModelDefinition, ResourceModelDeclaration,
    };

    fn teaser_type() -> Arc<ModelType> {
        Arc::new(
            ModelType::new("app.Teaser")
                .with_field(FieldDescriptor::new("title", FieldType::string()))
                .with_field(
                    FieldDescriptor::new("links", FieldType::list_of(FieldType::model("app.Link")))
                        .reference(),
                )
                .with_method(MethodDescriptor::after_mapping("init"))
                .with_method(MethodDescriptor::plain("render")),
        )
    }

    fn source(model_type: Arc<ModelType>, module: &str) -> ModelSource {
        let definition = ModelDefinition::new(
            "teaser",
            model_type,
            ResourceModelDeclaration::for_types(["app/teaser"]),
        );
        let factory = DefinitionsFactory::new().with_model(definition.clone(), DynamicModel::boxed);
        ModelSource::new(definition, Arc::new(factory), ModuleId::new(module))
    }

    #[test]
    fn test_metadata_is_computed_once() {
        let registrar = ModelMetadataRegistrar::new();
        let first = registrar.register(&source(teaser_type(), "a")).unwrap();
        let second = registrar.register(&source(teaser_type(), "b")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registrar.len(), 1);
        assert_eq!(first.mappable_fields().len(), 2);
        assert_eq!(first.after_mapping_methods().len(), 1);
        assert_eq!(first.lazy_field_count(), 1);
        assert_eq!(first.greedy_field_count(), 1);
    }

    #[test]
    fn test_removal_keeps_metadata_contributed_elsewhere() {
        let registrar = ModelMetadataRegistrar::new();
        registrar.register(&source(teaser_type(), "a")).unwrap();
        registrar.register(&source(teaser_type(), "b")).unwrap();

        registrar.remove_metadata_for(&ModuleId::new("a"));
        assert!(registrar.get("app.Teaser").is_some());

        registrar.remove_metadata_for(&ModuleId::new("b"));
        assert!(registrar.get("app.Teaser").is_none());
        assert!(registrar.is_empty());
    }

    #[test]
    fn test_concurrent_registration_survives_removal() {
        for _ in 0..200 {
            let registrar = ModelMetadataRegistrar::new();
            registrar.register(&source(teaser_type(), "a")).unwrap();

            std::thread::scope(|scope| {
                scope.spawn(|| registrar.remove_metadata_for(&ModuleId::new("a")));
                scope.spawn(|| registrar.register(&source(teaser_type(), "b")).unwrap());
            });

            assert!(registrar.get("app.Teaser").is_some());
        }
    }

    #[test]
    fn test_invalid_model_is_not_registered() {
        let invalid = Arc::new(
            ModelType::new("app.Broken")
                .with_field(FieldDescriptor::new("title", FieldType::string()).with_path("")),
        );
        let registrar = ModelMetadataRegistrar::new();
        let result = registrar.register(&source(invalid, "a"));

        assert!(matches!(result, Err(ModelError::InvalidField { .. })));
        assert!(registrar.get("app.Broken").is_none());
    }

    #[test]
    fn test_statistics_views() {
        let registrar = ModelMetadataRegistrar::new();
        let metadata = registrar.register(&source(teaser_type(), "a")).unwrap();
        metadata.statistics().count_instantiation();

        let json: serde_json::Value =
            serde_json::from_str(&registrar.statistics_json().unwrap()).unwrap();
        assert_eq!(json[0]["type"], "app.Teaser");
        assert_eq!(json[0]["instantiations"], 1);
        assert_eq!(json[0]["lazyFields"], 1);

        registrar.reset_statistics();
        assert_eq!(metadata.statistics().instantiations(), 0);
    }
}
