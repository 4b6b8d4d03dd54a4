//! Shared fixtures for the integration tests

#![allow(dead_code)]

use resource_models::prelude::*;
use resource_models::registry::ModelSource;
use std::sync::Arc;

/// A model definition for `type_name` declared for the given resource types
pub fn definition(name: &str, type_name: &str, resource_types: &[&str]) -> ModelDefinition {
    ModelDefinition::new(
        name,
        Arc::new(ModelType::new(type_name)),
        ResourceModelDeclaration::for_types(resource_types.iter().copied()),
    )
}

/// A model source backed by a factory creating [`DynamicModel`]s
pub fn source(definition: ModelDefinition, module: &str) -> ModelSource {
    let factory = DefinitionsFactory::new().with_model(definition.clone(), DynamicModel::boxed);
    ModelSource::new(definition, Arc::new(factory), ModuleId::new(module))
}

/// A repository with `/content/a` of type `app/a`, where `app/a` extends
/// `app/b` and `app/b` extends `app/c`
pub fn hierarchy_repository() -> Arc<MemoryRepository> {
    let repository = MemoryRepository::new();
    repository.declare_parent_type("app/a", "app/b");
    repository.declare_parent_type("app/b", "app/c");
    repository.add(ResourceData::new("/content/a", "app/a"));
    repository.add(ResourceData::new("/content/c", "app/c"));
    repository
}

/// Resolve `path` in a new session of `repository`
pub fn resource(repository: &Arc<MemoryRepository>, path: &str) -> Arc<dyn Resource> {
    repository
        .session()
        .get_resource(path)
        .unwrap_or_else(|| panic!("Missing test resource {path}"))
}

/// Names of the models of a lookup result, in result order
pub fn model_names(result: &resource_models::registry::LookupResult) -> Vec<String> {
    result
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|resolved| resolved.source().model_name().to_string())
        .collect()
}
