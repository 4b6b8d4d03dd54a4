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

//! Model instances and the providers that create them

use super::types::ModelType;
use super::value::FieldValue;
use crate::error::{ModelError, Result};
use crate::resource::Resource;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An instance of a resource model
///
/// The mapper injects every resolved field through [`set_field`](Self::set_field)
/// and then runs the after-mapping methods declared on the model type through
/// [`invoke`](Self::invoke).
pub trait ResourceModel: Any + Send + Sync + fmt::Debug {
    /// Inject a resolved field value
    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()>;

    /// Invoke a declared method
    fn invoke(&mut self, _method: &str) -> Result<()> {
        Ok(())
    }

    /// Upcast for downcasting to the concrete model
    fn as_any(&self) -> &dyn Any;
}

impl dyn ResourceModel {
    /// Downcast to the concrete model type
    pub fn downcast_ref<T: ResourceModel>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Whether the model is of the concrete type `T`
    pub fn is<T: ResourceModel>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Declaration of the resource types a model applies to
///
/// `value` is the current accessor. Declarations written against the legacy
/// form only carry `types`, which is used when `value` yields nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceModelDeclaration {
    /// Resource types, current form
    pub value: Option<Vec<String>>,
    /// Resource types, legacy form
    pub types: Option<Vec<String>>,
    /// User-defined model name overriding the definition name
    pub name: Option<String>,
}

impl ResourceModelDeclaration {
    /// Declare the resource types a model applies to
    pub fn for_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value: Some(types.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Declare the resource types in the legacy form
    pub fn legacy<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: Some(types.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Override the model name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The declared resource types
    ///
    /// Falls back to the legacy accessor when the current one yields nothing.
    pub fn resource_types(&self, model_name: &str) -> Result<Vec<String>> {
        if let Some(types) = self.value.as_ref().filter(|types| !types.is_empty()) {
            return Ok(types.clone());
        }

        log::trace!("Model {model_name} has no current type declaration, using the legacy form");
        match self.types.as_ref().filter(|types| !types.is_empty()) {
            Some(types) => Ok(types.clone()),
            None => Err(ModelError::incomplete_declaration(model_name)),
        }
    }
}

/// A model published by a [`ModelFactory`]
#[derive(Debug, Clone)]
pub struct ModelDefinition {
    /// Definition name
    pub name: String,
    /// The implementing model type
    pub model_type: Arc<ModelType>,
    /// The resource model declaration
    pub declaration: ResourceModelDeclaration,
}

impl ModelDefinition {
    /// Create a definition
    pub fn new(
        name: impl Into<String>,
        model_type: Arc<ModelType>,
        declaration: ResourceModelDeclaration,
    ) -> Self {
        Self {
            name: name.into(),
            model_type,
            declaration,
        }
    }

    /// The model name: the declared name if present, else the definition name
    pub fn model_name(&self) -> &str {
        self.declaration.name.as_deref().unwrap_or(&self.name)
    }

    /// The resource types this model applies to
    pub fn resource_types(&self) -> Result<Vec<String>> {
        self.declaration.resource_types(self.model_name())
    }
}

/// A provider of model definitions and instances
pub trait ModelFactory: Send + Sync {
    /// All definitions of resource models this factory provides
    fn model_definitions(&self) -> Vec<ModelDefinition>;

    /// Create a new, unmapped instance of the defined model
    fn create_model(&self, definition: &ModelDefinition) -> Result<Box<dyn ResourceModel>>;
}

type ModelConstructor = Arc<dyn Fn(&ModelDefinition) -> Box<dyn ResourceModel> + Send + Sync>;

/// A [`ModelFactory`] built from definitions and constructor functions
#[derive(Default, Clone)]
pub struct DefinitionsFactory {
    definitions: Vec<ModelDefinition>,
    constructors: FxHashMap<String, ModelConstructor>,
}

impl DefinitionsFactory {
    /// Create an empty factory
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a model created by `constructor`
    pub fn with_model<F>(mut self, definition: ModelDefinition, constructor: F) -> Self
    where
        F: Fn(&ModelDefinition) -> Box<dyn ResourceModel> + Send + Sync + 'static,
    {
        self.constructors
            .insert(definition.name.clone(), Arc::new(constructor));
        self.definitions.push(definition);
        self
    }
}

impl fmt::Debug for DefinitionsFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionsFactory")
            .field("definitions", &self.definitions)
            .finish_non_exhaustive()
    }
}

impl ModelFactory for DefinitionsFactory {
    fn model_definitions(&self) -> Vec<ModelDefinition> {
        self.definitions.clone()
    }

    fn create_model(&self, definition: &ModelDefinition) -> Result<Box<dyn ResourceModel>> {
        self.constructors
            .get(&definition.name)
            .map(|constructor| constructor(definition))
            .ok_or_else(|| {
                ModelError::model_creation(definition.model_name(), "no constructor is registered")
            })
    }
}

/// Hook run on every freshly mapped model
///
/// Processors run after the after-mapping methods, in registration order,
/// and may return a different model to use instead.
pub trait ResourceModelPostProcessor: Send + Sync {
    /// Process a mapped model
    fn process(
        &self,
        resource: &Arc<dyn Resource>,
        model: Box<dyn ResourceModel>,
    ) -> Result<Box<dyn ResourceModel>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DynamicModel;

    #[test]
    fn test_declaration_prefers_current_form() {
        let declaration = ResourceModelDeclaration {
            value: Some(vec!["app/teaser".into()]),
            types: Some(vec!["app/legacy".into()]),
            name: None,
        };
        assert_eq!(declaration.resource_types("teaser").unwrap(), vec!["app/teaser"]);
    }

    #[test]
    fn test_declaration_falls_back_to_legacy_form() {
        let declaration = ResourceModelDeclaration::legacy(["app/legacy"]);
        assert_eq!(declaration.resource_types("teaser").unwrap(), vec!["app/legacy"]);

        let declaration = ResourceModelDeclaration {
            value: Some(Vec::new()),
            types: Some(vec!["app/legacy".into()]),
            name: None,
        };
        assert_eq!(declaration.resource_types("teaser").unwrap(), vec!["app/legacy"]);
    }

    #[test]
    fn test_incomplete_declaration() {
        let declaration = ResourceModelDeclaration::default();
        assert_eq!(
            declaration.resource_types("teaser"),
            Err(ModelError::incomplete_declaration("teaser"))
        );
    }

    #[test]
    fn test_declared_name_overrides_definition_name() {
        let model_type = Arc::new(ModelType::new("app.Teaser"));
        let definition = ModelDefinition::new(
            "teaserModel",
            Arc::clone(&model_type),
            ResourceModelDeclaration::for_types(["app/teaser"]).named("teaser"),
        );
        assert_eq!(definition.model_name(), "teaser");

        let definition = ModelDefinition::new(
            "teaserModel",
            model_type,
            ResourceModelDeclaration::for_types(["app/teaser"]),
        );
        assert_eq!(definition.model_name(), "teaserModel");
    }

    #[test]
    fn test_definitions_factory() {
        let model_type = Arc::new(ModelType::new("app.Teaser"));
        let known = ModelDefinition::new(
            "teaser",
            Arc::clone(&model_type),
            ResourceModelDeclaration::for_types(["app/teaser"]),
        );
        let factory = DefinitionsFactory::new().with_model(known.clone(), DynamicModel::boxed);

        assert_eq!(factory.model_definitions().len(), 1);
        let model = factory.create_model(&known).unwrap();
        assert!(model.is::<DynamicModel>());

        let unknown = ModelDefinition::new("other", model_type, ResourceModelDeclaration::default());
        assert!(matches!(
            factory.create_model(&unknown),
            Err(ModelError::ModelCreation { .. })
        ));
    }
}
