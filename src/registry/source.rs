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

//! Registered model sources

use crate::error::Result;
use crate::model::{ModelDefinition, ModelFactory, ModelType, ResourceModel};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a module contributing models
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(Arc<str>);

impl ModuleId {
    /// Create a module identity
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The module name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct SourceInner {
    definition: ModelDefinition,
    factory: Arc<dyn ModelFactory>,
    module: ModuleId,
}

/// A model definition bound to the factory that instantiates it
///
/// Cheap to clone. Two sources are equal when they have the same model name,
/// model type and contributing module.
#[derive(Clone)]
pub struct ModelSource {
    inner: Arc<SourceInner>,
}

impl ModelSource {
    /// Bind a definition to its factory and module
    pub fn new(definition: ModelDefinition, factory: Arc<dyn ModelFactory>, module: ModuleId) -> Self {
        Self {
            inner: Arc::new(SourceInner {
                definition,
                factory,
                module,
            }),
        }
    }

    /// The model name
    pub fn model_name(&self) -> &str {
        self.inner.definition.model_name()
    }

    /// The model type
    pub fn model_type(&self) -> &Arc<ModelType> {
        &self.inner.definition.model_type
    }

    /// Name of the model type
    pub fn type_name(&self) -> &str {
        &self.inner.definition.model_type.name
    }

    /// The contributing module
    pub fn module(&self) -> &ModuleId {
        &self.inner.module
    }

    /// The model definition
    pub fn definition(&self) -> &ModelDefinition {
        &self.inner.definition
    }

    /// Create a new, unmapped model instance
    pub fn create_model(&self) -> Result<Box<dyn ResourceModel>> {
        self.inner.factory.create_model(&self.inner.definition)
    }
}

impl PartialEq for ModelSource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.model_name() == other.model_name()
                && self.type_name() == other.type_name()
                && self.module() == other.module())
    }
}

impl Eq for ModelSource {}

impl Hash for ModelSource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.model_name().hash(state);
        self.type_name().hash(state);
        self.module().hash(state);
    }
}

impl fmt::Debug for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSource")
            .field("model_name", &self.model_name())
            .field("model_type", &self.type_name())
            .field("module", &self.module())
            .finish()
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) from {}", self.model_name(), self.type_name(), self.module())
    }
}

/// A model source together with the resource type it was found for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedModelSource {
    source: ModelSource,
    resource_type: String,
}

impl ResolvedModelSource {
    /// Pair a source with the matched resource type
    pub fn new(source: ModelSource, resource_type: impl Into<String>) -> Self {
        Self {
            source,
            resource_type: resource_type.into(),
        }
    }

    /// The model source
    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    /// The resource type the source is registered for
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DefinitionsFactory, DynamicModel, ResourceModelDeclaration};

    fn source(name: &str, module: &str) -> ModelSource {
        let definition = ModelDefinition::new(
            name,
            Arc::new(ModelType::new("app.Teaser")),
            ResourceModelDeclaration::for_types(["app/teaser"]),
        );
        let factory = DefinitionsFactory::new().with_model(definition.clone(), DynamicModel::boxed);
        ModelSource::new(definition, Arc::new(factory), ModuleId::new(module))
    }

    #[test]
    fn test_source_identity() {
        assert_eq!(source("teaser", "a"), source("teaser", "a"));
        assert_ne!(source("teaser", "a"), source("teaser", "b"));
        assert_ne!(source("teaser", "a"), source("other", "a"));
    }

    #[test]
    fn test_create_model() {
        let model = source("teaser", "a").create_model().unwrap();
        assert!(model.is::<DynamicModel>());
        assert_eq!(source("teaser", "a").to_string(), "teaser (app.Teaser) from a");
    }
}
