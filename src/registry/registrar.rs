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

//! Registration of the models published by model factories
//!
//! The embedding runtime reports factories appearing, changing and
//! disappearing as [`ProviderEvent`]s. Each definition of an appearing factory
//! is registered with the metadata registrar and the model registry; a
//! definition that cannot be registered is logged and skipped without
//! affecting the other definitions.

use super::model_registry::ModelRegistry;
use super::source::{ModelSource, ModuleId};
use crate::error::{ModelError, Result};
use crate::metadata::ModelMetadataRegistrar;
use crate::model::{ModelDefinition, ModelFactory};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Lifecycle event of a model factory
#[derive(Clone)]
pub enum ProviderEvent {
    /// A factory became available
    Added {
        /// Module owning the factory
        module: ModuleId,
        /// The factory
        factory: Arc<dyn ModelFactory>,
    },
    /// A factory changed its definitions
    Modified {
        /// Module owning the factory
        module: ModuleId,
        /// The factory
        factory: Arc<dyn ModelFactory>,
    },
    /// A factory went away
    Removed {
        /// Module owning the factory
        module: ModuleId,
    },
}

impl ProviderEvent {
    /// The module the event concerns
    pub fn module(&self) -> &ModuleId {
        match self {
            Self::Added { module, .. } | Self::Modified { module, .. } | Self::Removed { module } => {
                module
            }
        }
    }
}

impl fmt::Debug for ProviderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Added { .. } => "Added",
            Self::Modified { .. } => "Modified",
            Self::Removed { .. } => "Removed",
        };
        f.debug_struct(kind).field("module", self.module()).finish_non_exhaustive()
    }
}

/// Notified after the registered models of a module changed
pub trait RegistrationListener: Send + Sync {
    /// The models of `module` were registered or removed
    fn models_changed(&self, module: &ModuleId);
}

/// Outcome of handling a provider event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegistrationReport {
    /// Names of the registered models
    pub registered: Vec<String>,
    /// Names of the skipped models and why they were skipped
    pub skipped: Vec<(String, ModelError)>,
    /// Number of removed resource type mappings
    pub removed: usize,
}

impl RegistrationReport {
    /// Whether every definition was registered
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Bridges model factories into the metadata registrar and the model registry
pub struct ModelRegistrar {
    registry: Arc<ModelRegistry>,
    metadata: Arc<ModelMetadataRegistrar>,
    listeners: RwLock<Vec<Arc<dyn RegistrationListener>>>,
}

impl ModelRegistrar {
    /// Create a registrar feeding the given registries
    pub fn new(registry: Arc<ModelRegistry>, metadata: Arc<ModelMetadataRegistrar>) -> Self {
        Self {
            registry,
            metadata,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Add a listener notified after every registration change
    pub fn add_listener(&self, listener: Arc<dyn RegistrationListener>) {
        self.listeners.write().push(listener);
    }

    /// Handle a factory lifecycle event
    ///
    /// A modified factory is unregistered and registered again from scratch.
    pub fn handle(&self, event: ProviderEvent) -> RegistrationReport {
        match event {
            ProviderEvent::Added { module, factory } => self.register_models(&module, factory),
            ProviderEvent::Modified { module, factory } => {
                let removed = self.remove(&module);
                let mut report = self.register_models(&module, factory);
                report.removed = removed;
                report
            }
            ProviderEvent::Removed { module } => {
                let removed = self.unregister_models(&module);
                RegistrationReport {
                    removed,
                    ..RegistrationReport::default()
                }
            }
        }
    }

    /// Register every model definition of `factory` as contributed by `module`
    pub fn register_models(
        &self,
        module: &ModuleId,
        factory: Arc<dyn ModelFactory>,
    ) -> RegistrationReport {
        let mut report = RegistrationReport::default();

        for definition in factory.model_definitions() {
            let model_name = definition.model_name().to_string();
            match self.register_definition(module, definition, Arc::clone(&factory)) {
                Ok(()) => report.registered.push(model_name),
                Err(error) => {
                    log::error!("Skipping model {model_name} of module {module}: {error}");
                    report.skipped.push((model_name, error));
                }
            }
        }

        log::info!(
            "Registered {} models of module {module}, skipped {}",
            report.registered.len(),
            report.skipped.len()
        );
        self.notify(module);
        report
    }

    /// Remove every model contributed by `module`; returns the number of removed mappings
    pub fn unregister_models(&self, module: &ModuleId) -> usize {
        let removed = self.remove(module);
        log::info!("Removed {removed} resource type mappings of module {module}");
        self.notify(module);
        removed
    }

    fn remove(&self, module: &ModuleId) -> usize {
        let removed = self.registry.remove_models_from(module);
        self.metadata.remove_metadata_for(module);
        removed
    }

    fn register_definition(
        &self,
        module: &ModuleId,
        definition: ModelDefinition,
        factory: Arc<dyn ModelFactory>,
    ) -> Result<()> {
        let resource_types = definition.resource_types()?;
        let source = ModelSource::new(definition, factory, module.clone());
        self.metadata.register(&source)?;
        log::debug!("Registering model {source} for resource types {resource_types:?}");
        self.registry.add(resource_types, source);
        Ok(())
    }

    fn notify(&self, module: &ModuleId) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener.models_changed(module);
        }
    }
}

impl fmt::Debug for ModelRegistrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistrar")
            .field("registry", &self.registry)
            .field("listeners", &self.listeners.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DefinitionsFactory, DynamicModel, FieldDescriptor, FieldType, ModelType,
        ResourceModelDeclaration,
    };
    use crate::resource::{MemoryRepository, ResourceData, ResourceResolver};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingListener(AtomicUsize);

    impl RegistrationListener for CountingListener {
        fn models_changed(&self, _module: &ModuleId) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn factory(declarations: Vec<(&str, ResourceModelDeclaration)>) -> Arc<dyn ModelFactory> {
        let mut factory = DefinitionsFactory::new();
        for (name, declaration) in declarations {
            let model_type = Arc::new(
                ModelType::new(format!("app.{name}"))
                    .with_field(FieldDescriptor::new("title", FieldType::string())),
            );
            factory = factory.with_model(
                ModelDefinition::new(name, model_type, declaration),
                DynamicModel::boxed,
            );
        }
        Arc::new(factory)
    }

    fn setup() -> (ModelRegistrar, Arc<ModelRegistry>, Arc<ModelMetadataRegistrar>) {
        let registry = Arc::new(ModelRegistry::new());
        let metadata = Arc::new(ModelMetadataRegistrar::new());
        let registrar = ModelRegistrar::new(Arc::clone(&registry), Arc::clone(&metadata));
        (registrar, registry, metadata)
    }

    #[test]
    fn test_incomplete_declarations_are_skipped() {
        let (registrar, registry, metadata) = setup();
        let report = registrar.handle(ProviderEvent::Added {
            module: ModuleId::new("bundle"),
            factory: factory(vec![
                ("Teaser", ResourceModelDeclaration::for_types(["app/teaser"])),
                ("Legacy", ResourceModelDeclaration::legacy(["app/legacy"])),
                ("Broken", ResourceModelDeclaration::default()),
            ]),
        });

        assert_eq!(report.registered, vec!["Teaser", "Legacy"]);
        assert_eq!(
            report.skipped,
            vec![("Broken".to_string(), ModelError::incomplete_declaration("Broken"))]
        );
        assert!(!report.is_complete());
        assert_eq!(registry.model_sources().len(), 2);
        assert_eq!(metadata.len(), 2);
    }

    #[test]
    fn test_modified_factory_is_registered_from_scratch() {
        let (registrar, registry, _) = setup();
        let module = ModuleId::new("bundle");
        registrar.handle(ProviderEvent::Added {
            module: module.clone(),
            factory: factory(vec![("Teaser", ResourceModelDeclaration::for_types(["app/teaser"]))]),
        });

        let report = registrar.handle(ProviderEvent::Modified {
            module: module.clone(),
            factory: factory(vec![("Page", ResourceModelDeclaration::for_types(["app/page"]))]),
        });
        assert_eq!(report.removed, 1);
        assert_eq!(report.registered, vec!["Page"]);

        let names: Vec<String> = registry
            .model_sources()
            .iter()
            .map(|source| source.model_name().to_string())
            .collect();
        assert_eq!(names, vec!["Page"]);
    }

    #[test]
    fn test_removal_unregisters_and_notifies() {
        let (registrar, registry, metadata) = setup();
        let listener = Arc::new(CountingListener::default());
        registrar.add_listener(listener.clone());

        let module = ModuleId::new("bundle");
        registrar.handle(ProviderEvent::Added {
            module: module.clone(),
            factory: factory(vec![("Teaser", ResourceModelDeclaration::for_types(["app/teaser"]))]),
        });

        let repository = MemoryRepository::new();
        repository.add(ResourceData::new("/t", "app/teaser"));
        let resource = repository.session().get_resource("/t").unwrap();
        assert!(registry.lookup_all_models(resource.as_ref()).is_some());

        let report = registrar.handle(ProviderEvent::Removed { module });
        assert_eq!(report.removed, 1);
        assert!(registry.lookup_all_models(resource.as_ref()).is_none());
        assert!(metadata.is_empty());
        assert_eq!(listener.0.load(Ordering::SeqCst), 2);
    }
}
