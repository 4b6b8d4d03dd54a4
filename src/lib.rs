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

//! Typed resource models for hierarchical content repositories
//!
//! This crate binds resources of a content repository to typed models:
//!
//! - [`registry`] maps resource types to the models registered for them and
//!   resolves the most specific models for a resource
//! - [`metadata`] derives and holds the mapping metadata and statistics of
//!   every model type
//! - [`mapping`] instantiates models and populates their fields
//! - [`caching`] serves mapping results from pluggable cache backends
//!
//! ## Example
//!
//! ```
//! use resource_models::prelude::*;
//! use std::sync::Arc;
//!
//! let repository = MemoryRepository::new();
//! repository.add(ResourceData::new("/content/teaser", "app/teaser").with_property("jcr:title", "Hello"));
//!
//! let teaser = Arc::new(
//!     ModelType::new("app.Teaser")
//!         .with_field(FieldDescriptor::new("title", FieldType::string()).with_path("jcr:title")),
//! );
//! let definition = ModelDefinition::new("teaser", teaser, ResourceModelDeclaration::for_types(["app/teaser"]));
//! let factory = DefinitionsFactory::new().with_model(definition, DynamicModel::boxed);
//!
//! let models = ResourceModels::new();
//! models.registrar().register_models(&ModuleId::new("app"), Arc::new(factory));
//!
//! let resource = repository.session().get_resource("/content/teaser").unwrap();
//! let model = models.mapper().adapt_to(&resource, "app.Teaser").unwrap().unwrap();
//! let title = model.downcast_ref::<DynamicModel>().and_then(|teaser| teaser.get("title"));
//! assert_eq!(title.and_then(|value| value.as_str()), Some("Hello"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::result_large_err)]

pub mod caching;
pub mod config;
pub mod error;
pub mod mapping;
pub mod metadata;
pub mod model;
pub mod registry;
pub mod resource;

mod models;

// Re-export main types
pub use caching::{CacheKey, LruModelCache, ResourceModelCache, ResourceModelCaches};
pub use config::{MappingConfig, RegistryConfig, ResultCacheConfig};
pub use error::{ModelError, Result};
pub use mapping::ResourceToModelMapper;
pub use metadata::{MappedFieldMetadata, ModelMetadataRegistrar, ResourceModelMetadata};
pub use model::{FieldValue, ModelDefinition, ModelFactory, ModelType, ResourceModel};
pub use models::ResourceModels;
pub use registry::{ModelRegistrar, ModelRegistry, ModelSource, ModuleId};
pub use resource::{PropertyValue, Resource, ResourceResolver};

/// Commonly used types
pub mod prelude {
    pub use crate::caching::{LruModelCache, ResourceModelCache};
    pub use crate::config::{MappingConfig, RegistryConfig, ResultCacheConfig};
    pub use crate::error::{ModelError, Result};
    pub use crate::model::{
        CollectionShape, DefinitionsFactory, DynamicModel, FieldDescriptor, FieldType, FieldValue,
        MethodDescriptor, ModelDefinition, ModelFactory, ModelType, ResourceModel, ResourceModelDeclaration,
        ScalarType,
    };
    pub use crate::models::ResourceModels;
    pub use crate::registry::{ModuleId, ProviderEvent};
    pub use crate::resource::{MemoryRepository, PropertyValue, Resource, ResourceData, ResourceResolver};
}
