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

//! Error types for resource model registration and mapping

use thiserror::Error;

/// Result type alias for resource model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while registering, resolving or mapping resource models
///
/// Configuration errors (invalid field declarations, incomplete model
/// declarations) surface at registration time. Everything else is raised
/// while a resource is mapped onto a model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A mapped field is declared in a way the mapper cannot support
    #[error("Invalid mapping of field '{field}' in model '{model_type}': {reason}")]
    InvalidField {
        /// Model type declaring the field
        model_type: String,
        /// Field name
        field: String,
        /// What is wrong with the declaration
        reason: String,
    },

    /// Explicit reference or children mapping on a collection type the mapper cannot instantiate
    #[error("Unsupported type of field '{field}' in model '{model_type}': only {supported} are supported")]
    UnsupportedFieldType {
        /// Model type declaring the field
        model_type: String,
        /// Field name
        field: String,
        /// The supported collection shapes
        supported: String,
    },

    /// Neither the current nor the legacy declaration accessor yields resource types
    #[error("The declaration of model '{model_name}' does not specify any resource types")]
    IncompleteDeclaration {
        /// Name of the model definition
        model_name: String,
    },

    /// The model factory failed to provide an instance
    #[error("Unable to create model '{model_name}': {reason}")]
    ModelCreation {
        /// Name of the model definition
        model_name: String,
        /// Failure reported by the factory
        reason: String,
    },

    /// A resolved value could not be injected into the model
    #[error("Unable to inject field '{field}' of model '{model_type}': {reason}")]
    FieldInjection {
        /// Model type
        model_type: String,
        /// Field name
        field: String,
        /// Failure reported by the model
        reason: String,
    },

    /// More than one model is registered at the most specific type level
    #[error("Resource {resource_path} maps to more than one model for '{target}': {candidates:?}")]
    AmbiguousModels {
        /// Path of the resource being adapted
        resource_path: String,
        /// Requested target type or model name
        target: String,
        /// Names of the competing models
        candidates: Vec<String>,
    },

    /// A lazy-loading proxy was requested for a field that is not an instantiable collection
    #[error("Field '{field}' of model '{model_type}' has no lazy-loading proxy")]
    ProxyUnavailable {
        /// Model type
        model_type: String,
        /// Field name
        field: String,
    },

    /// A deferred value failed to load
    #[error("Lazy loading failed: {reason}")]
    LazyLoading {
        /// Failure reason
        reason: String,
    },

    /// A cache backend failed to serve or store an entry
    #[error("Cache backend '{backend}' failed: {reason}")]
    CacheBackend {
        /// Backend name
        backend: String,
        /// Failure reason
        reason: String,
    },

    /// Nested mappings exceeded the configured depth
    #[error("Mapping of {path} exceeded the maximum nesting depth of {depth}")]
    MappingDepthExceeded {
        /// Path of the resource being mapped
        path: String,
        /// Configured maximum depth
        depth: usize,
    },

    /// A property value cannot be converted to the requested type
    #[error("Cannot convert {from} to {to}")]
    Conversion {
        /// Source value description
        from: String,
        /// Target type
        to: String,
    },
}

impl ModelError {
    /// Create an invalid field error
    pub fn invalid_field(
        model_type: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            model_type: model_type.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported field type error
    pub fn unsupported_field_type(
        model_type: impl Into<String>,
        field: impl Into<String>,
        supported: impl Into<String>,
    ) -> Self {
        Self::UnsupportedFieldType {
            model_type: model_type.into(),
            field: field.into(),
            supported: supported.into(),
        }
    }

    /// Create an incomplete declaration error
    pub fn incomplete_declaration(model_name: impl Into<String>) -> Self {
        Self::IncompleteDeclaration {
            model_name: model_name.into(),
        }
    }

    /// Create a model creation error
    pub fn model_creation(model_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ModelCreation {
            model_name: model_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a field injection error
    pub fn field_injection(
        model_type: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::FieldInjection {
            model_type: model_type.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a lazy loading error
    pub fn lazy_loading(reason: impl Into<String>) -> Self {
        Self::LazyLoading {
            reason: reason.into(),
        }
    }

    /// Create a cache backend error
    pub fn cache_backend(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CacheBackend {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Conversion {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Whether this error stems from a model or field declaration rather than from mapping
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidField { .. }
                | Self::UnsupportedFieldType { .. }
                | Self::IncompleteDeclaration { .. }
        )
    }
}
