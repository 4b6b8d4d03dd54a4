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

//! Resource model types, instances and field values
//!
//! This module contains the declarative description of model types, the
//! contract model providers implement and the values the mapper injects,
//! including the deferred values used for lazily mapped fields.

pub mod dynamic;
pub mod factory;
pub mod lazy;
pub mod types;
pub mod value;

pub use dynamic::DynamicModel;
pub use factory::{
    DefinitionsFactory, ModelDefinition, ModelFactory, ResourceModel, ResourceModelDeclaration,
    ResourceModelPostProcessor,
};
pub use lazy::{Lazy, LazyCollection, LazyValue};
pub use types::{
    ChildrenMapping, CollectionShape, FieldDescriptor, FieldType, MethodDescriptor, ModelType,
    ReferenceMapping, ScalarType,
};
pub use value::{FieldValue, ModelCollection};
