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

//! Model registration and resolution
//!
//! The [`ModelRegistry`] maps resource types to [`ModelSource`]s and resolves
//! the most specific models for a resource. The [`ModelRegistrar`] feeds it
//! from model factories as they come and go.

pub mod hierarchy;
pub mod key;
pub mod model_registry;
pub mod registrar;
pub mod source;

pub use hierarchy::MappableTypeHierarchy;
pub use key::{LookupKey, LookupQualifier};
pub use model_registry::{LookupResult, ModelRegistry, TypeMappingView};
pub use registrar::{ModelRegistrar, ProviderEvent, RegistrationListener, RegistrationReport};
pub use source::{ModelSource, ModuleId, ResolvedModelSource};
