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

//! Keys of cached mapping results

use crate::registry::ModelSource;
use crate::resource::{Resource, ResolverId};
use std::fmt;

/// Identity of a mapping result
///
/// Equal keys denote interchangeable results: the same resource, seen through
/// the same resolver session, with the same resource type, mapped onto the
/// same model type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    path: String,
    model_type: String,
    resource_type: String,
    resolver: ResolverId,
}

impl CacheKey {
    /// The key of mapping `resource` onto the model type of `source`
    pub fn new(resource: &dyn Resource, source: &ModelSource) -> Self {
        Self::for_model_type(resource, source.type_name())
    }

    /// The key of mapping `resource` onto `model_type`
    pub fn for_model_type(resource: &dyn Resource, model_type: &str) -> Self {
        Self {
            path: resource.path().to_string(),
            model_type: model_type.to_string(),
            resource_type: resource.resource_type().to_string(),
            resolver: resource.resolver().id(),
        }
    }

    /// Path of the resource
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name of the model type
    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    /// Resource type at the time of mapping
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Resolver session identity
    pub fn resolver(&self) -> ResolverId {
        self.resolver
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] as {} via {}",
            self.path, self.resource_type, self.model_type, self.resolver
        )
    }
}
