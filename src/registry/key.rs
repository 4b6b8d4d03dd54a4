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

//! Keys of the registry lookup cache

use crate::resource::{Resource, ResolverId};
use smallvec::SmallVec;

/// What a registry lookup asks for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupQualifier {
    /// The most specific models
    MostSpecific,
    /// The most specific models assignable to a type
    TargetType(String),
    /// The most specific models with a name
    ModelName(String),
    /// All models of the whole hierarchy
    AllModels,
}

/// Key of a memoized registry lookup
///
/// Holds every resource attribute the lookup result depends on. The node
/// types are part of the key since the same resource type may be used by
/// structurally different nodes. The resolver identity is included because
/// parent resource types are resolved through the resource's session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey {
    path: String,
    resource_type: String,
    super_type: Option<String>,
    primary_type: Option<String>,
    mixins: SmallVec<[String; 2]>,
    resolver: ResolverId,
    qualifier: LookupQualifier,
}

impl LookupKey {
    /// Create the key of a lookup for `resource`
    pub fn new(resource: &dyn Resource, qualifier: LookupQualifier) -> Self {
        let node_types = resource.node_types();
        Self {
            path: resource.path().to_string(),
            resource_type: resource.resource_type().to_string(),
            super_type: resource.resource_super_type().map(str::to_string),
            primary_type: node_types.map(|types| types.primary.clone()),
            mixins: node_types
                .map(|types| types.mixins.iter().cloned().collect())
                .unwrap_or_default(),
            resolver: resource.resolver().id(),
            qualifier,
        }
    }

    /// The lookup qualifier
    pub fn qualifier(&self) -> &LookupQualifier {
        &self.qualifier
    }
}
