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

//! Content repository resources
//!
//! The repository itself is external. This module defines the narrow contract
//! the registry and the mapper consume: a resource exposes its path, declared
//! type, super type, repository node types, properties and children, and a
//! resolver session resolves paths and resource type inheritance.

pub mod memory;
pub mod value;

pub use memory::{MemoryRepository, MemoryResource, MemorySession, ResourceData};
pub use value::{PropertyValue, ValueMap};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of a resolver session
///
/// Two lookups through different sessions may observe different content,
/// e.g. because of access control, so results cached per resource are keyed
/// by the session identity as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolverId(pub u64);

impl fmt::Display for ResolverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resolver#{}", self.0)
    }
}

/// Primary and mixin node types of a repository node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeTypes {
    /// Primary node type, e.g. `nt:unstructured`
    pub primary: String,
    /// Mixin node types in declaration order
    pub mixins: Vec<String>,
}

impl NodeTypes {
    /// Create node types with the given primary type and no mixins
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            mixins: Vec::new(),
        }
    }

    /// Add a mixin type
    pub fn with_mixin(mut self, mixin: impl Into<String>) -> Self {
        self.mixins.push(mixin.into());
        self
    }
}

/// A node in the content repository
pub trait Resource: Send + Sync + fmt::Debug {
    /// Absolute path of the resource
    fn path(&self) -> &str;

    /// Last segment of the path
    fn name(&self) -> &str {
        name_of(self.path())
    }

    /// Declared resource type
    fn resource_type(&self) -> &str;

    /// Super type declared on the resource itself, if any
    fn resource_super_type(&self) -> Option<&str>;

    /// Node types, or `None` if the resource is not backed by a repository node
    fn node_types(&self) -> Option<&NodeTypes>;

    /// Properties of the resource
    fn properties(&self) -> &ValueMap;

    /// Child resources in repository order
    fn children(&self) -> Vec<Arc<dyn Resource>>;

    /// The resolver session this resource was obtained from
    fn resolver(&self) -> Arc<dyn ResourceResolver>;

    /// Resolve a resource relative to this one
    fn child(&self, relative_path: &str) -> Option<Arc<dyn Resource>> {
        self.resolver()
            .get_resource(&resolve_path(self.path(), relative_path))
    }
}

/// A session on the content repository
pub trait ResourceResolver: Send + Sync {
    /// Identity of this session
    fn id(&self) -> ResolverId;

    /// Resolve an absolute path
    fn get_resource(&self, path: &str) -> Option<Arc<dyn Resource>>;

    /// The type a resource type inherits from
    fn parent_resource_type(&self, _resource_type: &str) -> Option<String> {
        None
    }

    /// Declared super types of a node type, most specific first
    fn node_super_types(&self, _node_type: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Resolve `relative` against `base`
///
/// Absolute paths are only normalized. `.` and `..` segments are collapsed;
/// `..` above the root stays at the root.
pub fn resolve_path(base: &str, relative: &str) -> String {
    if relative.starts_with('/') {
        normalize_path(relative)
    } else {
        normalize_path(&format!("{base}/{relative}"))
    }
}

/// Collapse empty, `.` and `..` segments of an absolute path
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Parent path, or `None` for the root
pub fn parent_of(path: &str) -> Option<&str> {
    if path == "/" || path.is_empty() {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/"),
        Some(index) => Some(&path[..index]),
        None => None,
    }
}

/// Last segment of a path
pub fn name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
