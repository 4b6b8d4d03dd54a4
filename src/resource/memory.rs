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

//! In-memory content repository for testing and embedding

use super::{NodeTypes, PropertyValue, Resource, ResourceResolver, ResolverId, ValueMap};
use super::{normalize_path, parent_of};
use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stored state of a single resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceData {
    /// Absolute path
    pub path: String,
    /// Declared resource type
    pub resource_type: String,
    /// Super type declared on the resource
    pub super_type: Option<String>,
    /// Node types, if the resource is node-backed
    pub node_types: Option<NodeTypes>,
    /// Properties
    pub properties: ValueMap,
}

impl ResourceData {
    /// Create resource data without properties
    pub fn new(path: impl AsRef<str>, resource_type: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            resource_type: resource_type.into(),
            super_type: None,
            node_types: None,
            properties: ValueMap::new(),
        }
    }

    /// Set the super type declared on the resource
    pub fn with_super_type(mut self, super_type: impl Into<String>) -> Self {
        self.super_type = Some(super_type.into());
        self
    }

    /// Set the node types
    pub fn with_node_types(mut self, node_types: NodeTypes) -> Self {
        self.node_types = Some(node_types);
        self
    }

    /// Add a property
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name, value);
        self
    }
}

/// A repository holding resources in insertion order
#[derive(Debug, Default)]
pub struct MemoryRepository {
    /// Resources by path
    nodes: RwLock<IndexMap<String, Arc<ResourceData>>>,
    /// Resource type inheritance (type -> parent type)
    parent_types: RwLock<FxHashMap<String, String>>,
    /// Node type inheritance (node type -> super types)
    node_super_types: RwLock<FxHashMap<String, Vec<String>>>,
    /// Last issued session identity
    sessions: AtomicU64,
}

impl MemoryRepository {
    /// Create an empty repository
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add or replace a resource
    pub fn add(&self, data: ResourceData) {
        self.nodes.write().insert(data.path.clone(), Arc::new(data));
    }

    /// Remove a resource and its descendants; returns the number of removed resources
    pub fn remove(&self, path: &str) -> usize {
        let path = normalize_path(path);
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let mut nodes = self.nodes.write();
        let before = nodes.len();
        nodes.retain(|candidate, _| candidate != &path && !candidate.starts_with(&prefix));
        before - nodes.len()
    }

    /// Declare the parent of a resource type
    pub fn declare_parent_type(&self, resource_type: impl Into<String>, parent: impl Into<String>) {
        self.parent_types
            .write()
            .insert(resource_type.into(), parent.into());
    }

    /// Declare the super types of a node type, most specific first
    pub fn declare_node_super_types(&self, node_type: impl Into<String>, super_types: &[&str]) {
        self.node_super_types.write().insert(
            node_type.into(),
            super_types.iter().map(|name| name.to_string()).collect(),
        );
    }

    /// Open a new resolver session
    pub fn session(self: &Arc<Self>) -> MemorySession {
        let id = self.sessions.fetch_add(1, Ordering::Relaxed) + 1;
        MemorySession {
            id: ResolverId(id),
            repository: Arc::clone(self),
        }
    }

    /// Number of stored resources
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Whether the repository is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    fn data(&self, path: &str) -> Option<Arc<ResourceData>> {
        self.nodes.read().get(path).cloned()
    }

    fn children_of(&self, path: &str) -> Vec<Arc<ResourceData>> {
        self.nodes
            .read()
            .values()
            .filter(|data| parent_of(&data.path) == Some(path))
            .cloned()
            .collect()
    }
}

/// A resolver session on a [`MemoryRepository`]
#[derive(Debug, Clone)]
pub struct MemorySession {
    id: ResolverId,
    repository: Arc<MemoryRepository>,
}

impl MemorySession {
    /// Resolve a resource as its concrete type
    pub fn resource(&self, path: &str) -> Option<Arc<MemoryResource>> {
        self.repository
            .data(&normalize_path(path))
            .map(|data| Arc::new(MemoryResource::new(data, self.clone())))
    }
}

impl ResourceResolver for MemorySession {
    fn id(&self) -> ResolverId {
        self.id
    }

    fn get_resource(&self, path: &str) -> Option<Arc<dyn Resource>> {
        self.resource(path).map(|resource| resource as Arc<dyn Resource>)
    }

    fn parent_resource_type(&self, resource_type: &str) -> Option<String> {
        self.repository.parent_types.read().get(resource_type).cloned()
    }

    fn node_super_types(&self, node_type: &str) -> Vec<String> {
        self.repository
            .node_super_types
            .read()
            .get(node_type)
            .cloned()
            .unwrap_or_default()
    }
}

/// A resource of a [`MemoryRepository`]
#[derive(Debug)]
pub struct MemoryResource {
    data: Arc<ResourceData>,
    session: MemorySession,
}

impl MemoryResource {
    fn new(data: Arc<ResourceData>, session: MemorySession) -> Self {
        Self { data, session }
    }
}

impl Resource for MemoryResource {
    fn path(&self) -> &str {
        &self.data.path
    }

    fn resource_type(&self) -> &str {
        &self.data.resource_type
    }

    fn resource_super_type(&self) -> Option<&str> {
        self.data.super_type.as_deref()
    }

    fn node_types(&self) -> Option<&NodeTypes> {
        self.data.node_types.as_ref()
    }

    fn properties(&self) -> &ValueMap {
        &self.data.properties
    }

    fn children(&self) -> Vec<Arc<dyn Resource>> {
        self.session
            .repository
            .children_of(&self.data.path)
            .into_iter()
            .map(|data| Arc::new(MemoryResource::new(data, self.session.clone())) as Arc<dyn Resource>)
            .collect()
    }

    fn resolver(&self) -> Arc<dyn ResourceResolver> {
        Arc::new(self.session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> Arc<MemoryRepository> {
        let repository = MemoryRepository::new();
        repository.add(ResourceData::new("/content", "app/root"));
        repository.add(
            ResourceData::new("/content/page", "app/page")
                .with_super_type("app/base")
                .with_property("title", "Home"),
        );
        repository.add(ResourceData::new("/content/page/a", "app/teaser"));
        repository.add(ResourceData::new("/content/page/b", "app/teaser"));
        repository.add(ResourceData::new("/content/page/a/deep", "app/text"));
        repository
    }

    #[test]
    fn test_resolution_and_children() {
        let session = repository().session();
        let page = session.get_resource("/content/page").unwrap();

        assert_eq!(page.name(), "page");
        assert_eq!(page.resource_super_type(), Some("app/base"));
        assert_eq!(page.properties().get("title"), Some(&PropertyValue::from("Home")));

        let children: Vec<String> = page.children().iter().map(|c| c.path().to_string()).collect();
        assert_eq!(children, vec!["/content/page/a", "/content/page/b"]);

        let deep = page.child("a/deep").unwrap();
        assert_eq!(deep.resource_type(), "app/text");
        assert!(page.child("missing").is_none());
    }

    #[test]
    fn test_sessions_have_distinct_identities() {
        let repository = repository();
        let first = repository.session();
        let second = repository.session();
        assert_ne!(first.id(), second.id());

        let page = first.get_resource("/content/page").unwrap();
        assert_eq!(page.resolver().id(), first.id());
    }

    #[test]
    fn test_remove_includes_descendants() {
        let repository = repository();
        assert_eq!(repository.remove("/content/page/a"), 2);
        assert_eq!(repository.len(), 3);
    }

    #[test]
    fn test_type_inheritance_declarations() {
        let repository = repository();
        repository.declare_parent_type("app/page", "foundation/page");
        repository.declare_node_super_types("cq:Page", &["nt:hierarchyNode", "nt:base"]);

        let session = repository.session();
        assert_eq!(
            session.parent_resource_type("app/page"),
            Some("foundation/page".to_string())
        );
        assert_eq!(session.node_super_types("cq:Page").len(), 2);
        assert!(session.node_super_types("nt:unstructured").is_empty());
    }
}
