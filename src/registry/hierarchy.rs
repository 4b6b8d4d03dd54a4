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

//! The types a resource can be mapped by, most specific first

use crate::resource::Resource;
use indexmap::IndexSet;

/// Ordered, duplicate-free type hierarchy of a resource
///
/// The order is:
/// 1. the declared resource type
/// 2. the super type declared on the resource, else the parent of the resource type
/// 3. the remaining parent resource types, as resolved by the resource's resolver
/// 4. the primary node type followed by its super types
/// 5. every mixin node type followed by its super types
///
/// A cycle in the resource type inheritance ends the resource type chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappableTypeHierarchy {
    types: IndexSet<String>,
}

impl MappableTypeHierarchy {
    /// Compute the hierarchy of a resource
    pub fn of(resource: &dyn Resource) -> Self {
        let resolver = resource.resolver();
        let mut types = IndexSet::new();

        let mut current = Some(resource.resource_type().to_string());
        let mut first = true;
        while let Some(resource_type) = current.take() {
            if resource_type.is_empty() || !types.insert(resource_type.clone()) {
                break;
            }
            current = match resource.resource_super_type() {
                Some(super_type) if first => Some(super_type.to_string()),
                _ => resolver.parent_resource_type(&resource_type),
            };
            first = false;
        }

        if let Some(node_types) = resource.node_types() {
            let node_hierarchy = std::iter::once(&node_types.primary).chain(&node_types.mixins);
            for node_type in node_hierarchy {
                types.insert(node_type.clone());
                types.extend(resolver.node_super_types(node_type));
            }
        }

        Self { types }
    }

    /// Iterate over the types, most specific first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }

    /// Number of types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the hierarchy is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether the hierarchy contains `resource_type`
    pub fn contains(&self, resource_type: &str) -> bool {
        self.types.contains(resource_type)
    }
}

impl<'a> IntoIterator for &'a MappableTypeHierarchy {
    type Item = &'a String;
    type IntoIter = indexmap::set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{MemoryRepository, NodeTypes, ResourceData, ResourceResolver};

    #[test]
    fn test_resource_type_chain_then_node_types() {
        let repository = MemoryRepository::new();
        repository.add(
            ResourceData::new("/content/page", "app/homepage")
                .with_super_type("app/page")
                .with_node_types(NodeTypes::new("cq:Page").with_mixin("mix:versionable")),
        );
        repository.declare_parent_type("app/page", "foundation/page");
        repository.declare_node_super_types("cq:Page", &["nt:hierarchyNode", "nt:base"]);
        repository.declare_node_super_types("mix:versionable", &["mix:referenceable", "nt:base"]);

        let resource = repository.session().get_resource("/content/page").unwrap();
        let hierarchy = MappableTypeHierarchy::of(resource.as_ref());

        let types: Vec<&str> = hierarchy.iter().collect();
        assert_eq!(
            types,
            vec![
                "app/homepage",
                "app/page",
                "foundation/page",
                "cq:Page",
                "nt:hierarchyNode",
                "nt:base",
                "mix:versionable",
                "mix:referenceable",
            ]
        );
    }

    #[test]
    fn test_parent_types_without_declared_super_type() {
        let repository = MemoryRepository::new();
        repository.add(ResourceData::new("/a", "app/teaser"));
        repository.declare_parent_type("app/teaser", "app/component");

        let resource = repository.session().get_resource("/a").unwrap();
        let hierarchy = MappableTypeHierarchy::of(resource.as_ref());
        let types: Vec<&str> = hierarchy.iter().collect();
        assert_eq!(types, vec!["app/teaser", "app/component"]);
    }

    #[test]
    fn test_cyclic_inheritance_terminates() {
        let repository = MemoryRepository::new();
        repository.add(ResourceData::new("/a", "app/a"));
        repository.declare_parent_type("app/a", "app/b");
        repository.declare_parent_type("app/b", "app/a");

        let resource = repository.session().get_resource("/a").unwrap();
        let hierarchy = MappableTypeHierarchy::of(resource.as_ref());
        assert_eq!(hierarchy.len(), 2);
        assert!(hierarchy.contains("app/b"));
    }
}
