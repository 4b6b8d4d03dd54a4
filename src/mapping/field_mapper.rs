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

//! Resolution of field values from a resource
//!
//! Every mappable field is resolved according to its metadata:
//!
//! - `this` fields receive the resource itself or its adaptation
//! - reference fields resolve the paths stored in a property
//! - children fields receive the children of a resource
//! - property fields receive converted property values
//! - everything else is resolved from the child resource at the field path
//!
//! Reference collections and children are loaded on first access through the
//! field's lazy-loading proxy. Fields declared as deferred holders are wrapped
//! as a whole; their collections are then loaded together with the holder.

use super::mapper::ResourceToModelMapper;
use crate::error::Result;
use crate::metadata::MappedFieldMetadata;
use crate::model::{CollectionShape, FieldType, FieldValue, Lazy, ModelCollection, ScalarType};
use crate::resource::{resolve_path, Resource};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectionLoading {
    Deferred,
    Eager,
}

/// Resolves the values of mapped fields for one model instance
#[derive(Clone)]
pub struct FieldValueMapper {
    mapper: ResourceToModelMapper,
    depth: usize,
}

impl FieldValueMapper {
    /// Create a field mapper for a model mapped at the given nesting depth
    pub fn new(mapper: ResourceToModelMapper, depth: usize) -> Self {
        Self { mapper, depth }
    }

    /// Nesting depth of the model whose fields are resolved
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The value of `field` for `resource`, or `None` if nothing resolves
    pub fn resolve(&self, resource: &Arc<dyn Resource>, field: &MappedFieldMetadata) -> Result<Option<FieldValue>> {
        if field.is_lazy() {
            let fields = self.clone();
            let resource = Arc::clone(resource);
            let field = field.clone();
            return Ok(Some(FieldValue::Lazy(Lazy::new(move || {
                fields.resolve_value(&resource, &field, CollectionLoading::Eager)
            }))));
        }
        self.resolve_value(resource, field, CollectionLoading::Deferred)
    }

    fn resolve_value(
        &self,
        resource: &Arc<dyn Resource>,
        field: &MappedFieldMetadata,
        loading: CollectionLoading,
    ) -> Result<Option<FieldValue>> {
        if field.is_this_reference() {
            return self.convert(Arc::clone(resource), field.field_type());
        }
        if field.is_reference() {
            return self.resolve_references(resource, field, loading);
        }
        if field.is_children() {
            return self.resolve_children(resource, field, loading);
        }
        if field.is_property_type() {
            return Ok(resolve_property(resource, field));
        }
        self.resolve_child(resource, field)
    }

    fn resolve_references(
        &self,
        resource: &Arc<dyn Resource>,
        field: &MappedFieldMetadata,
        loading: CollectionLoading,
    ) -> Result<Option<FieldValue>> {
        let Some(paths) = reference_paths(resource, field) else {
            return Ok(None);
        };
        let resolver = resource.resolver();

        match field.field_type() {
            FieldType::Collection { shape, element: Some(element) } => {
                let fields = self.clone();
                let element = (**element).clone();
                let collection_shape = shape.clone();
                let load = move || {
                    let targets = paths.iter().filter_map(|path| resolver.get_resource(path)).collect();
                    fields.convert_all(targets, &element, &collection_shape)
                };
                self.collection(field, shape, loading, load)
            }
            FieldType::Array(component) => {
                let targets = paths.iter().filter_map(|path| resolver.get_resource(path)).collect();
                let items = self.convert_all(targets, component, &CollectionShape::List)?;
                Ok(Some(FieldValue::Array(items)))
            }
            target => match paths.first().and_then(|path| resolver.get_resource(path)) {
                Some(referenced) => self.convert(referenced, target),
                None => Ok(None),
            },
        }
    }

    fn resolve_children(
        &self,
        resource: &Arc<dyn Resource>,
        field: &MappedFieldMetadata,
        loading: CollectionLoading,
    ) -> Result<Option<FieldValue>> {
        let FieldType::Collection { shape, element: Some(element) } = field.field_type() else {
            return Ok(None);
        };

        let fields = self.clone();
        let resource = Arc::clone(resource);
        let parent_path = field.is_path_explicit().then(|| field.path().clone());
        let below = field.resolve_below_every_child_path().cloned();
        let element = (**element).clone();
        let collection_shape = shape.clone();

        let load = move || {
            let parent = match &parent_path {
                Some(path) => resource.child(path.as_str()),
                None => Some(resource),
            };
            let Some(parent) = parent else {
                return Ok(Vec::new());
            };
            let children = parent
                .children()
                .into_iter()
                .filter_map(|child| match &below {
                    Some(below) => child.child(below.as_str()),
                    None => Some(child),
                })
                .collect();
            fields.convert_all(children, &element, &collection_shape)
        };
        self.collection(field, shape, loading, load)
    }

    fn resolve_child(&self, resource: &Arc<dyn Resource>, field: &MappedFieldMetadata) -> Result<Option<FieldValue>> {
        let Some(child) = resource.child(field.path().as_str()) else {
            return Ok(None);
        };

        match field.field_type() {
            FieldType::Collection { shape, element: Some(element) } => {
                let mut collection = ModelCollection::new(shape.clone());
                collection.extend(self.convert_all(child.children(), element, shape)?);
                Ok(Some(FieldValue::Collection(collection)))
            }
            FieldType::Array(component) => {
                let items = self.convert_all(child.children(), component, &CollectionShape::List)?;
                Ok(Some(FieldValue::Array(items)))
            }
            target => self.convert(child, target),
        }
    }

    fn collection<F>(
        &self,
        field: &MappedFieldMetadata,
        shape: &CollectionShape,
        loading: CollectionLoading,
        load: F,
    ) -> Result<Option<FieldValue>>
    where
        F: FnOnce() -> Result<Vec<FieldValue>> + Send + 'static,
    {
        match loading {
            CollectionLoading::Deferred => Ok(Some(FieldValue::LazyCollection(field.lazy_loading_proxy(load)?))),
            CollectionLoading::Eager => {
                let mut collection = ModelCollection::new(shape.clone());
                collection.extend(load()?);
                Ok(Some(FieldValue::Collection(collection)))
            }
        }
    }

    fn convert_all(
        &self,
        resources: Vec<Arc<dyn Resource>>,
        element: &FieldType,
        shape: &CollectionShape,
    ) -> Result<Vec<FieldValue>> {
        let mut collection = ModelCollection::new(shape.clone());
        for resource in resources {
            if let Some(value) = self.convert(resource, element)? {
                collection.push(value);
            }
        }
        Ok(collection.into_items())
    }

    fn convert(&self, resource: Arc<dyn Resource>, target: &FieldType) -> Result<Option<FieldValue>> {
        match target {
            FieldType::Resource => Ok(Some(FieldValue::Resource(resource))),
            FieldType::Model(type_name) => Ok(self
                .mapper
                .adapt_at_depth(&resource, type_name, self.depth + 1)?
                .map(FieldValue::Model)),
            other => {
                log::trace!("Cannot convert {} to {other}", resource.path());
                Ok(None)
            }
        }
    }
}

// Property paths may address a property of a descendant, e.g. "content/jcr:title"
fn property_owner(resource: &Arc<dyn Resource>, path: &str) -> Option<(Arc<dyn Resource>, String)> {
    match path.rsplit_once('/') {
        Some((parent, name)) => {
            let parent = if parent.is_empty() { "/" } else { parent };
            Some((resource.child(parent)?, name.to_string()))
        }
        None => Some((Arc::clone(resource), path.to_string())),
    }
}

fn resolve_property(resource: &Arc<dyn Resource>, field: &MappedFieldMetadata) -> Option<FieldValue> {
    let (owner, name) = property_owner(resource, field.path().as_str())?;
    let properties = owner.properties();

    match field.field_type() {
        FieldType::Scalar(scalar) => properties.get_as(&name, scalar).map(FieldValue::Property),
        FieldType::Collection { shape, .. } => {
            let FieldType::Scalar(scalar) = field.type_parameter()? else {
                return None;
            };
            let mut collection = ModelCollection::new(shape.clone());
            collection.extend(properties.get_all_as(&name, scalar)?.into_iter().map(FieldValue::Property));
            Some(FieldValue::Collection(collection))
        }
        FieldType::Array(_) => {
            let FieldType::Scalar(scalar) = field.type_parameter()? else {
                return None;
            };
            let items = properties.get_all_as(&name, scalar)?;
            Some(FieldValue::Array(items.into_iter().map(FieldValue::Property).collect()))
        }
        _ => None,
    }
}

// Referenced paths are resolved against the resource and suffixed with the append path
fn reference_paths(resource: &Arc<dyn Resource>, field: &MappedFieldMetadata) -> Option<Vec<String>> {
    let (owner, name) = property_owner(resource, field.path().as_str())?;
    let values = owner.properties().get_all_as(&name, &ScalarType::String)?;

    let paths = values
        .iter()
        .filter_map(|value| value.as_str())
        .filter(|path| !path.trim().is_empty())
        .map(|path| {
            let mut resolved = resolve_path(resource.path(), path.trim());
            if let Some(append) = field.append_path() {
                resolved = resolve_path(&resolved, append.as_str().trim_start_matches('/'));
            }
            resolved
        })
        .collect();
    Some(paths)
}
