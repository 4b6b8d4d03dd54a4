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

//! Mapping metadata of a single model field
//!
//! The metadata is derived once, when the declaring model type is registered,
//! and is immutable afterwards. Declarations the mapper cannot support are
//! rejected here so they fail at registration rather than while mapping.

use super::path::ResourcePath;
use crate::error::{ModelError, Result};
use crate::model::{CollectionShape, FieldDescriptor, FieldType, FieldValue, LazyCollection, ModelType};
use std::hash::{Hash, Hasher};

/// Immutable mapping metadata of a model field
///
/// Fields declared as [`Lazy`](crate::model::Lazy) holders are described by
/// their value type: [`field_type`](Self::field_type) is the unwrapped type and
/// [`is_lazy`](Self::is_lazy) records the holder.
#[derive(Debug, Clone)]
pub struct MappedFieldMetadata {
    declaring_model: String,
    name: String,
    declared_type: FieldType,
    field_type: FieldType,
    path: ResourcePath,
    is_path_explicit: bool,
    is_lazy: bool,
    is_reference: bool,
    is_this_reference: bool,
    is_children: bool,
    is_property_type: bool,
    is_collection_type: bool,
    is_instantiable_collection_type: bool,
    type_parameter: Option<FieldType>,
    array_type_of_type_parameter: Option<FieldType>,
    append_path: Option<ResourcePath>,
    resolve_below_every_child_path: Option<ResourcePath>,
    collection_proxy: Option<CollectionShape>,
}

impl MappedFieldMetadata {
    /// Derive the metadata of `field` declared on `model_type`
    pub fn new(field: &FieldDescriptor, model_type: &ModelType) -> Result<Self> {
        let invalid = |reason: &str| ModelError::invalid_field(&model_type.name, &field.name, reason);

        let is_lazy = matches!(field.field_type, FieldType::Lazy(_));
        let field_type = match &field.field_type {
            FieldType::Lazy(None) => {
                return Err(invalid("a deferred field must declare its value type"));
            }
            FieldType::Lazy(Some(inner)) if matches!(**inner, FieldType::Lazy(_)) => {
                return Err(invalid("deferred fields cannot be nested"));
            }
            FieldType::Lazy(Some(inner)) => (**inner).clone(),
            other => other.clone(),
        };

        let path = match &field.path {
            Some(path) if path.trim().is_empty() => {
                return Err(invalid("the mapping path must not be empty"));
            }
            Some(path) => ResourcePath::new(path.trim()),
            None => ResourcePath::new(field.name.as_str()),
        };

        let type_parameter = match &field_type {
            FieldType::Collection {
                element: Some(element),
                ..
            } => Some((**element).clone()),
            FieldType::Collection { element: None, .. } => {
                return Err(invalid("unable to resolve the element type of the collection"));
            }
            FieldType::Array(component) => Some((**component).clone()),
            _ => None,
        };
        let array_type_of_type_parameter = type_parameter.clone().map(FieldType::array_of);

        let is_reference = field.reference.is_some();
        let is_children = field.children.is_some();
        let is_collection_type = field_type.is_collection();
        let is_instantiable_collection_type = matches!(
            &field_type,
            FieldType::Collection { shape, .. } if shape.is_instantiable()
        );

        // References are stored as string or string array properties
        let is_property_type = is_reference
            || field_type.is_scalar()
            || (matches!(field_type, FieldType::Array(_) | FieldType::Collection { .. })
                && type_parameter.as_ref().is_some_and(FieldType::is_scalar));

        if ((is_reference && is_collection_type) || is_children) && !is_instantiable_collection_type {
            return Err(ModelError::unsupported_field_type(
                &model_type.name,
                &field.name,
                CollectionShape::supported_shapes(),
            ));
        }

        let append_path = field
            .reference
            .as_ref()
            .and_then(|reference| ResourcePath::absolute(&reference.append));
        let resolve_below_every_child_path = field
            .children
            .as_ref()
            .and_then(|children| ResourcePath::relative(&children.resolve_below_every_child));

        let collection_proxy = match &field_type {
            FieldType::Collection { shape, .. } if shape.is_instantiable() => Some(shape.clone()),
            _ => None,
        };

        Ok(Self {
            declaring_model: model_type.name.clone(),
            name: field.name.clone(),
            declared_type: field.field_type.clone(),
            field_type,
            path,
            is_path_explicit: field.path.is_some(),
            is_lazy,
            is_reference,
            is_this_reference: field.this,
            is_children,
            is_property_type,
            is_collection_type,
            is_instantiable_collection_type,
            type_parameter,
            array_type_of_type_parameter,
            append_path,
            resolve_below_every_child_path,
            collection_proxy,
        })
    }

    /// Name of the model type declaring the field
    pub fn declaring_model(&self) -> &str {
        &self.declaring_model
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type as declared, including a deferred holder
    pub fn declared_type(&self) -> &FieldType {
        &self.declared_type
    }

    /// The effective type, with a deferred holder unwrapped
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// The path the field is mapped from
    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    /// Whether the path was declared explicitly rather than derived from the field name
    pub fn is_path_explicit(&self) -> bool {
        self.is_path_explicit
    }

    /// Whether the field is declared as a deferred holder
    pub fn is_lazy(&self) -> bool {
        self.is_lazy
    }

    /// Whether the field holds reference paths
    pub fn is_reference(&self) -> bool {
        self.is_reference
    }

    /// Whether the field maps the resource itself
    pub fn is_this_reference(&self) -> bool {
        self.is_this_reference
    }

    /// Whether the field maps children
    pub fn is_children(&self) -> bool {
        self.is_children
    }

    /// Whether the value comes from a property rather than a resource
    pub fn is_property_type(&self) -> bool {
        self.is_property_type
    }

    /// Whether the effective type is a collection
    pub fn is_collection_type(&self) -> bool {
        self.is_collection_type
    }

    /// Whether the effective type is a collection the mapper can instantiate
    pub fn is_instantiable_collection_type(&self) -> bool {
        self.is_instantiable_collection_type
    }

    /// Element type of a collection or component type of an array
    pub fn type_parameter(&self) -> Option<&FieldType> {
        self.type_parameter.as_ref()
    }

    /// Array type whose component is the type parameter
    pub fn array_type_of_type_parameter(&self) -> Option<&FieldType> {
        self.array_type_of_type_parameter.as_ref()
    }

    /// Path appended to every referenced path
    pub fn append_path(&self) -> Option<&ResourcePath> {
        self.append_path.as_ref()
    }

    /// Relative path resolved below every child
    pub fn resolve_below_every_child_path(&self) -> Option<&ResourcePath> {
        self.resolve_below_every_child_path.as_ref()
    }

    /// Whether the value is resolved on first access rather than while mapping
    pub fn is_lazy_loaded(&self) -> bool {
        self.is_lazy || self.is_children || (self.is_reference && self.is_instantiable_collection_type)
    }

    /// A collection standing in for the field's value, loaded by `factory` on first use
    ///
    /// Only instantiable collection fields have a proxy.
    pub fn lazy_loading_proxy<F>(&self, factory: F) -> Result<LazyCollection<FieldValue>>
    where
        F: FnOnce() -> Result<Vec<FieldValue>> + Send + 'static,
    {
        match &self.collection_proxy {
            Some(shape) => Ok(LazyCollection::new(shape.clone(), factory)),
            None => Err(ModelError::ProxyUnavailable {
                model_type: self.declaring_model.clone(),
                field: self.name.clone(),
            }),
        }
    }
}

impl PartialEq for MappedFieldMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_model == other.declaring_model && self.name == other.name
    }
}

impl Eq for MappedFieldMetadata {}

impl Hash for MappedFieldMetadata {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.declaring_model.hash(state);
        self.name.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScalarType;
    use crate::resource::PropertyValue;

    fn metadata(field: FieldDescriptor) -> Result<MappedFieldMetadata> {
        let model_type = ModelType::new("app.Teaser").with_field(field.clone());
        MappedFieldMetadata::new(&field, &model_type)
    }

    #[test]
    fn test_path_defaults_to_field_name() {
        let field = metadata(FieldDescriptor::new("title", FieldType::string())).unwrap();
        assert_eq!(field.path().as_str(), "title");
        assert!(!field.is_path_explicit());
        assert!(field.is_property_type());
        assert!(!field.is_lazy_loaded());

        let field =
            metadata(FieldDescriptor::new("title", FieldType::string()).with_path("jcr:title")).unwrap();
        assert_eq!(field.path().as_str(), "jcr:title");
        assert!(field.is_path_explicit());
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let result = metadata(FieldDescriptor::new("title", FieldType::string()).with_path(" "));
        assert!(matches!(result, Err(ModelError::InvalidField { .. })));
    }

    #[test]
    fn test_lazy_holder_is_transparent() {
        let field = metadata(FieldDescriptor::new(
            "link",
            FieldType::lazy(FieldType::model("app.Link")),
        ))
        .unwrap();
        assert!(field.is_lazy());
        assert_eq!(field.field_type(), &FieldType::model("app.Link"));
        assert!(!field.is_property_type());
        assert!(field.is_lazy_loaded());

        let raw = metadata(FieldDescriptor::new("link", FieldType::Lazy(None)));
        assert!(matches!(raw, Err(ModelError::InvalidField { .. })));
    }

    #[test]
    fn test_collections_of_scalars_are_property_types() {
        let field = metadata(FieldDescriptor::new(
            "tags",
            FieldType::list_of(FieldType::Scalar(ScalarType::String)),
        ))
        .unwrap();
        assert!(field.is_property_type());
        assert!(field.is_instantiable_collection_type());
        assert_eq!(field.type_parameter(), Some(&FieldType::string()));
        assert_eq!(
            field.array_type_of_type_parameter(),
            Some(&FieldType::array_of(FieldType::string()))
        );

        let field = metadata(FieldDescriptor::new(
            "scores",
            FieldType::array_of(FieldType::Scalar(ScalarType::Int)),
        ))
        .unwrap();
        assert!(field.is_property_type());
        assert!(!field.is_collection_type());
    }

    #[test]
    fn test_reference_classification() {
        let field = metadata(
            FieldDescriptor::new("links", FieldType::list_of(FieldType::model("app.Link")))
                .reference_with_append("jcr:content"),
        )
        .unwrap();
        assert!(field.is_reference());
        assert!(field.is_property_type());
        assert!(field.is_lazy_loaded());
        assert_eq!(field.append_path().map(ResourcePath::as_str), Some("/jcr:content"));
    }

    #[test]
    fn test_explicit_mapping_requires_instantiable_collection() {
        let concrete = FieldType::collection_of(
            CollectionShape::Concrete("LinkedList".into()),
            FieldType::model("app.Link"),
        );

        let result = metadata(FieldDescriptor::new("links", concrete.clone()).reference());
        assert_eq!(
            result.unwrap_err(),
            ModelError::unsupported_field_type("app.Teaser", "links", "Collection, List, Set")
        );

        let result = metadata(FieldDescriptor::new("children", FieldType::model("app.Link")).children());
        assert!(matches!(result, Err(ModelError::UnsupportedFieldType { .. })));

        // Without explicit mapping, a concrete collection is accepted but has no proxy
        let field = metadata(FieldDescriptor::new("links", concrete)).unwrap();
        assert!(!field.is_instantiable_collection_type());
        assert!(matches!(
            field.lazy_loading_proxy(|| Ok(Vec::new())),
            Err(ModelError::ProxyUnavailable { .. })
        ));
    }

    #[test]
    fn test_children_below_every_child() {
        let field = metadata(
            FieldDescriptor::new("pages", FieldType::list_of(FieldType::model("app.Page")))
                .children_below("/jcr:content"),
        )
        .unwrap();
        assert!(field.is_children());
        assert_eq!(
            field.resolve_below_every_child_path().map(ResourcePath::as_str),
            Some("jcr:content")
        );
    }

    #[test]
    fn test_lazy_loading_proxy() {
        let field = metadata(FieldDescriptor::new(
            "tags",
            FieldType::set_of(FieldType::string()),
        ))
        .unwrap();
        let proxy = field
            .lazy_loading_proxy(|| Ok(vec![FieldValue::from(PropertyValue::from("a"))]))
            .unwrap();
        assert_eq!(proxy.shape(), &CollectionShape::Set);
        assert!(!proxy.is_loaded());
        assert_eq!(proxy.len().unwrap(), 1);
    }

    #[test]
    fn test_identity_is_declaring_model_and_name() {
        let a = metadata(FieldDescriptor::new("title", FieldType::string())).unwrap();
        let b = metadata(FieldDescriptor::new("title", FieldType::string()).with_path("other")).unwrap();
        assert_eq!(a, b);
    }
}
