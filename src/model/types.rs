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

//! Declarative descriptors of resource model types
//!
//! A model type declares its name, the types it is assignable to, its
//! mappable fields and its lifecycle methods. The descriptors are plain data;
//! the [`metadata`](crate::metadata) module derives the mapping metadata
//! from them once per model type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Types that are read from a resource property rather than from a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// `bool`
    Boolean,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// Text
    String,
    /// Point in time
    Date,
    /// Point in time with calendar semantics
    Calendar,
    /// An enumeration, read from a string property holding a constant name
    Enum {
        /// Name of the enumeration type
        type_name: String,
        /// Constant names
        constants: Vec<String>,
    },
}

impl ScalarType {
    /// An enumeration with the given constants
    pub fn enumeration<I, S>(type_name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum {
            type_name: type_name.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        }
    }

    /// Display name of the type
    pub fn name(&self) -> &str {
        match self {
            Self::Boolean => "boolean",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "String",
            Self::Date => "Date",
            Self::Calendar => "Calendar",
            Self::Enum { type_name, .. } => type_name,
        }
    }
}

/// The collection shape a field declares
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionShape {
    /// Any collection
    Collection,
    /// Ordered, allowing duplicates
    List,
    /// Distinct elements in insertion order
    Set,
    /// A concrete implementation type, e.g. `LinkedList`
    Concrete(String),
}

impl CollectionShape {
    /// The shapes the mapper can instantiate
    pub const INSTANTIABLE: [CollectionShape; 3] = [Self::Collection, Self::List, Self::Set];

    /// Whether the mapper controls the concrete instance for this shape
    pub fn is_instantiable(&self) -> bool {
        !matches!(self, Self::Concrete(_))
    }

    /// Comma separated names of the instantiable shapes
    pub fn supported_shapes() -> String {
        Self::INSTANTIABLE
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for CollectionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection => f.write_str("Collection"),
            Self::List => f.write_str("List"),
            Self::Set => f.write_str("Set"),
            Self::Concrete(name) => f.write_str(name),
        }
    }
}

/// Declared type of a model field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// A property-backed scalar
    Scalar(ScalarType),
    /// A raw resource
    Resource,
    /// Another model type, adapted from a resource
    Model(String),
    /// A fixed-size array of the component type
    Array(Box<FieldType>),
    /// A collection; `element` is `None` for a raw collection declaration
    Collection {
        /// Declared shape
        shape: CollectionShape,
        /// Element type
        element: Option<Box<FieldType>>,
    },
    /// A deferred value holder; `None` for a raw holder declaration
    Lazy(Option<Box<FieldType>>),
}

impl FieldType {
    /// A string field
    pub fn string() -> Self {
        Self::Scalar(ScalarType::String)
    }

    /// A model field
    pub fn model(type_name: impl Into<String>) -> Self {
        Self::Model(type_name.into())
    }

    /// A list of the given element type
    pub fn list_of(element: FieldType) -> Self {
        Self::Collection {
            shape: CollectionShape::List,
            element: Some(Box::new(element)),
        }
    }

    /// A set of the given element type
    pub fn set_of(element: FieldType) -> Self {
        Self::Collection {
            shape: CollectionShape::Set,
            element: Some(Box::new(element)),
        }
    }

    /// A collection of the given shape and element type
    pub fn collection_of(shape: CollectionShape, element: FieldType) -> Self {
        Self::Collection {
            shape,
            element: Some(Box::new(element)),
        }
    }

    /// An array of the given component type
    pub fn array_of(component: FieldType) -> Self {
        Self::Array(Box::new(component))
    }

    /// A deferred holder of the given type
    pub fn lazy(inner: FieldType) -> Self {
        Self::Lazy(Some(Box::new(inner)))
    }

    /// Whether values of this type come from a property
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Whether this is a collection type
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection { .. })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => f.write_str(scalar.name()),
            Self::Resource => f.write_str("Resource"),
            Self::Model(name) => f.write_str(name),
            Self::Array(component) => write!(f, "{component}[]"),
            Self::Collection { shape, element } => match element {
                Some(element) => write!(f, "{shape}<{element}>"),
                None => write!(f, "{shape}"),
            },
            Self::Lazy(inner) => match inner {
                Some(inner) => write!(f, "Lazy<{inner}>"),
                None => f.write_str("Lazy"),
            },
        }
    }
}

/// Reference mapping of a field: the property holds path(s) of other resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceMapping {
    /// Path appended to every referenced path
    pub append: String,
}

/// Children mapping of a field
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildrenMapping {
    /// Path resolved below every child instead of the child itself
    pub resolve_below_every_child: String,
}

/// Declaration of a mappable field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Declared type
    pub field_type: FieldType,
    /// Explicit mapping path
    pub path: Option<String>,
    /// Reference mapping, if declared
    pub reference: Option<ReferenceMapping>,
    /// Whether the field maps the resource itself
    pub this: bool,
    /// Children mapping, if declared
    pub children: Option<ChildrenMapping>,
}

impl FieldDescriptor {
    /// Declare a field mapped from its own name
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            path: None,
            reference: None,
            this: false,
            children: None,
        }
    }

    /// Map the field from an explicit path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Map the field as a reference
    pub fn reference(mut self) -> Self {
        self.reference = Some(ReferenceMapping::default());
        self
    }

    /// Map the field as a reference with an append path
    pub fn reference_with_append(mut self, append: impl Into<String>) -> Self {
        self.reference = Some(ReferenceMapping {
            append: append.into(),
        });
        self
    }

    /// Map the resource itself onto the field
    pub fn this(mut self) -> Self {
        self.this = true;
        self
    }

    /// Map the children of a resource onto the field
    pub fn children(mut self) -> Self {
        self.children = Some(ChildrenMapping::default());
        self
    }

    /// Map the resource below every child onto the field
    pub fn children_below(mut self, resolve_below_every_child: impl Into<String>) -> Self {
        self.children = Some(ChildrenMapping {
            resolve_below_every_child: resolve_below_every_child.into(),
        });
        self
    }
}

/// Declaration of a model method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,
    /// Whether the method runs after all fields are mapped
    pub after_mapping: bool,
}

impl MethodDescriptor {
    /// Declare a method invoked after mapping
    pub fn after_mapping(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            after_mapping: true,
        }
    }

    /// Declare a method without lifecycle semantics
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            after_mapping: false,
        }
    }
}

/// Descriptor of a resource model type
///
/// Identity is the type name. `supertypes` lists every type the model is
/// assignable to besides itself, e.g. implemented traits or base models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelType {
    /// Fully qualified type name
    pub name: String,
    /// Types this model is assignable to
    pub supertypes: Vec<String>,
    /// Mappable fields in declaration order
    pub fields: Vec<FieldDescriptor>,
    /// Declared methods
    pub methods: Vec<MethodDescriptor>,
}

impl ModelType {
    /// Create a model type without fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Declare a type this model is assignable to
    pub fn implementing(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    /// Add a field
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a method
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Whether a value of this model type can be used where `target` is expected
    pub fn is_assignable_to(&self, target: &str) -> bool {
        self.name == target || self.supertypes.iter().any(|supertype| supertype == target)
    }
}

impl PartialEq for ModelType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ModelType {}

impl Hash for ModelType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignability() {
        let teaser = ModelType::new("app.Teaser").implementing("app.Linkable");
        assert!(teaser.is_assignable_to("app.Teaser"));
        assert!(teaser.is_assignable_to("app.Linkable"));
        assert!(!teaser.is_assignable_to("app.Page"));
    }

    #[test]
    fn test_identity_is_the_type_name() {
        let a = ModelType::new("app.Teaser").with_field(FieldDescriptor::new("title", FieldType::string()));
        let b = ModelType::new("app.Teaser");
        assert_eq!(a, b);
    }

    #[test]
    fn test_field_type_display() {
        assert_eq!(FieldType::list_of(FieldType::model("app.Link")).to_string(), "List<app.Link>");
        assert_eq!(FieldType::array_of(FieldType::string()).to_string(), "String[]");
        assert_eq!(
            FieldType::lazy(FieldType::set_of(FieldType::Resource)).to_string(),
            "Lazy<Set<Resource>>"
        );
        assert_eq!(CollectionShape::supported_shapes(), "Collection, List, Set");
    }

    #[test]
    fn test_instantiable_shapes() {
        assert!(CollectionShape::List.is_instantiable());
        assert!(!CollectionShape::Concrete("LinkedList".into()).is_instantiable());
    }
}
