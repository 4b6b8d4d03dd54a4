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

//! Values injected into model fields

use super::factory::ResourceModel;
use super::lazy::{Lazy, LazyCollection};
use super::types::CollectionShape;
use crate::error::Result;
use crate::resource::{PropertyValue, Resource};
use std::sync::Arc;

/// A resolved field value
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// A property value converted to the field's scalar type
    Property(PropertyValue),
    /// A resource
    Resource(Arc<dyn Resource>),
    /// A mapped model
    Model(Arc<dyn ResourceModel>),
    /// An array of values
    Array(Vec<FieldValue>),
    /// A collection resolved while mapping
    Collection(ModelCollection),
    /// A collection resolved on first use
    LazyCollection(LazyCollection<FieldValue>),
    /// A deferred value
    Lazy(Lazy<Option<FieldValue>>),
}

impl FieldValue {
    /// The property value, if this is a property
    pub fn as_property(&self) -> Option<&PropertyValue> {
        match self {
            Self::Property(value) => Some(value),
            _ => None,
        }
    }

    /// The string content, if this is a string property
    pub fn as_str(&self) -> Option<&str> {
        self.as_property().and_then(PropertyValue::as_str)
    }

    /// The resource, if this is a resource
    pub fn as_resource(&self) -> Option<&Arc<dyn Resource>> {
        match self {
            Self::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    /// The model, if this is a model
    pub fn as_model(&self) -> Option<&Arc<dyn ResourceModel>> {
        match self {
            Self::Model(model) => Some(model),
            _ => None,
        }
    }

    /// The elements of an array or collection, loading a lazy collection
    ///
    /// Returns `Ok(None)` for single values.
    pub fn elements(&self) -> Result<Option<Vec<FieldValue>>> {
        match self {
            Self::Array(items) => Ok(Some(items.clone())),
            Self::Collection(collection) => Ok(Some(collection.items().to_vec())),
            Self::LazyCollection(collection) => collection.to_vec().map(Some),
            _ => Ok(None),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Property(a), Self::Property(b)) => a == b,
            (Self::Resource(a), Self::Resource(b)) => {
                a.path() == b.path() && a.resolver().id() == b.resolver().id()
            }
            (Self::Model(a), Self::Model(b)) => Arc::ptr_eq(a, b),
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Collection(a), Self::Collection(b)) => a == b,
            _ => false,
        }
    }
}

impl From<PropertyValue> for FieldValue {
    fn from(value: PropertyValue) -> Self {
        Self::Property(value)
    }
}

/// A collection built for a collection-typed field
///
/// Set-shaped collections drop elements equal to one already present.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCollection {
    shape: CollectionShape,
    items: Vec<FieldValue>,
}

impl ModelCollection {
    /// Create an empty collection of the given shape
    pub fn new(shape: CollectionShape) -> Self {
        Self {
            shape,
            items: Vec::new(),
        }
    }

    /// Add an element; returns whether it was added
    pub fn push(&mut self, item: FieldValue) -> bool {
        if self.shape == CollectionShape::Set && self.items.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// The declared shape
    pub fn shape(&self) -> &CollectionShape {
        &self.shape
    }

    /// The elements
    pub fn items(&self) -> &[FieldValue] {
        &self.items
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no elements
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take the elements
    pub fn into_items(self) -> Vec<FieldValue> {
        self.items
    }
}

impl Extend<FieldValue> for ModelCollection {
    fn extend<I: IntoIterator<Item = FieldValue>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}
