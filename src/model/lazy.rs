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

//! Deferred values for lazily mapped fields
//!
//! [`LazyValue`] computes its value on first access and memoizes the outcome,
//! including a failure. The factory runs at most once: concurrent first
//! accesses block until the first one has finished and then observe the same
//! outcome. Later accesses never retry a failed computation.
//!
//! [`Lazy`] is the holder type for fields declared as deferred values and
//! [`LazyCollection`] stands in for collection fields whose elements are
//! resolved on first use.

use super::types::CollectionShape;
use crate::error::{ModelError, Result};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

type ValueFactory<T> = Box<dyn FnOnce() -> Result<T> + Send>;

/// A value computed at most once, on first access
pub struct LazyValue<T> {
    cell: OnceCell<Result<T>>,
    factory: Mutex<Option<ValueFactory<T>>>,
}

impl<T> LazyValue<T> {
    /// Create a value computed by `factory` on first access
    pub fn new<F>(factory: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Mutex::new(Some(Box::new(factory))),
        }
    }

    /// Create an already computed value
    pub fn ready(value: T) -> Self {
        Self {
            cell: OnceCell::with_value(Ok(value)),
            factory: Mutex::new(None),
        }
    }

    /// The value, computing it if this is the first access
    ///
    /// A failed computation is returned again on every later access.
    /// Accessing the value from within its own factory is a deadlock.
    pub fn get(&self) -> Result<&T> {
        self.cell
            .get_or_init(|| match self.factory.lock().take() {
                Some(factory) => factory(),
                None => Err(ModelError::lazy_loading("value factory was already consumed")),
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Whether the value has been computed, successfully or not
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(Ok(value)) => f.debug_tuple("LazyValue").field(value).finish(),
            Some(Err(error)) => f.debug_tuple("LazyValue").field(error).finish(),
            None => f.write_str("LazyValue(<unloaded>)"),
        }
    }
}

/// Holder of a deferred field value
///
/// Clones share the same underlying value.
pub struct Lazy<T> {
    inner: Arc<LazyValue<T>>,
}

impl<T> Lazy<T> {
    /// Create a holder computing its value on first access
    pub fn new<F>(factory: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        Self {
            inner: Arc::new(LazyValue::new(factory)),
        }
    }

    /// Create a holder of an already computed value
    pub fn ready(value: T) -> Self {
        Self {
            inner: Arc::new(LazyValue::ready(value)),
        }
    }

    /// The value, computing it if this is the first access
    pub fn get(&self) -> Result<&T> {
        self.inner.get()
    }

    /// Whether the value has been computed
    pub fn is_loaded(&self) -> bool {
        self.inner.is_loaded()
    }

    /// Whether both holders share the same underlying value
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

/// A collection whose elements are resolved on first use
///
/// Every accessor forces the load. The declared shape is retained so the
/// collection reads like the field type it stands in for.
pub struct LazyCollection<T> {
    shape: CollectionShape,
    items: Arc<LazyValue<Vec<T>>>,
}

impl<T> LazyCollection<T> {
    /// Create a collection loaded by `factory` on first use
    pub fn new<F>(shape: CollectionShape, factory: F) -> Self
    where
        F: FnOnce() -> Result<Vec<T>> + Send + 'static,
    {
        Self {
            shape,
            items: Arc::new(LazyValue::new(factory)),
        }
    }

    /// The declared collection shape
    pub fn shape(&self) -> &CollectionShape {
        &self.shape
    }

    /// Number of elements
    pub fn len(&self) -> Result<usize> {
        Ok(self.items.get()?.len())
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.items.get()?.is_empty())
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Result<Option<&T>> {
        Ok(self.items.get()?.get(index))
    }

    /// Iterate over the elements
    pub fn iter(&self) -> Result<std::slice::Iter<'_, T>> {
        Ok(self.items.get()?.iter())
    }

    /// The elements as a slice
    pub fn as_slice(&self) -> Result<&[T]> {
        Ok(self.items.get()?.as_slice())
    }

    /// Whether the collection has been loaded
    pub fn is_loaded(&self) -> bool {
        self.items.is_loaded()
    }
}

impl<T: PartialEq> LazyCollection<T> {
    /// Whether the collection contains `item`
    pub fn contains(&self, item: &T) -> Result<bool> {
        Ok(self.items.get()?.contains(item))
    }
}

impl<T: Clone> LazyCollection<T> {
    /// Copy the elements into a vector
    pub fn to_vec(&self) -> Result<Vec<T>> {
        Ok(self.items.get()?.clone())
    }
}

impl<T> Clone for LazyCollection<T> {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape.clone(),
            items: Arc::clone(&self.items),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCollection")
            .field("shape", &self.shape)
            .field("items", &self.items)
            .finish()
    }
}
