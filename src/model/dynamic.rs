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

//! Map-backed models for model types without a dedicated implementation

use super::factory::{ModelDefinition, ResourceModel};
use super::types::ModelType;
use super::value::FieldValue;
use crate::error::{ModelError, Result};
use indexmap::IndexMap;
use std::any::Any;
use std::sync::Arc;

/// A model storing injected fields by name
///
/// Only fields declared on the model type are accepted. Invoked methods are
/// recorded in invocation order.
#[derive(Debug, Clone)]
pub struct DynamicModel {
    model_type: Arc<ModelType>,
    fields: IndexMap<String, FieldValue>,
    invoked: Vec<String>,
}

impl DynamicModel {
    /// Create an empty model of the given type
    pub fn new(model_type: Arc<ModelType>) -> Self {
        Self {
            model_type,
            fields: IndexMap::new(),
            invoked: Vec::new(),
        }
    }

    /// Constructor usable with [`DefinitionsFactory`](super::DefinitionsFactory)
    pub fn boxed(definition: &ModelDefinition) -> Box<dyn ResourceModel> {
        Box::new(Self::new(Arc::clone(&definition.model_type)))
    }

    /// The model type
    pub fn model_type(&self) -> &ModelType {
        &self.model_type
    }

    /// An injected field
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Names of the injected fields in injection order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Methods invoked so far
    pub fn invoked_methods(&self) -> &[String] {
        &self.invoked
    }
}

impl ResourceModel for DynamicModel {
    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()> {
        if !self.model_type.fields.iter().any(|declared| declared.name == field) {
            return Err(ModelError::field_injection(
                &self.model_type.name,
                field,
                "no such field",
            ));
        }
        self.fields.insert(field.to_string(), value);
        Ok(())
    }

    fn invoke(&mut self, method: &str) -> Result<()> {
        self.invoked.push(method.to_string());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDescriptor, FieldType};
    use crate::resource::PropertyValue;

    #[test]
    fn test_only_declared_fields_are_accepted() {
        let model_type =
            Arc::new(ModelType::new("app.Teaser").with_field(FieldDescriptor::new("title", FieldType::string())));
        let mut model = DynamicModel::new(model_type);

        model
            .set_field("title", PropertyValue::from("Hello").into())
            .unwrap();
        assert_eq!(model.get("title").and_then(FieldValue::as_str), Some("Hello"));
        assert!(matches!(
            model.set_field("body", PropertyValue::from("x").into()),
            Err(ModelError::FieldInjection { .. })
        ));
    }
}
