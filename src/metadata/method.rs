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

//! Lifecycle metadata of model methods

use crate::model::{MethodDescriptor, ModelType};

/// Metadata of a method declared on a model type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodMetadata {
    declaring_model: String,
    name: String,
    is_after_mapping_callback: bool,
}

impl MethodMetadata {
    /// Derive the metadata of `method` declared on `model_type`
    pub fn new(method: &MethodDescriptor, model_type: &ModelType) -> Self {
        Self {
            declaring_model: model_type.name.clone(),
            name: method.name.clone(),
            is_after_mapping_callback: method.after_mapping,
        }
    }

    /// Name of the declaring model type
    pub fn declaring_model(&self) -> &str {
        &self.declaring_model
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the method runs once all fields are mapped
    pub fn is_after_mapping_callback(&self) -> bool {
        self.is_after_mapping_callback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_mapping_flag() {
        let model_type = ModelType::new("app.Teaser");
        let callback = MethodMetadata::new(&MethodDescriptor::after_mapping("init"), &model_type);
        let plain = MethodMetadata::new(&MethodDescriptor::plain("render"), &model_type);

        assert!(callback.is_after_mapping_callback());
        assert!(!plain.is_after_mapping_callback());
        assert_eq!(callback.declaring_model(), "app.Teaser");
    }
}
