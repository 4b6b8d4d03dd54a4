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

//! Field, method and model metadata
//!
//! Metadata is derived from model type descriptors when a model is
//! registered and drives every subsequent mapping of that model.

pub mod field;
pub mod method;
pub mod path;
pub mod registrar;
pub mod statistics;

pub use field::MappedFieldMetadata;
pub use method::MethodMetadata;
pub use path::ResourcePath;
pub use registrar::{ModelMetadataRegistrar, ModelStatisticsView, ResourceModelMetadata};
pub use statistics::{
    MAPPING_DURATION_INTERVAL_BOUNDARIES, ResourceModelStatistics, StatisticsSnapshot,
};
