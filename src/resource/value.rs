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

//! Property values of resources

use crate::error::{ModelError, Result};
use crate::model::ScalarType;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed property value as stored in the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean property
    Boolean(bool),
    /// Integral property
    Long(i64),
    /// Floating point property
    Double(f64),
    /// Date property
    Date(DateTime<Utc>),
    /// String property
    String(String),
    /// Multi-valued property
    Array(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Name of the stored type, used in conversion errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "Boolean",
            Self::Long(_) => "Long",
            Self::Double(_) => "Double",
            Self::Date(_) => "Date",
            Self::String(_) => "String",
            Self::Array(_) => "Array",
        }
    }

    /// The string content of a string property
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// The values of a multi-valued property, or this value alone
    pub fn values(&self) -> Vec<&PropertyValue> {
        match self {
            Self::Array(items) => items.iter().collect(),
            other => vec![other],
        }
    }

    /// Convert a single value to the given scalar type
    ///
    /// Multi-valued properties convert their first value, mirroring how the
    /// repository exposes a multi-valued property read as a single value.
    /// Integral targets accept floating point values by truncation.
    /// Enumerations accept string values naming one of their constants exactly.
    pub fn convert(&self, target: &ScalarType) -> Result<PropertyValue> {
        let failed = || ModelError::conversion(self.type_name(), target.name());

        if let Self::Array(items) = self {
            return items.first().ok_or_else(failed)?.convert(target);
        }

        match target {
            ScalarType::Boolean => match self {
                Self::Boolean(value) => Ok(Self::Boolean(*value)),
                Self::String(value) => value
                    .trim()
                    .parse::<bool>()
                    .map(Self::Boolean)
                    .map_err(|_| failed()),
                _ => Err(failed()),
            },
            ScalarType::Int => {
                let value = self.to_integral().ok_or_else(failed)?;
                i32::try_from(value)
                    .map(|value| Self::Long(i64::from(value)))
                    .map_err(|_| failed())
            }
            ScalarType::Long => self.to_integral().map(Self::Long).ok_or_else(failed),
            // Single precision targets keep the double value; no narrowing
            ScalarType::Float | ScalarType::Double => match self {
                Self::Double(value) => Ok(Self::Double(*value)),
                Self::Long(value) => Ok(Self::Double(*value as f64)),
                Self::String(value) => value
                    .trim()
                    .parse::<f64>()
                    .map(Self::Double)
                    .map_err(|_| failed()),
                _ => Err(failed()),
            },
            ScalarType::String => Ok(Self::String(self.to_string())),
            ScalarType::Date | ScalarType::Calendar => match self {
                Self::Date(value) => Ok(Self::Date(*value)),
                Self::String(value) => DateTime::parse_from_rfc3339(value.trim())
                    .map(|date| Self::Date(date.with_timezone(&Utc)))
                    .map_err(|_| failed()),
                _ => Err(failed()),
            },
            ScalarType::Enum { constants, .. } => match self {
                Self::String(value) if constants.contains(value) => Ok(Self::String(value.clone())),
                _ => Err(failed()),
            },
        }
    }

    fn to_integral(&self) -> Option<i64> {
        match self {
            Self::Long(value) => Some(*value),
            Self::Double(value) if value.is_finite() => Some(value.trunc() as i64),
            Self::String(value) => value.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Long(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Date(value) => write!(f, "{}", value.to_rfc3339()),
            Self::String(value) => f.write_str(value),
            Self::Array(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Long(i64::from(value))
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<&str>> for PropertyValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Array(values.into_iter().map(PropertyValue::from).collect())
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(values: Vec<PropertyValue>) -> Self {
        Self::Array(values)
    }
}

/// The properties of a resource, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueMap {
    values: IndexMap<String, PropertyValue>,
}

impl ValueMap {
    /// Create an empty value map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a property
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// The raw value of a property
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// A property converted to the given scalar type
    ///
    /// Primitive and wrapper targets are treated alike; a value that cannot be
    /// converted reads as absent.
    pub fn get_as(&self, name: &str, target: &ScalarType) -> Option<PropertyValue> {
        let value = self.values.get(name)?;
        match value.convert(target) {
            Ok(converted) => Some(converted),
            Err(error) => {
                log::trace!("Property {name} is not readable as {}: {error}", target.name());
                None
            }
        }
    }

    /// All values of a property converted to the given scalar type
    ///
    /// Single-valued properties yield one element. Values that fail to convert
    /// are dropped.
    pub fn get_all_as(&self, name: &str, target: &ScalarType) -> Option<Vec<PropertyValue>> {
        let value = self.values.get(name)?;
        Some(
            value
                .values()
                .into_iter()
                .filter_map(|item| item.convert(target).ok())
                .collect(),
        )
    }

    /// Whether the property exists
    pub fn contains_key(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no properties
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the properties in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(
            PropertyValue::from("42").convert(&ScalarType::Int),
            Ok(PropertyValue::Long(42))
        );
        assert_eq!(
            PropertyValue::from(3.9).convert(&ScalarType::Long),
            Ok(PropertyValue::Long(3))
        );
        assert_eq!(
            PropertyValue::from(7).convert(&ScalarType::Double),
            Ok(PropertyValue::Double(7.0))
        );
        assert_eq!(
            PropertyValue::from(" true ").convert(&ScalarType::Boolean),
            Ok(PropertyValue::Boolean(true))
        );
        assert_eq!(
            PropertyValue::from(12).convert(&ScalarType::String),
            Ok(PropertyValue::from("12"))
        );
    }

    #[test]
    fn test_int_overflow_is_a_conversion_error() {
        let result = PropertyValue::Long(i64::MAX).convert(&ScalarType::Int);
        assert_eq!(result, Err(ModelError::conversion("Long", "int")));
    }

    #[test]
    fn test_date_conversion() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            PropertyValue::from("2024-03-01T12:00:00Z").convert(&ScalarType::Calendar),
            Ok(PropertyValue::Date(expected))
        );
        assert!(PropertyValue::from("yesterday").convert(&ScalarType::Date).is_err());
    }

    #[test]
    fn test_array_reads_first_value() {
        let value = PropertyValue::from(vec!["a", "b"]);
        assert_eq!(value.convert(&ScalarType::String), Ok(PropertyValue::from("a")));
        assert!(PropertyValue::Array(vec![]).convert(&ScalarType::String).is_err());
    }

    #[test]
    fn test_value_map_typed_access() {
        let map = ValueMap::new()
            .with("count", "5")
            .with("tags", vec!["x", "y"])
            .with("title", "Hello");

        assert_eq!(map.get_as("count", &ScalarType::Int), Some(PropertyValue::Long(5)));
        assert_eq!(map.get_as("title", &ScalarType::Int), None);
        assert_eq!(map.get_as("missing", &ScalarType::String), None);
        assert_eq!(
            map.get_all_as("tags", &ScalarType::String),
            Some(vec![PropertyValue::from("x"), PropertyValue::from("y")])
        );
        assert_eq!(
            map.get_all_as("title", &ScalarType::String),
            Some(vec![PropertyValue::from("Hello")])
        );
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_enum_constants_by_name() {
        let alignment = ScalarType::enumeration("app.Alignment", ["LEFT", "CENTER", "RIGHT"]);
        let map = ValueMap::new()
            .with("alignment", "CENTER")
            .with("alignments", vec!["LEFT", "TOP", "RIGHT"])
            .with("lowercase", "left")
            .with("unknown", "TOP")
            .with("count", 1);

        assert_eq!(map.get_as("alignment", &alignment), Some(PropertyValue::from("CENTER")));
        assert_eq!(map.get_as("lowercase", &alignment), None);
        assert_eq!(map.get_as("unknown", &alignment), None);
        assert_eq!(map.get_as("count", &alignment), None);
        assert_eq!(
            map.get_all_as("alignments", &alignment),
            Some(vec![PropertyValue::from("LEFT"), PropertyValue::from("RIGHT")])
        );
        assert_eq!(
            PropertyValue::from("TOP").convert(&alignment),
            Err(ModelError::conversion("String", "app.Alignment"))
        );
    }

    #[test]
    fn test_float_keeps_double_precision() {
        let value = PropertyValue::from(f64::MAX).convert(&ScalarType::Float);
        assert_eq!(value, Ok(PropertyValue::Double(f64::MAX)));
    }
}
