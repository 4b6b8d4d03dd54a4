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

//! Mapping paths of model fields

use serde::{Deserialize, Serialize};
use std::fmt;

/// A repository path a field is mapped from
///
/// Relative paths resolve against the resource being mapped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Create a path as given
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// A path guaranteed to start with `/`; blank input yields `None`
    pub fn absolute(path: &str) -> Option<Self> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        if path.starts_with('/') {
            Some(Self(path.to_string()))
        } else {
            Some(Self(format!("/{path}")))
        }
    }

    /// A path without a leading `/`; blank input yields `None`
    pub fn relative(path: &str) -> Option<Self> {
        let path = path.trim();
        let stripped = path.strip_prefix('/').unwrap_or(path);
        if stripped.is_empty() {
            None
        } else {
            Some(Self(stripped.to_string()))
        }
    }

    /// The path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the path is absolute
    pub fn is_absolute(&self) -> bool {
        self.0.starts_with('/')
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_paths() {
        assert_eq!(ResourcePath::absolute("foo").unwrap().as_str(), "/foo");
        assert_eq!(ResourcePath::absolute("/foo").unwrap().as_str(), "/foo");
        assert_eq!(ResourcePath::absolute(""), None);
        assert_eq!(ResourcePath::absolute("  "), None);
    }

    #[test]
    fn test_relative_paths() {
        assert_eq!(ResourcePath::relative("/jcr:content").unwrap().as_str(), "jcr:content");
        assert_eq!(ResourcePath::relative("jcr:content").unwrap().as_str(), "jcr:content");
        assert_eq!(ResourcePath::relative("/"), None);
        assert!(!ResourcePath::new("a/b").is_absolute());
    }
}
