use serde::{Deserialize, Serialize};

use crate::Value;

/// Settings shared by every front-end.
///
/// ```
/// let config = rulekit::Config::default().with_max_depth(32);
/// assert_eq!(config.snippet_radius, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// What a nested property read yields when the property is absent.
    pub property_default: Value,
    /// Characters shown on each side of an error position in validator snippets.
    pub snippet_radius: usize,
    /// How many field names a structural validation error lists.
    pub max_fields_listed: usize,
    /// Deepest nesting the parsers and document compilers accept.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            property_default: Value::Null,
            snippet_radius: 50,
            max_fields_listed: 5,
            max_depth: 256,
        }
    }
}

impl Config {
    /// Load a config document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the decoder's error when `json` is not a valid config object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_property_default(mut self, value: impl Into<Value>) -> Self {
        self.property_default = value.into();
        self
    }

    #[must_use]
    pub fn with_snippet_radius(mut self, radius: usize) -> Self {
        self.snippet_radius = radius;
        self
    }

    #[must_use]
    pub fn with_max_fields_listed(mut self, count: usize) -> Self {
        self.max_fields_listed = count;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
