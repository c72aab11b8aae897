//! Polarity of the clauses schema assembly injects.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Flags used for the mandatory clauses a schema author did not declare.
///
/// The default matches the conventional schema: values are required,
/// empty values are rejected and null is allowed.
///
/// ```rust
/// use carafe::SchemaConfig;
///
/// let config = SchemaConfig::from_json(r#"{"required": false}"#).unwrap();
/// assert!(!config.required);
/// assert!(config.reject_empty);
/// assert!(config.allow_null);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    /// Flag of the injected `required` clause.
    pub required: bool,

    /// Flag of the injected `rejectempty` clause.
    pub reject_empty: bool,

    /// When set, the injected null clause allows null.
    pub allow_null: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            required: true,
            reject_empty: true,
            allow_null: true,
        }
    }
}

impl SchemaConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidConfig(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::InvalidConfig(e.to_string()))
    }
}
