//! Schema-less configuration

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ConfigClass;
use crate::error::{ConfigError, Result};
use crate::mapping::{lookup, Mapping};

/// The merged mapping itself, for callers without a typed schema.
///
/// Reads go through dotted paths; writes are always rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigValues(Mapping);

impl ConfigClass for ConfigValues {}

impl ConfigValues {
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.0, path)
    }

    /// Always fails: constructed configuration is immutable.
    pub fn set<V: Into<Value>>(&self, path: &str, _value: V) -> Result<()> {
        Err(ConfigError::immutable_field(path))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}
