//! In-memory config sources

use serde_json::Value;

use super::Loader;
use crate::error::{ConfigError, Result};
use crate::mapping::{update_recursively, Mapping};
use crate::source::{ConfigSource, DATA_KIND};

/// Values given directly in code, mostly useful in tests and as a layer of
/// defaults below files and the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSource {
    pub data: Mapping,
}

impl DataSource {
    pub fn new(data: Mapping) -> Self {
        Self { data }
    }

    /// Build from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        Self::try_from(value)
    }
}

impl TryFrom<Value> for DataSource {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(ConfigError::data_source(format!(
                "Expected an object of config values, found {other}"
            ))),
        }
    }
}

/// Loader for [`DataSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DataLoader;

impl Loader for DataLoader {
    fn populate_config(&self, config: &mut Mapping, source: &ConfigSource) -> Result<()> {
        let ConfigSource::Data(data) = source else {
            return Err(ConfigError::source_mismatch(DATA_KIND, source.kind()));
        };
        update_recursively(config, data.data.clone());
        Ok(())
    }
}
