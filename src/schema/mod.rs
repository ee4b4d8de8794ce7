//! Validate-and-construct: turning a merged mapping into a typed instance

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::mapping::Mapping;

mod coerce;

/// Deserialize `mapping` into `T`, coercing string scalars where the target
/// field needs a number or bool.
///
/// Coercion reaches every field serde asks for by type: structs, maps,
/// sequences, options and externally tagged enums. Fields under
/// `#[serde(flatten)]` and the contents of internally tagged or untagged
/// enums are buffered by serde before their type is known, so they are not
/// coerced and need values of the exact type (an env var cannot fill a
/// flattened `u16`).
pub fn construct<T: DeserializeOwned>(mapping: Mapping) -> Result<T> {
    T::deserialize(coerce::Lenient(Value::Object(mapping))).map_err(|e| {
        ConfigError::SchemaValidation {
            type_name: std::any::type_name::<T>(),
            message: e.to_string(),
        }
    })
}

/// Like [`construct`], but without coercion: values must already have the
/// exact types the target expects.
pub fn construct_strict<T: DeserializeOwned>(mapping: Mapping) -> Result<T> {
    T::deserialize(Value::Object(mapping)).map_err(|e| ConfigError::SchemaValidation {
        type_name: std::any::type_name::<T>(),
        message: e.to_string(),
    })
}
