//! Instance resolution
//!
//! Every construction of a config type goes through [`resolve`], which picks
//! one of three modes:
//!
//! 1. explicit sources: merge them over the given values, build a fresh
//!    instance, cache nothing;
//! 2. declared default sources: singleton mode, one cached instance per
//!    type, no keyword values allowed;
//! 3. neither: build straight from the given values.

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::error::{ConfigError, Result};
use crate::mapping::Mapping;
use crate::overrides::SourceOverride;
use crate::populate::populate;
use crate::schema::construct;
use crate::source::ConfigSources;

mod handle;
mod slots;
pub mod values;

pub use handle::Config;
pub use values::ConfigValues;

pub(crate) use slots::{replace as replace_slot, Slot};

/// A configuration type.
///
/// Implementors are plain `serde` types. Declaring
/// [`default_sources`](ConfigClass::default_sources) turns on singleton
/// mode for the type. Instances are handed out as read-only [`Config`]
/// handles and cannot be mutated after construction.
pub trait ConfigClass: DeserializeOwned + Send + Sync + 'static {
    /// Sources used when the type is constructed without explicit sources.
    fn default_sources() -> Option<ConfigSources> {
        None
    }

    /// Checks run after deserialization. An `Err` message is reported as a
    /// schema validation error.
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Construct through the full resolution logic.
    fn create(sources: Option<ConfigSources>, values: Mapping) -> Result<Config<Self>> {
        resolve::<Self>(sources, values)
    }

    /// Zero-argument construction: the singleton when default sources are
    /// in effect, otherwise a fresh instance built from nothing.
    fn load() -> Result<Config<Self>> {
        resolve::<Self>(None, Mapping::new())
    }

    /// A fresh, uncached instance built from `sources`.
    fn from_sources<S: Into<ConfigSources>>(sources: S) -> Result<Config<Self>> {
        resolve::<Self>(Some(sources.into()), Mapping::new())
    }

    /// Construct from explicit values only.
    fn from_values(values: Mapping) -> Result<Config<Self>> {
        resolve::<Self>(None, values)
    }

    /// Swap the default sources until the returned guard is dropped.
    fn change_sources<S: Into<ConfigSources>>(sources: S) -> SourceOverride<Self> {
        SourceOverride::new(Some(sources.into()))
    }

    /// Sources currently in effect for singleton mode.
    fn current_sources() -> Option<ConfigSources> {
        slots::sources::<Self>()
    }

    /// Drop the cached singleton; the next [`load`](ConfigClass::load)
    /// rebuilds it.
    fn reset_singleton() {
        slots::clear_instance::<Self>();
    }
}

/// Resolve one construction call for `T`.
pub fn resolve<T: ConfigClass>(
    sources: Option<ConfigSources>,
    values: Mapping,
) -> Result<Config<T>> {
    let type_name = std::any::type_name::<T>();

    if let Some(sources) = sources {
        tracing::debug!(config = type_name, sources = sources.len(), "Building config from explicit sources");
        let mapping = populate(&values, &sources)?;
        return build::<T>(mapping).map(|instance| Config::new(Arc::new(instance)));
    }

    let Some(defaults) = slots::sources::<T>() else {
        return build::<T>(values).map(|instance| Config::new(Arc::new(instance)));
    };

    if !values.is_empty() {
        return Err(ConfigError::ConflictingArguments { type_name });
    }

    if let Some(instance) = slots::instance::<T>() {
        return Ok(Config::new(instance));
    }

    tracing::debug!(config = type_name, sources = defaults.len(), "Building config singleton");
    let mapping = populate(&Mapping::new(), &defaults)?;
    let instance = Arc::new(build::<T>(mapping)?);
    slots::store::<T>(Arc::clone(&instance));
    Ok(Config::new(instance))
}

fn build<T: ConfigClass>(mapping: Mapping) -> Result<T> {
    let instance: T = construct(mapping)?;
    instance.validate().map_err(|message| ConfigError::SchemaValidation {
        type_name: std::any::type_name::<T>(),
        message,
    })?;
    Ok(instance)
}
