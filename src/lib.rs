//! confstack: layered configuration objects
//!
//! Merges configuration values from files, environment variables,
//! command-line arguments and in-memory data into validated, typed,
//! immutable configuration instances.
//!
//! A config type is a `serde` type implementing [`ConfigClass`]. Without
//! declared default sources each construction builds a fresh instance; with
//! them the type becomes a process-wide singleton, which tests can swap out
//! temporarily with [`ConfigClass::change_sources`].

pub mod error;
pub mod loaders;
pub mod mapping;
pub mod overrides;
pub mod populate;
pub mod resolver;
pub mod schema;
pub mod source;

pub use error::{ConfigError, Result};
pub use loaders::{
    get_loader, register_loader, CliArgSource, DataSource, EnvSource, FileFormat, FileFromCl,
    FileSource, Loader, LoaderRegistry,
};
pub use mapping::Mapping;
pub use overrides::{with_sources, SourceOverride};
pub use populate::{populate, populate_with};
pub use resolver::{resolve, Config, ConfigClass, ConfigValues};
pub use source::{ConfigSource, ConfigSources, CustomSource};
