//! Loader registry and the built-in loaders
//!
//! Every [`ConfigSource`] kind is handled by a [`Loader`] looked up by its
//! kind tag. The built-in loaders (file, env, cli, data) are registered in
//! the process-wide registry on first use; more can be added with
//! [`register_loader`].

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::ffi::OsString;
use std::sync::Arc;

use crate::error::{ConfigError, Result};
use crate::mapping::Mapping;
use crate::source::{ConfigSource, CLI_KIND, DATA_KIND, ENV_KIND, FILE_KIND};

pub mod cli;
pub mod data;
pub mod env;
pub mod file;

pub use cli::{CliArgLoader, CliArgSource};
pub use data::{DataLoader, DataSource};
pub use env::{EnvLoader, EnvSource};
pub use file::{FileFormat, FileFromCl, FileLoader, FileSource};

/// Reads one source and writes the values it resolves into `config`.
///
/// Keys the source does not define must be left untouched.
pub trait Loader: Send + Sync {
    fn populate_config(&self, config: &mut Mapping, source: &ConfigSource) -> Result<()>;
}

/// Maps source kinds to loaders.
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn Loader>>,
}

impl LoaderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the file, env, cli and data loaders.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(FILE_KIND, FileLoader);
        registry.register(ENV_KIND, EnvLoader);
        registry.register(CLI_KIND, CliArgLoader);
        registry.register(DATA_KIND, DataLoader);
        registry
    }

    /// Register `loader` for `kind`, returning the loader it replaced.
    pub fn register<K, L>(&mut self, kind: K, loader: L) -> Option<Arc<dyn Loader>>
    where
        K: Into<String>,
        L: Loader + 'static,
    {
        self.loaders.insert(kind.into(), Arc::new(loader))
    }

    pub fn get(&self, kind: &str) -> Result<Arc<dyn Loader>> {
        self.loaders.get(kind).cloned().ok_or_else(|| ConfigError::unknown_source_kind(kind))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.loaders.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.loaders.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderRegistry").field("kinds", &self.kinds()).finish()
    }
}

static REGISTRY: Lazy<RwLock<LoaderRegistry>> =
    Lazy::new(|| RwLock::new(LoaderRegistry::with_builtins()));

/// Look up the process-wide loader for `kind`.
pub fn get_loader(kind: &str) -> Result<Arc<dyn Loader>> {
    REGISTRY.read().get(kind)
}

/// Register a loader in the process-wide registry.
///
/// Meant to be called during startup, before configuration is first built.
pub fn register_loader<K, L>(kind: K, loader: L) -> Option<Arc<dyn Loader>>
where
    K: Into<String>,
    L: Loader + 'static,
{
    let kind = kind.into();
    tracing::debug!(kind = %kind, "registering config loader");
    REGISTRY.write().register(kind, loader)
}

/// Process arguments after the program name.
pub(crate) fn process_args() -> Vec<String> {
    utf8_args(std::env::args_os().skip(1))
}

// Non-UTF-8 arguments cannot be config values
fn utf8_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<String> {
    args.into_iter().filter_map(|arg| arg.into_string().ok()).collect()
}

/// Held by tests that read or write the process environment.
#[cfg(test)]
pub(crate) static ENV_LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());
