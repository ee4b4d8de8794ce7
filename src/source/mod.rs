//! Config source descriptors
//!
//! A [`ConfigSource`] only describes where values come from; the loader
//! registered for its [`kind`](ConfigSource::kind) does the reading.

use serde_json::Value;

use crate::loaders::cli::CliArgSource;
use crate::loaders::data::DataSource;
use crate::loaders::env::EnvSource;
use crate::loaders::file::FileSource;

pub const FILE_KIND: &str = "file";
pub const ENV_KIND: &str = "env";
pub const CLI_KIND: &str = "cli";
pub const DATA_KIND: &str = "data";

/// A source handled by a user-registered loader.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomSource {
    pub kind: String,
    pub options: Value,
}

impl CustomSource {
    pub fn new<S: Into<String>>(kind: S, options: Value) -> Self {
        Self { kind: kind.into(), options }
    }
}

/// Where configuration values come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(FileSource),
    Env(EnvSource),
    CliArgs(CliArgSource),
    Data(DataSource),
    Custom(CustomSource),
}

impl ConfigSource {
    /// Tag used to dispatch to a loader.
    pub fn kind(&self) -> &str {
        match self {
            Self::File(_) => FILE_KIND,
            Self::Env(_) => ENV_KIND,
            Self::CliArgs(_) => CLI_KIND,
            Self::Data(_) => DATA_KIND,
            Self::Custom(custom) => &custom.kind,
        }
    }
}

impl From<FileSource> for ConfigSource {
    fn from(source: FileSource) -> Self {
        Self::File(source)
    }
}

impl From<EnvSource> for ConfigSource {
    fn from(source: EnvSource) -> Self {
        Self::Env(source)
    }
}

impl From<CliArgSource> for ConfigSource {
    fn from(source: CliArgSource) -> Self {
        Self::CliArgs(source)
    }
}

impl From<DataSource> for ConfigSource {
    fn from(source: DataSource) -> Self {
        Self::Data(source)
    }
}

impl From<CustomSource> for ConfigSource {
    fn from(source: CustomSource) -> Self {
        Self::Custom(source)
    }
}

/// One source or an ordered list of them. Later sources win.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSources {
    One(ConfigSource),
    Many(Vec<ConfigSource>),
}

impl ConfigSources {
    pub fn as_slice(&self) -> &[ConfigSource] {
        match self {
            Self::One(source) => std::slice::from_ref(source),
            Self::Many(sources) => sources,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigSource> {
        self.as_slice().iter()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

macro_rules! single_source {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ConfigSources {
                fn from(source: $ty) -> Self {
                    Self::One(source.into())
                }
            }
        )*
    };
}

single_source!(ConfigSource, FileSource, EnvSource, CliArgSource, DataSource, CustomSource);

impl From<Vec<ConfigSource>> for ConfigSources {
    fn from(sources: Vec<ConfigSource>) -> Self {
        Self::Many(sources)
    }
}

impl FromIterator<ConfigSource> for ConfigSources {
    fn from_iter<I: IntoIterator<Item = ConfigSource>>(iter: I) -> Self {
        Self::Many(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ConfigSources {
    type Item = &'a ConfigSource;
    type IntoIter = std::slice::Iter<'a, ConfigSource>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
