//! Error types for configuration loading

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for confstack operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No loader registered for config source kind '{kind}'")]
    UnknownSourceKind { kind: String },

    #[error(
        "Singleton mechanism enabled for {type_name} (default sources are declared), \
         so keyword arguments are not supported"
    )]
    ConflictingArguments { type_name: &'static str },

    #[error("Invalid configuration for {type_name}: {message}")]
    SchemaValidation { type_name: &'static str, message: String },

    #[error("Field '{field}' is immutable once the configuration is constructed")]
    ImmutableField { field: String },

    #[error("Loader for '{expected}' sources cannot handle a '{found}' source")]
    SourceMismatch { expected: String, found: String },

    #[error("File source error: {0}")]
    FileSource(String),

    #[error("Failed reading config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid {format} in {}: {message}", path.display())]
    Parse { path: PathBuf, format: &'static str, message: String },

    #[error("Environment source error: {0}")]
    EnvSource(String),

    #[error("Data source error: {0}")]
    DataSource(String),
}

impl ConfigError {
    pub fn unknown_source_kind<S: Into<String>>(kind: S) -> Self {
        Self::UnknownSourceKind { kind: kind.into() }
    }

    pub fn source_mismatch<S: Into<String>>(expected: S, found: S) -> Self {
        Self::SourceMismatch { expected: expected.into(), found: found.into() }
    }

    pub fn file_source<S: Into<String>>(msg: S) -> Self {
        Self::FileSource(msg.into())
    }

    pub fn env_source<S: Into<String>>(msg: S) -> Self {
        Self::EnvSource(msg.into())
    }

    pub fn data_source<S: Into<String>>(msg: S) -> Self {
        Self::DataSource(msg.into())
    }

    pub fn immutable_field<S: Into<String>>(field: S) -> Self {
        Self::ImmutableField { field: field.into() }
    }
}

/// Result type alias for confstack operations
pub type Result<T> = std::result::Result<T, ConfigError>;
