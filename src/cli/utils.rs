//! Shared CLI utilities.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

use confstack::{
    CliArgSource, Config, ConfigClass, ConfigSource, ConfigSources, ConfigValues, EnvSource,
    FileSource,
};

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Toml,
}

/// Source selection shared by all subcommands. Sources are layered in the
/// order files, environment, trailing arguments.
#[derive(Args)]
pub struct SourceArgs {
    /// Config files (JSON, YAML or TOML), later files win
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Skip config files that do not exist
    #[arg(long)]
    pub optional_files: bool,

    /// Read environment variables starting with this prefix
    #[arg(short = 'p', long, value_name = "PREFIX")]
    pub env_prefix: Option<String>,

    /// Also read variables from this .env file
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Ignore these environment keys (comma-separated, prefix stripped)
    #[arg(long, value_name = "KEYS")]
    pub env_deny: Option<String>,

    /// Separator for nested environment keys
    #[arg(long, value_name = "SEP", default_value = "__")]
    pub env_separator: String,

    /// Overrides as `--key value` pairs after `--`
    #[arg(last = true, value_name = "OVERRIDES")]
    pub overrides: Vec<String>,
}

impl SourceArgs {
    pub fn sources(&self) -> ConfigSources {
        let mut sources: Vec<ConfigSource> = self
            .files
            .iter()
            .map(|path| FileSource::new(path).optional(self.optional_files).into())
            .collect();

        if self.env_prefix.is_some() || self.env_file.is_some() {
            let mut env = EnvSource::allow_all().nested_separator(self.env_separator.clone());
            if let Some(prefix) = &self.env_prefix {
                env = env.prefix(prefix.clone());
            }
            if let Some(file) = &self.env_file {
                env = env.file(file);
            }
            if let Some(deny) = parse_csv(&self.env_deny) {
                env = env.deny(deny);
            }
            sources.push(env.into());
        }

        if !self.overrides.is_empty() {
            sources.push(CliArgSource::with_args(self.overrides.iter().cloned()).into());
        }

        sources.into()
    }

    pub fn load(&self) -> Result<Config<ConfigValues>> {
        ConfigValues::from_sources(self.sources()).context("Failed to load configuration")
    }
}

pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Toml => match value {
            Value::Object(_) => toml::to_string_pretty(value)?,
            other => anyhow::bail!("TOML output needs a table, found {}", other),
        },
    };
    Ok(rendered.trim_end().to_string())
}
