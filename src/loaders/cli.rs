//! Command-line argument config sources

use serde_json::Value;
use std::collections::BTreeMap;

use super::Loader;
use crate::error::{ConfigError, Result};
use crate::mapping::{nest_keys, remap_name, update_recursively, Mapping};
use crate::source::{ConfigSource, CLI_KIND};

const DEFAULT_NESTED_SEPARATOR: &str = ".";

/// `--name value` and `--name=value` pairs from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgSource {
    pub prefix: Option<String>,
    pub remap: BTreeMap<String, String>,
    pub nested_separator: String,
    /// Arguments to read, without the program name; the process arguments
    /// when unset.
    pub args: Option<Vec<String>>,
}

impl Default for CliArgSource {
    fn default() -> Self {
        Self {
            prefix: None,
            remap: BTreeMap::new(),
            nested_separator: DEFAULT_NESTED_SEPARATOR.to_string(),
            args: None,
        }
    }
}

impl CliArgSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { args: Some(args.into_iter().map(Into::into).collect()), ..Self::default() }
    }

    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn remap<K: Into<String>, V: Into<String>>(mut self, from: K, to: V) -> Self {
        self.remap.insert(from.into(), to.into());
        self
    }

    pub fn nested_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.nested_separator = separator.into();
        self
    }

    fn collect(&self, args: &[String]) -> Mapping {
        let mut selected = Vec::new();
        for (name, value) in parse_pairs(args) {
            let name = match &self.prefix {
                Some(prefix) => match name.strip_prefix(prefix.as_str()) {
                    Some(rest) if !rest.is_empty() => rest.to_string(),
                    _ => continue,
                },
                None => name,
            };
            selected.push((remap_name(name, &self.remap), Value::String(value)));
        }
        nest_keys(selected, &self.nested_separator)
    }
}

/// Extract `(name, value)` pairs. A flag without a value is skipped.
fn parse_pairs(args: &[String]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let Some(flag) = args[i].strip_prefix("--") else {
            i += 1;
            continue;
        };

        if let Some((name, value)) = flag.split_once('=') {
            if !name.is_empty() {
                pairs.push((name.to_string(), value.to_string()));
            }
            i += 1;
            continue;
        }

        match args.get(i + 1) {
            Some(value) if !flag.is_empty() && !value.starts_with("--") => {
                pairs.push((flag.to_string(), value.clone()));
                i += 2;
            }
            _ => {
                tracing::debug!("Ignoring command-line flag without value: --{}", flag);
                i += 1;
            }
        }
    }
    pairs
}

/// Loader for [`CliArgSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CliArgLoader;

impl Loader for CliArgLoader {
    fn populate_config(&self, config: &mut Mapping, source: &ConfigSource) -> Result<()> {
        let ConfigSource::CliArgs(cli) = source else {
            return Err(ConfigError::source_mismatch(CLI_KIND, source.kind()));
        };

        let values = match &cli.args {
            Some(args) => cli.collect(args),
            None => cli.collect(&super::process_args()),
        };
        tracing::debug!(keys = values.len(), "Loaded command-line config");
        update_recursively(config, values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use similar_asserts::assert_eq;

    fn load(source: CliArgSource) -> Value {
        let mut config = Mapping::new();
        CliArgLoader.populate_config(&mut config, &source.into()).expect("populate");
        Value::Object(config)
    }

    #[test]
    fn test_space_and_equals_forms() {
        let config = load(CliArgSource::with_args(["--port", "80", "--name=svc"]));
        assert_eq!(config, json!({"port": "80", "name": "svc"}));
    }

    #[test]
    fn test_dotted_names_nest() {
        let config = load(CliArgSource::with_args(["--db.host", "h", "--db.port=5432"]));
        assert_eq!(config, json!({"db": {"host": "h", "port": "5432"}}));
    }

    #[test]
    fn test_flags_without_values_and_positionals_are_ignored() {
        let config =
            load(CliArgSource::with_args(["serve", "--verbose", "--port", "80", "--dry-run"]));
        assert_eq!(config, json!({"port": "80"}));
    }

    #[test]
    fn test_prefix_filters_and_strips() {
        let config = load(
            CliArgSource::with_args(["--app-port", "80", "--other", "x"]).prefix("app-"),
        );
        assert_eq!(config, json!({"port": "80"}));
    }

    #[test]
    fn test_remap_and_separator() {
        let config = load(
            CliArgSource::with_args(["--listen", "80", "--db__host", "h"])
                .nested_separator("__")
                .remap("listen", "server__port"),
        );
        assert_eq!(config, json!({"server": {"port": "80"}, "db": {"host": "h"}}));
    }

    #[test]
    fn test_later_argument_wins() {
        let config = load(CliArgSource::with_args(["--port", "1", "--port", "2"]));
        assert_eq!(config, json!({"port": "2"}));
    }
}
