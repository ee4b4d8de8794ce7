//! Environment-variable config sources

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::Loader;
use crate::error::{ConfigError, Result};
use crate::mapping::{nest_keys, remap_name, update_recursively, Mapping};
use crate::source::{ConfigSource, ENV_KIND};

const DEFAULT_NESTED_SEPARATOR: &str = "__";

/// Environment variables, optionally backed by a `.env` file.
///
/// Variable names are lower-cased (after the prefix is stripped) before the
/// allow/deny lists and the remap table are consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvSource {
    pub allow_all: bool,
    pub allow: Vec<String>,
    pub deny: Vec<String>,
    pub prefix: Option<String>,
    pub remap: BTreeMap<String, String>,
    pub file: Option<PathBuf>,
    pub nested_separator: String,
}

impl Default for EnvSource {
    fn default() -> Self {
        Self {
            allow_all: false,
            allow: Vec::new(),
            deny: Vec::new(),
            prefix: None,
            remap: BTreeMap::new(),
            file: None,
            nested_separator: DEFAULT_NESTED_SEPARATOR.to_string(),
        }
    }
}

impl EnvSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept every variable (that matches the prefix, if any).
    pub fn allow_all() -> Self {
        Self { allow_all: true, ..Self::default() }
    }

    /// Accept every variable starting with `prefix`.
    pub fn with_prefix<S: Into<String>>(prefix: S) -> Self {
        Self { allow_all: true, prefix: Some(prefix.into()), ..Self::default() }
    }

    pub fn allow<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn deny<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn remap<K: Into<String>, V: Into<String>>(mut self, from: K, to: V) -> Self {
        self.remap.insert(from.into(), to.into());
        self
    }

    pub fn file<P: Into<PathBuf>>(mut self, file: P) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn nested_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.nested_separator = separator.into();
        self
    }

    fn is_allowed(&self, name: &str) -> bool {
        if !self.allow_all && !self.allow.iter().any(|allowed| allowed.to_lowercase() == name) {
            return false;
        }
        !self.deny.iter().any(|denied| denied.to_lowercase() == name)
    }

    /// Variables from the `.env` file, overlaid with the process environment.
    fn raw_variables(&self) -> Result<BTreeMap<String, String>> {
        let mut vars = BTreeMap::new();

        if let Some(file) = &self.file {
            let iter = dotenvy::from_path_iter(file).map_err(|e| {
                ConfigError::env_source(format!("Failed reading {}: {}", file.display(), e))
            })?;
            for item in iter {
                let (key, value) = item.map_err(|e| {
                    ConfigError::env_source(format!("Invalid entry in {}: {}", file.display(), e))
                })?;
                vars.insert(key, value);
            }
        }

        // Non-UTF-8 variables cannot be config values
        for (key, value) in std::env::vars_os() {
            if let (Ok(key), Ok(value)) = (key.into_string(), value.into_string()) {
                vars.insert(key, value);
            }
        }

        Ok(vars)
    }

    /// Filter, rename and nest the raw variables.
    fn collect(&self, vars: BTreeMap<String, String>) -> Mapping {
        let mut selected = Vec::new();
        for (key, value) in vars {
            let name = match &self.prefix {
                Some(prefix) => match key.strip_prefix(prefix.as_str()) {
                    Some(rest) => rest.to_string(),
                    None => continue,
                },
                None => key,
            };
            let name = name.to_lowercase();
            if name.is_empty() || !self.is_allowed(&name) {
                continue;
            }
            selected.push((remap_name(name, &self.remap), Value::String(value)));
        }
        nest_keys(selected, &self.nested_separator)
    }
}

/// Loader for [`EnvSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvLoader;

impl Loader for EnvLoader {
    fn populate_config(&self, config: &mut Mapping, source: &ConfigSource) -> Result<()> {
        let ConfigSource::Env(env) = source else {
            return Err(ConfigError::source_mismatch(ENV_KIND, source.kind()));
        };

        let values = env.collect(env.raw_variables()?);
        tracing::debug!(keys = values.len(), prefix = ?env.prefix, "Loaded environment config");
        update_recursively(config, values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::ENV_LOCK;
    use serde_json::json;
    use similar_asserts::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_prefix_is_stripped_and_names_lowercased() {
        let source = EnvSource::with_prefix("APP_");
        let collected = source.collect(vars(&[
            ("APP_PORT", "8080"),
            ("APP_DB__HOST", "db"),
            ("OTHER_PORT", "1"),
        ]));
        assert_eq!(Value::Object(collected), json!({"port": "8080", "db": {"host": "db"}}));
    }

    #[test]
    fn test_allow_list_without_allow_all() {
        let source = EnvSource::new().allow(["PORT", "name"]);
        let collected = source.collect(vars(&[("PORT", "1"), ("NAME", "n"), ("SECRET", "s")]));
        assert_eq!(Value::Object(collected), json!({"port": "1", "name": "n"}));
    }

    #[test]
    fn test_nothing_selected_without_allow_all_or_allow_list() {
        let source = EnvSource::new();
        assert!(source.collect(vars(&[("PORT", "1")])).is_empty());
    }

    #[test]
    fn test_deny_list_wins() {
        let source = EnvSource::with_prefix("APP_").deny(["SECRET"]);
        let collected = source.collect(vars(&[("APP_SECRET", "s"), ("APP_PORT", "1")]));
        assert_eq!(Value::Object(collected), json!({"port": "1"}));
    }

    #[test]
    fn test_remap_and_custom_separator() {
        let source = EnvSource::with_prefix("APP_")
            .nested_separator(".")
            .remap("listen", "server.port");
        let collected = source.collect(vars(&[("APP_LISTEN", "80")]));
        assert_eq!(Value::Object(collected), json!({"server": {"port": "80"}}));
    }

    #[test]
    fn test_populate_reads_process_environment() {
        let _env = ENV_LOCK.lock();
        std::env::set_var("CONFSTACK_ENV_TEST_A_PORT", "7000");
        std::env::set_var("CONFSTACK_ENV_TEST_A_LOG__LEVEL", "debug");

        let mut config = json!({"port": "1", "name": "keep"}).as_object().cloned().expect("object");
        EnvLoader
            .populate_config(&mut config, &EnvSource::with_prefix("CONFSTACK_ENV_TEST_A_").into())
            .expect("populate");

        assert_eq!(
            Value::Object(config),
            json!({"port": "7000", "name": "keep", "log": {"level": "debug"}})
        );
    }

    #[test]
    fn test_dotenv_file_is_overridden_by_process_env() {
        let _env = ENV_LOCK.lock();
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join(".env");
        fs::write(
            &path,
            "CONFSTACK_ENV_TEST_B_HOST=file-host\nCONFSTACK_ENV_TEST_B_USER=file-user\n",
        )
        .expect("write");
        std::env::set_var("CONFSTACK_ENV_TEST_B_USER", "process-user");

        let mut config = Mapping::new();
        let source = EnvSource::with_prefix("CONFSTACK_ENV_TEST_B_").file(&path);
        EnvLoader.populate_config(&mut config, &source.into()).expect("populate");

        assert_eq!(Value::Object(config), json!({"host": "file-host", "user": "process-user"}));
    }

    #[test]
    fn test_missing_dotenv_file_fails() {
        let tmp = TempDir::new().expect("tmp");
        let source = EnvSource::allow_all().file(tmp.path().join("missing.env"));
        let err = EnvLoader
            .populate_config(&mut Mapping::new(), &source.into())
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::EnvSource(_)));
    }
}
