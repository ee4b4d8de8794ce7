//! File-backed config sources (JSON, YAML, TOML)

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::Loader;
use crate::error::{ConfigError, Result};
use crate::mapping::{update_recursively, Mapping};
use crate::source::{ConfigSource, FILE_KIND};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
    Toml,
}

impl FileFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
        }
    }
}

/// Command-line location of the config file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFromCl {
    /// The n-th argument after the program name.
    Position(usize),
    /// The argument following this flag, e.g. `--config`.
    Flag(String),
}

/// A config file. The path is taken from the first of `file`,
/// `file_from_env` and `file_from_cl` that is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSource {
    pub file: Option<PathBuf>,
    pub file_from_env: Option<String>,
    pub file_from_cl: Option<FileFromCl>,
    /// Joined in front of the resolved path.
    pub folder: Option<PathBuf>,
    /// Overrides extension-based detection.
    pub format: Option<FileFormat>,
    /// Skip instead of failing when the file cannot be found.
    pub optional: bool,
    /// Arguments searched by `file_from_cl`; the process arguments when unset.
    pub args: Option<Vec<String>>,
}

impl FileSource {
    pub fn new<P: Into<PathBuf>>(file: P) -> Self {
        Self { file: Some(file.into()), ..Self::default() }
    }

    pub fn from_env<S: Into<String>>(var: S) -> Self {
        Self { file_from_env: Some(var.into()), ..Self::default() }
    }

    pub fn from_cl(location: FileFromCl) -> Self {
        Self { file_from_cl: Some(location), ..Self::default() }
    }

    pub fn folder<P: Into<PathBuf>>(mut self, folder: P) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = Some(args);
        self
    }

    fn resolve_path(&self) -> Result<PathBuf> {
        let path = if let Some(file) = &self.file {
            file.clone()
        } else if let Some(var) = &self.file_from_env {
            let value = std::env::var(var).map_err(|_| {
                ConfigError::file_source(format!("Environment variable '{var}' is not set"))
            })?;
            PathBuf::from(value)
        } else if let Some(location) = &self.file_from_cl {
            let args = self.args.clone().unwrap_or_else(super::process_args);
            PathBuf::from(path_from_args(&args, location)?)
        } else {
            return Err(ConfigError::file_source("No file source set"));
        };

        Ok(match &self.folder {
            Some(folder) => folder.join(path),
            None => path,
        })
    }
}

fn path_from_args(args: &[String], location: &FileFromCl) -> Result<String> {
    match location {
        FileFromCl::Position(index) => args.get(*index).cloned().ok_or_else(|| {
            ConfigError::file_source(format!("No command-line argument at position {index}"))
        }),
        FileFromCl::Flag(flag) => {
            let pos = args.iter().position(|arg| arg == flag).ok_or_else(|| {
                ConfigError::file_source(format!("Command-line argument '{flag}' not found"))
            })?;
            args.get(pos + 1).cloned().ok_or_else(|| {
                ConfigError::file_source(format!("Command-line argument '{flag}' has no value"))
            })
        }
    }
}

/// Parse file content into a mapping. The document must be a mapping at
/// the top level.
pub fn parse_content(content: &str, format: FileFormat, path: &Path) -> Result<Mapping> {
    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        format: format.as_str(),
        message,
    };

    let value: Value = match format {
        FileFormat::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        FileFormat::Yaml => {
            // An empty YAML document is null rather than an empty mapping
            if content.trim().is_empty() {
                Value::Object(Mapping::new())
            } else {
                serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?
            }
        }
        FileFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(parse_error(format!("expected a mapping at the top level, found {other}"))),
    }
}

/// Loader for [`FileSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl Loader for FileLoader {
    fn populate_config(&self, config: &mut Mapping, source: &ConfigSource) -> Result<()> {
        let ConfigSource::File(file) = source else {
            return Err(ConfigError::source_mismatch(FILE_KIND, source.kind()));
        };

        let path = match file.resolve_path() {
            Ok(path) => path,
            Err(e) if file.optional => {
                tracing::debug!("Skipping optional config file: {}", e);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if file.optional && !path.exists() {
            tracing::debug!("Skipping optional config file {}: not found", path.display());
            return Ok(());
        }

        let format = match file.format.or_else(|| FileFormat::from_path(&path)) {
            Some(format) => format,
            None => {
                return Err(ConfigError::file_source(format!(
                    "Unknown file format for {}",
                    path.display()
                )))
            }
        };

        let content = fs::read_to_string(&path)
            .map_err(|source| ConfigError::Io { path: path.clone(), source })?;

        tracing::debug!("Loading {} config from {}", format.as_str(), path.display());
        let data = parse_content(&content, format, &path)?;
        update_recursively(config, data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::ENV_LOCK;
    use serde_json::json;
    use similar_asserts::assert_eq;
    use tempfile::TempDir;

    fn load(source: FileSource) -> Result<Mapping> {
        let mut config = Mapping::new();
        FileLoader.populate_config(&mut config, &ConfigSource::File(source))?;
        Ok(config)
    }

    #[test]
    fn test_detects_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.json")), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_path(Path::new("a.YML")), Some(FileFormat::Yaml));
        assert_eq!(FileFormat::from_path(Path::new("a.yaml")), Some(FileFormat::Yaml));
        assert_eq!(FileFormat::from_path(Path::new("a.toml")), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_path(Path::new("a.ini")), None);
    }

    #[test]
    fn test_load_toml_file() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("app.toml");
        fs::write(&path, "name = 'svc'\n[server]\nport = 8080\n").expect("write");

        let config = load(FileSource::new(&path)).expect("config");
        assert_eq!(Value::Object(config), json!({"name": "svc", "server": {"port": 8080}}));
    }

    #[test]
    fn test_load_yaml_file() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("app.yaml");
        fs::write(&path, "name: svc\nserver:\n  port: 8080\n  hosts: [a, b]\n").expect("write");

        let config = load(FileSource::new(&path)).expect("config");
        assert_eq!(
            Value::Object(config),
            json!({"name": "svc", "server": {"port": 8080, "hosts": ["a", "b"]}})
        );
    }

    #[test]
    fn test_explicit_format_overrides_extension() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("app.conf");
        fs::write(&path, r#"{"debug": true}"#).expect("write");

        let err = load(FileSource::new(&path)).expect_err("unknown extension");
        assert!(matches!(err, ConfigError::FileSource(_)));

        let config = load(FileSource::new(&path).format(FileFormat::Json)).expect("config");
        assert_eq!(config.get("debug"), Some(&json!(true)));
    }

    #[test]
    fn test_file_merges_over_existing_keys() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("app.json");
        fs::write(&path, r#"{"server": {"port": 9000}}"#).expect("write");

        let mut config = json!({"name": "keep", "server": {"host": "h", "port": 1}})
            .as_object()
            .cloned()
            .expect("object");
        FileLoader
            .populate_config(&mut config, &FileSource::new(&path).into())
            .expect("populate");
        assert_eq!(
            Value::Object(config),
            json!({"name": "keep", "server": {"host": "h", "port": 9000}})
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let tmp = TempDir::new().expect("tmp");
        let err = load(FileSource::new(tmp.path().join("missing.toml"))).expect_err("missing");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_optional_missing_file_is_skipped() {
        let tmp = TempDir::new().expect("tmp");
        let config = load(FileSource::new(tmp.path().join("missing.toml")).optional(true))
            .expect("optional");
        assert!(config.is_empty());

        let config = load(FileSource::from_env("CONFSTACK_TEST_UNSET_FILE_VAR").optional(true))
            .expect("optional env");
        assert!(config.is_empty());
    }

    #[test]
    fn test_invalid_syntax_is_parse_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "name = \n").expect("write");

        let err = load(FileSource::new(&path)).expect_err("bad toml");
        assert!(matches!(err, ConfigError::Parse { format: "TOML", .. }));
    }

    #[test]
    fn test_top_level_must_be_mapping() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("list.json");
        fs::write(&path, "[1, 2]").expect("write");

        let err = load(FileSource::new(&path)).expect_err("list");
        assert!(matches!(err, ConfigError::Parse { format: "JSON", .. }));
    }

    #[test]
    fn test_empty_yaml_is_empty_mapping() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("empty.yml");
        fs::write(&path, "\n").expect("write");
        assert!(load(FileSource::new(&path)).expect("config").is_empty());
    }

    #[test]
    fn test_file_from_env_with_folder() {
        let _env = ENV_LOCK.lock();
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("env.json"), r#"{"from": "env"}"#).expect("write");
        std::env::set_var("CONFSTACK_TEST_FILE_FROM_ENV", "env.json");

        let config =
            load(FileSource::from_env("CONFSTACK_TEST_FILE_FROM_ENV").folder(tmp.path()))
                .expect("config");
        assert_eq!(config.get("from"), Some(&json!("env")));
    }

    #[test]
    fn test_file_from_env_unset_fails() {
        let _env = ENV_LOCK.lock();
        let err = load(FileSource::from_env("CONFSTACK_TEST_FILE_VAR_NEVER_SET"))
            .expect_err("unset");
        assert!(matches!(err, ConfigError::FileSource(_)));
    }

    #[test]
    fn test_file_from_cl_position_and_flag() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("cl.toml");
        fs::write(&path, "from = 'cl'\n").expect("write");
        let path_str = path.to_str().expect("utf8 path").to_string();

        let by_position = FileSource::from_cl(FileFromCl::Position(1))
            .args(vec!["run".to_string(), path_str.clone()]);
        assert_eq!(load(by_position).expect("config").get("from"), Some(&json!("cl")));

        let by_flag = FileSource::from_cl(FileFromCl::Flag("--config".to_string()))
            .args(vec!["--config".to_string(), path_str]);
        assert_eq!(load(by_flag).expect("config").get("from"), Some(&json!("cl")));

        let missing = FileSource::from_cl(FileFromCl::Flag("--config".to_string()))
            .args(vec!["--config".to_string()]);
        assert!(matches!(load(missing), Err(ConfigError::FileSource(_))));
    }

    #[test]
    fn test_no_path_set_fails() {
        let err = load(FileSource::default()).expect_err("no path");
        assert!(matches!(err, ConfigError::FileSource(ref msg) if msg.contains("No file source set")));
    }

    #[test]
    fn test_rejects_foreign_source() {
        let mut config = Mapping::new();
        let err = FileLoader
            .populate_config(&mut config, &ConfigSource::Data(Default::default()))
            .expect_err("mismatch");
        assert!(matches!(err, ConfigError::SourceMismatch { .. }));
    }
}
