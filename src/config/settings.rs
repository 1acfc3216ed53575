use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::rewrite::{Rewriter, PLACEHOLDER_TRANSACTION};
use crate::util::paths::config_path;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config file already exists: {0}")]
    AlreadyExists(PathBuf),
    #[error("Invalid request call pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// What to do when a single file cannot be processed
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OnError {
    /// Log the failure, record it, and keep going
    Continue,
    /// Stop the run at the first failure
    Abort,
}

/// Which files a directory walk picks up
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Extension of the scripts to rewrite (without the dot)
    pub script_extension: String,
    /// Extension of the marker file whose stem is the session tag
    pub marker_extension: String,
    /// Exact name of the shared declarations file
    pub declarations_file: String,
    /// File names that are never touched
    pub excluded_files: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct RewriteConfig {
    /// Function names treated as web requests
    pub request_calls: Vec<String>,
    /// Transaction name for requests outside any transaction
    pub placeholder_transaction: String,
}

#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    pub on_error: OnError,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub scan: ScanConfig,
    pub rewrite: RewriteConfig,
    pub run: RunConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanConfig {
                script_extension: "c".into(),
                marker_extension: "usr".into(),
                declarations_file: "globals.h".into(),
                excluded_files: ["excluded_file1.c", "excluded_file2.c"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
            rewrite: RewriteConfig {
                request_calls: vec![
                    "web_url".into(),
                    "web_submit_data".into(),
                    "web_custom_request".into(),
                ],
                placeholder_transaction: PLACEHOLDER_TRANSACTION.into(),
            },
            run: RunConfig {
                on_error: OnError::Continue,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlScanConfig {
    pub script_extension: Option<String>,
    pub marker_extension: Option<String>,
    pub declarations_file: Option<String>,
    pub excluded_files: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlRewriteConfig {
    pub request_calls: Option<Vec<String>>,
    pub placeholder_transaction: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlRunConfig {
    pub on_error: Option<OnError>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Directory walk configuration
    pub scan: Option<TomlScanConfig>,
    /// Script rewriting configuration
    pub rewrite: Option<TomlRewriteConfig>,
    /// Failure handling configuration
    pub run: Option<TomlRunConfig>,
}

impl Config {
    /// Load the user config from the data directory, falling back to
    /// defaults when no file exists
    pub fn load() -> Result<Self, ConfigError> {
        let config_file = config_path();
        if config_file.exists() {
            Self::load_from(&config_file)
        } else {
            Ok(Self::default())
        }
    }

    /// Load a config file and merge it over the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse TOML text and merge it over the defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let toml_config = toml::from_str::<TomlConfig>(contents)?;
        let mut config = Config::default();
        config.merge(toml_config);
        Ok(config)
    }

    fn merge(&mut self, toml_config: TomlConfig) {
        if let Some(scan) = toml_config.scan {
            if let Some(ext) = scan.script_extension {
                self.scan.script_extension = ext.trim_start_matches('.').to_string();
            }
            if let Some(ext) = scan.marker_extension {
                self.scan.marker_extension = ext.trim_start_matches('.').to_string();
            }
            if let Some(name) = scan.declarations_file {
                self.scan.declarations_file = name;
            }
            if let Some(excluded) = scan.excluded_files {
                self.scan.excluded_files = excluded.into_iter().collect();
            }
        }

        if let Some(rewrite) = toml_config.rewrite {
            if let Some(calls) = rewrite.request_calls {
                self.rewrite.request_calls = calls;
            }
            if let Some(placeholder) = rewrite.placeholder_transaction {
                self.rewrite.placeholder_transaction = placeholder;
            }
        }

        if let Some(run) = toml_config.run {
            if let Some(on_error) = run.on_error {
                self.run.on_error = on_error;
            }
        }
    }

    /// Write the bundled example config to `path`, refusing to overwrite
    pub fn write_example(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }

        fs::write(path, EXAMPLE_CONFIG).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scan.excluded_files.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_on_error(mut self, on_error: OnError) -> Self {
        self.run.on_error = on_error;
        self
    }

    /// Build the script rewriter this config describes
    pub fn rewriter(&self) -> Result<Rewriter, ConfigError> {
        Ok(Rewriter::new(
            self.rewrite.request_calls.as_slice(),
            &self.rewrite.placeholder_transaction,
        )?)
    }
}
