//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Settings are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags and action inputs ([`Overrides`])
//!
//! # Config File Location
//!
//! Searched in order:
//! 1. The path given with `--config` (must exist)
//! 2. `$TAGTRACK_CONFIG` if set
//! 3. `.github/tagtrack.toml` under the working directory
//!
//! A missing file is not an error; defaults are used.
//!
//! # Example
//!
//! ```no_run
//! use tagtrack::core::config::{Config, Overrides};
//! use std::path::Path;
//!
//! let result = Config::load(None, Path::new(".")).unwrap();
//! let settings = result.config.settings(&Overrides::default()).unwrap();
//! println!("Watching {}", settings.namespace);
//! ```

pub mod schema;

pub use schema::{FileConfig, DEFAULT_LATEST_TAG, MAX_PAGE_SIZE};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::types::RefNamespace;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "TAGTRACK_CONFIG";

/// Config file location relative to the working directory.
pub const REPO_CONFIG_PATH: &str = ".github/tagtrack.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded configuration file, if any.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: FileConfig,
    path: Option<PathBuf>,
}

/// Values supplied on the command line or as action inputs.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub prefer_branch_releases: Option<bool>,
    pub publish_latest: Option<bool>,
    pub latest_tag: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Namespace watched for released versions
    pub namespace: RefNamespace,
    /// Move the latest tag too
    pub publish_latest: bool,
    /// Name of the latest tag
    pub latest_tag: String,
    /// Refs requested per page
    pub page_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            namespace: RefNamespace::Tags,
            publish_latest: false,
            latest_tag: DEFAULT_LATEST_TAG.to_string(),
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load configuration, consulting `$TAGTRACK_CONFIG`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or
    /// parsed, or if `explicit` is given and does not exist.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<ConfigLoadResult, ConfigError> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load_with_env(explicit, env_path.as_deref(), cwd)
    }

    /// Load configuration with the environment lookup already done.
    pub fn load_with_env(
        explicit: Option<&Path>,
        env_path: Option<&Path>,
        cwd: &Path,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let path = if let Some(path) = explicit {
            Some(path.to_path_buf())
        } else if let Some(path) = env_path.filter(|p| p.exists()) {
            Some(path.to_path_buf())
        } else {
            if let Some(path) = env_path {
                warnings.push(ConfigWarning {
                    message: format!("${} points to a missing file, ignoring it", CONFIG_ENV),
                    path: path.to_path_buf(),
                });
            }
            Some(cwd.join(REPO_CONFIG_PATH)).filter(|p| p.exists())
        };

        let file = match &path {
            Some(path) => Self::read_file(path)?,
            None => FileConfig::default(),
        };
        file.validate()?;

        Ok(ConfigLoadResult {
            config: Config { file, path },
            warnings,
        })
    }

    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Path of the file this config was read from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Apply overrides and defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if an override is invalid.
    pub fn settings(&self, overrides: &Overrides) -> Result<Settings, ConfigError> {
        let defaults = Settings::default();

        let prefer_branches = overrides
            .prefer_branch_releases
            .or(self.file.prefer_branch_releases)
            .unwrap_or(false);

        let latest_tag = overrides
            .latest_tag
            .clone()
            .or_else(|| self.file.latest_tag.clone())
            .unwrap_or(defaults.latest_tag);
        schema::validate_tag_name(&latest_tag)?;

        Ok(Settings {
            namespace: RefNamespace::preferred(prefer_branches),
            publish_latest: overrides
                .publish_latest
                .or(self.file.publish_latest)
                .unwrap_or(defaults.publish_latest),
            latest_tag,
            page_size: self.file.page_size.unwrap_or(defaults.page_size),
        })
    }
}
