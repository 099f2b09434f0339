//! Layered application configuration.
//!
//! Settings are merged in increasing priority:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. TOML file (platform config directory, or `--config`)
//! 3. `SEEKFS_*` environment variables (e.g. `SEEKFS_THREADS=8`)
//! 4. Command-line flags ([`Config::merge_cli`])
//!
//! A configuration file that fails to parse is ignored with a warning.
//!
//! # Example
//!
//! ```toml
//! threads = 8
//! max_size_mb = 250
//! ignore_case = true
//! types = ["rs", "toml"]
//! output = "json"
//! ```

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{Cli, OutputFormat};

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "SEEKFS_";

/// File name inside the platform configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors from loading, validating or saving configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The merged sources could not be deserialized.
    #[error("Invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// Serializing to TOML failed.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Writing the configuration file failed.
    #[error("Failed to write configuration to {path}: {source}")]
    Write {
        /// Target file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No platform configuration directory could be determined.
    #[error("Failed to determine the configuration directory")]
    NoConfigDir,

    /// Thread count below 1.
    #[error("The number of threads must be a positive number (got {0})")]
    InvalidThreads(i64),

    /// Maximum file size of zero.
    #[error("The maximum file size must be greater than 0")]
    InvalidMaxSize,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker threads for name and content search
    pub threads: i64,
    /// Largest file considered, in megabytes
    pub max_size_mb: u64,
    /// Case-insensitive pattern matching
    pub ignore_case: bool,
    /// Extensions to restrict queries to (empty = all)
    pub types: Vec<String>,
    /// Show progress bars
    pub progress: bool,
    /// Output format
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 4,
            max_size_mb: 100,
            ignore_case: false,
            types: Vec::new(),
            progress: false,
            output: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Load from the default platform-specific path, the environment and
    /// defaults.
    #[must_use]
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from_path(path),
            None => Self::load_layers(None),
        }
    }

    /// Load from a specific TOML file, the environment and defaults.
    ///
    /// A missing file is not an error; an invalid one is ignored with a
    /// warning.
    #[must_use]
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        Self::load_layers(Some(path.as_ref()))
    }

    fn load_layers(path: Option<&Path>) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring configuration file: {}", e);
                // Environment variables still apply on their own
                Self::figment(None).extract().unwrap_or_else(|e| {
                    log::warn!("Ignoring environment configuration: {}", e);
                    Self::default()
                })
            }
        }
    }

    /// Load strictly, failing on any invalid source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if the file or environment cannot be
    /// deserialized.
    pub fn try_load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Self::figment(path).extract().map_err(Box::new)?;
        if let Some(path) = path {
            log::debug!("Configuration loaded (file: {})", path.display());
        }
        Ok(config)
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Apply command-line flags on top of the loaded configuration.
    ///
    /// Only flags that were actually given override; boolean switches can
    /// only turn a setting on.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(threads) = cli.threads {
            self.threads = threads;
        }
        if let Some(max_size) = cli.max_size {
            self.max_size_mb = max_size;
        }
        if cli.ignore_case {
            self.ignore_case = true;
        }
        if !cli.types.is_empty() {
            self.types = cli.types.clone();
        }
        if cli.progress {
            self.progress = true;
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidThreads`] or
    /// [`ConfigError::InvalidMaxSize`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads < 1 {
            return Err(ConfigError::InvalidThreads(self.threads));
        }
        if self.max_size_mb == 0 {
            return Err(ConfigError::InvalidMaxSize);
        }
        Ok(())
    }

    /// Maximum file size in bytes.
    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }

    /// Save to the default platform-specific path.
    ///
    /// # Errors
    ///
    /// Fails if no configuration directory exists or writing fails.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    /// Save as TOML to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails if serialization or writing fails.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(write_err)?;
        log::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Default platform-specific configuration file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "seekfs").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}
