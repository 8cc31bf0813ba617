//! Service Configuration
//!
//! Settings are read from an optional TOML file and then overridden by command
//! line flags (which themselves fall back to `MEDSEARCH_*` environment variables).
//! Every section has defaults, so an empty file, or no file at all, is valid.
//!
//! ```toml
//! [database]
//! path = "medicines.db"
//!
//! [server]
//! bind = "0.0.0.0:8000"
//!
//! [pool]
//! min_size = 1
//! max_size = 16
//! acquire_wait = { bounded = "5s" }   # or: acquire_wait = "indefinite"
//!
//! [search]
//! default_limit = 50
//! fuzzy_threshold = 0.2
//! query_timeout = "2s"
//!
//! [import]
//! data_dir = "data"
//! null_ids = "collapse"               # or: "always_unique"
//! ```

use crate::error::ConfigError;
use crate::ingestion::types::NullIdPolicy;
use crate::pool::types::PoolConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "MEDSEARCH_CONFIG";

pub const DEFAULT_LIMIT: i64 = 50;
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.2;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub pool: PoolConfig,
    pub search: SearchConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("medicines.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}

/// Tuning of the search dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Limit applied when a request does not carry one.
    pub default_limit: i64,
    /// Fuzzy matches must score strictly above this similarity.
    pub fuzzy_threshold: f64,
    /// Upper bound for a single store round-trip. `None` lets statements run to completion.
    #[serde(with = "humantime_serde")]
    pub query_timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            query_timeout: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub data_dir: PathBuf,
    pub null_ids: NullIdPolicy,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            null_ids: NullIdPolicy::default(),
        }
    }
}

impl Config {
    /// Loads the config file named explicitly or through `MEDSEARCH_CONFIG`.
    ///
    /// Without either, the defaults are returned. An explicitly named file that
    /// does not exist is an error.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

        let config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.default_limit <= 0 {
            return Err(ConfigError::Invalid(format!(
                "search.default_limit must be positive, got {}",
                self.search.default_limit
            )));
        }
        if !(0.0..1.0).contains(&self.search.fuzzy_threshold) {
            return Err(ConfigError::Invalid(format!(
                "search.fuzzy_threshold must be in [0, 1), got {}",
                self.search.fuzzy_threshold
            )));
        }
        self.pool
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}
