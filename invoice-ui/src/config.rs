//! Settings read from a TOML file at startup.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use invoice_core::db::DbConfig;

use crate::logging;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application settings. Every field has a default, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub invoice_prefix: String,
    /// How many invoices the dashboard lists under "Recent".
    pub recent_invoice_count: usize,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub database: DbConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            invoice_prefix: "INV-".to_string(),
            recent_invoice_count: 5,
            log_level: "info".to_string(),
            log_file: None,
            database: DbConfig {
                backend: "sqlite".to_string(),
                connection_string: "sqlite:invoices.db?mode=rwc".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// `<executable name>.toml` in the working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(format!("{}.toml", logging::app_name()))
    }

    /// Read and parse `path`. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }
}
