//! TOML configuration.
//!
//! Every section has defaults, so an empty file (or no file at all) is a
//! valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::pipeline::filter::{ParseOptions, DEFAULT_DATE_FORMATS, DEFAULT_DATETIME_FORMATS};
use crate::source::ColumnMapping;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "RECOVERYDASH_CONFIG";

/// Config file picked up from the working directory when nothing else is set.
pub const LOCAL_CONFIG_FILE: &str = "recoverydash.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub columns: ColumnMapping,
    #[serde(default)]
    pub parsing: ParsingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DashboardConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve configuration:
    /// 1. An explicit path (errors are returned, not swallowed).
    /// 2. The path in `RECOVERYDASH_CONFIG`.
    /// 3. `recoverydash.toml` in the working directory.
    /// 4. Compiled-in defaults.
    ///
    /// Unreadable fallbacks are skipped and reported in the result, since
    /// this runs before the log subscriber exists.
    pub fn resolve(explicit: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
        if let Some(path) = explicit {
            return Ok(ResolvedConfig {
                config: Self::load(path)?,
                origin: Some(path.to_path_buf()),
                skipped: Vec::new(),
            });
        }

        let mut candidates = Vec::new();
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            candidates.push(PathBuf::from(env_path));
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            candidates.push(local);
        }

        let mut skipped = Vec::new();
        for path in candidates {
            match Self::load(&path) {
                Ok(config) => {
                    return Ok(ResolvedConfig {
                        config,
                        origin: Some(path),
                        skipped,
                    })
                }
                Err(e) => skipped.push((path, e)),
            }
        }

        Ok(ResolvedConfig {
            config: Self::default(),
            origin: None,
            skipped,
        })
    }
}

/// Outcome of [`DashboardConfig::resolve`].
#[derive(Debug)]
pub struct ResolvedConfig {
    pub config: DashboardConfig,
    /// `None` means compiled-in defaults.
    pub origin: Option<PathBuf>,
    /// Fallback files that could not be loaded, in the order they were tried.
    pub skipped: Vec<(PathBuf, ConfigError)>,
}

impl ResolvedConfig {
    /// Report how the configuration was resolved. Call once logging is up.
    pub fn log(&self) {
        for (path, error) in &self.skipped {
            warn!(
                path = %path.display(),
                error = %error,
                "config file could not be loaded, trying fallback"
            );
        }
        match &self.origin {
            Some(path) => info!(path = %path.display(), "loaded configuration"),
            None => debug!("no config file found, using compiled-in defaults"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// How input files are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Timestamp layouts (chrono `strftime` syntax). RFC 3339 is always tried first.
    pub datetime_formats: Vec<String>,
    pub date_formats: Vec<String>,
    /// CSV field separator. Detected from the header line when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            datetime_formats: DEFAULT_DATETIME_FORMATS.iter().map(|f| f.to_string()).collect(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            delimiter: None,
        }
    }
}

impl ParsingConfig {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            datetime_formats: self.datetime_formats.clone(),
            date_formats: self.date_formats.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8050".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
