//! Settings file loading and validation.
//!
//! Resolution order: `--config <path>` (or `FM_CONFIG`, handled by clap) >
//! built-in defaults. Every field is optional in the file.
//!
//! ```toml
//! [test]
//! alternative = "greater"
//! variant = "risk-ratio"
//! root_tolerance = 1e-8
//!
//! [output]
//! format = "md"
//! precision = 4
//!
//! [log]
//! level = "debug"
//! format = "json"
//! ```

use crate::hypothesis::{Alternative, Variant};
use crate::logging::LogConfig;
use fm_common::{Error, OutputFormat};
use fm_math::DEFAULT_ROOT_TOLERANCE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest accepted root-selection tolerance.
pub const MAX_ROOT_TOLERANCE: f64 = 1e-3;

/// Most significant digits an `f64` can carry.
pub const MAX_PRECISION: usize = 17;

/// Errors that can occur during settings loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid TOML in config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid setting `{field}`: {message}")]
    Validation { field: &'static str, message: String },
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// `[test]` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestSettings {
    /// Alternative used when a request names none.
    pub alternative: Alternative,
    /// Variant used by the `counts` subcommand when no null parameter picks one.
    pub variant: Variant,
    /// Slack for accepting a likelihood root just outside its admissible interval.
    pub root_tolerance: f64,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            alternative: Alternative::TwoSided,
            variant: Variant::RiskDifference,
            root_tolerance: DEFAULT_ROOT_TOLERANCE,
        }
    }
}

/// `[output]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub format: OutputFormat,
    /// Significant digits in `md` and `summary` output.
    pub precision: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            precision: 6,
        }
    }
}

/// Complete resolved settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub test: TestSettings,
    pub output: OutputSettings,
    pub log: LogConfig,
}

impl Settings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load from `path` when given, else return defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let settings = Self::load(path)?;
                tracing::debug!(path = %path.display(), "loaded settings file");
                Ok(settings)
            }
            None => Ok(Self::default()),
        }
    }

    /// Semantic checks serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tol = self.test.root_tolerance;
        if !tol.is_finite() || tol <= 0.0 || tol > MAX_ROOT_TOLERANCE {
            return Err(ConfigError::Validation {
                field: "test.root_tolerance",
                message: format!("must lie in (0, {MAX_ROOT_TOLERANCE}], got {tol}"),
            });
        }
        if self.output.precision > MAX_PRECISION {
            return Err(ConfigError::Validation {
                field: "output.precision",
                message: format!(
                    "must be at most {MAX_PRECISION}, got {}",
                    self.output.precision
                ),
            });
        }
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
