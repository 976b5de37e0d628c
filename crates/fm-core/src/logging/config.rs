//! Logging configuration.
//!
//! Supports configuration via:
//! - Environment variables (FM_LOG, RUST_LOG, FM_LOG_FORMAT)
//! - CLI flags (-v, -q)
//! - The `[log]` table of the settings file

use serde::{Deserialize, Serialize};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("unknown log format: {s}")),
        }
    }
}

/// Log level filter. `Warn` keeps stderr quiet next to the stdout payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    /// Coarse level from a `RUST_LOG` directive string: the most verbose
    /// level named anywhere in it.
    fn scan_directives(directives: &str) -> Option<Self> {
        [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ]
        .into_iter()
        .find(|level| directives.contains(level.as_str()))
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warning" => Ok(LogLevel::Warn),
            "quiet" => Ok(LogLevel::Off),
            other => [
                LogLevel::Trace,
                LogLevel::Debug,
                LogLevel::Info,
                LogLevel::Warn,
                LogLevel::Error,
                LogLevel::Off,
            ]
            .into_iter()
            .find(|level| level.as_str() == other)
            .ok_or_else(|| format!("unknown log level: {s}")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `[log]` table of the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

/// Raw logging overrides, lowest precedence first after the settings file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOverrides<'a> {
    /// `RUST_LOG`, scanned for a level name.
    pub rust_log: Option<&'a str>,
    /// `FM_LOG`; replaces the `RUST_LOG` scan when set.
    pub fm_log: Option<&'a str>,
    /// `FM_LOG_FORMAT`.
    pub fm_log_format: Option<&'a str>,
    /// `-v` / `-q`.
    pub cli_level: Option<LogLevel>,
}

impl LogConfig {
    /// Layer the process environment and CLI level over `base`.
    pub fn from_env(base: LogConfig, cli_level: Option<LogLevel>) -> Self {
        let rust_log = std::env::var("RUST_LOG").ok();
        let fm_log = std::env::var("FM_LOG").ok();
        let fm_log_format = std::env::var("FM_LOG_FORMAT").ok();
        base.layered(LogOverrides {
            rust_log: rust_log.as_deref(),
            fm_log: fm_log.as_deref(),
            fm_log_format: fm_log_format.as_deref(),
            cli_level,
        })
    }

    /// Apply `overrides` over `self`. Unparseable values are ignored.
    pub fn layered(mut self, overrides: LogOverrides<'_>) -> Self {
        match overrides.fm_log {
            Some(val) => {
                if let Ok(level) = val.parse() {
                    self.level = level;
                }
            }
            None => {
                if let Some(level) = overrides.rust_log.and_then(LogLevel::scan_directives) {
                    self.level = level;
                }
            }
        }
        if let Some(Ok(format)) = overrides.fm_log_format.map(str::parse::<LogFormat>) {
            self.format = format;
        }
        if let Some(level) = overrides.cli_level {
            self.level = level;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_file() -> LogConfig {
        LogConfig {
            level: LogLevel::Error,
            format: LogFormat::Human,
        }
    }

    #[test]
    fn level_names_round_trip() {
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
            LogLevel::Off,
        ] {
            assert_eq!(level.to_string().parse::<LogLevel>().unwrap(), level);
        }
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("quiet".parse::<LogLevel>().unwrap(), LogLevel::Off);
        assert!("loud".parse::<LogLevel>().is_err());
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn defaults_are_quiet_human() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Human);
    }

    #[test]
    fn no_overrides_keeps_settings_file() {
        let config = settings_file().layered(LogOverrides::default());
        assert_eq!(config, settings_file());
    }

    #[test]
    fn rust_log_scan_picks_most_verbose_level() {
        let config = settings_file().layered(LogOverrides {
            rust_log: Some("hyper=warn,fm_core=debug"),
            ..LogOverrides::default()
        });
        assert_eq!(config.level, LogLevel::Debug);

        let config = settings_file().layered(LogOverrides {
            rust_log: Some("fm_core"),
            ..LogOverrides::default()
        });
        assert_eq!(config.level, LogLevel::Error);
    }

    #[test]
    fn fm_log_replaces_rust_log() {
        let config = settings_file().layered(LogOverrides {
            rust_log: Some("trace"),
            fm_log: Some("info"),
            ..LogOverrides::default()
        });
        assert_eq!(config.level, LogLevel::Info);
    }

    #[test]
    fn invalid_values_are_ignored() {
        let config = settings_file().layered(LogOverrides {
            fm_log: Some("chatty"),
            fm_log_format: Some("xml"),
            ..LogOverrides::default()
        });
        assert_eq!(config, settings_file());
    }

    #[test]
    fn cli_level_wins() {
        let config = settings_file().layered(LogOverrides {
            rust_log: Some("debug"),
            fm_log: Some("trace"),
            fm_log_format: Some("json"),
            cli_level: Some(LogLevel::Off),
        });
        assert_eq!(config.level, LogLevel::Off);
        assert_eq!(config.format, LogFormat::Json);
    }
}
