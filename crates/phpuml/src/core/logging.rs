//! Logging setup for the extraction pipeline
//!
//! Events and spans are emitted with `tracing`; this module installs a
//! `tracing-subscriber` registry that writes to stderr so that diagram text on
//! stdout stays clean.
//!
//! # Usage
//!
//! ```rust,no_run
//! use phpuml::core::logging::init_logging;
//!
//! init_logging(None, None).ok();
//! // or
//! init_logging(Some("debug"), Some("pretty")).ok();
//! ```
//!
//! # Environment Variables
//!
//! - `PHPUML_LOG_LEVEL`: level or filter directive (trace|debug|info|warn|error|off)
//! - `RUST_LOG`: standard `EnvFilter` directives, used when the above is unset
//! - `PHPUML_LOG_FORMAT`: compact|pretty|json
//!
//! Per-component filtering works with the usual directive syntax:
//!
//! ```bash
//! RUST_LOG="info,phpuml::plugins::class::extractor=trace" phpuml convert -i src/User.php
//! ```

use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

#[cfg(target_arch = "wasm32")]
use tracing_wasm::WASMLayerConfig;

pub const LEVEL_ENV: &str = "PHPUML_LOG_LEVEL";
pub const FORMAT_ENV: &str = "PHPUML_LOG_FORMAT";

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single line per event, no targets
    #[default]
    Compact,
    /// Multi-line with file/line and span activity
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Resolved logging settings: explicit argument, then environment, then default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub format: String,
}

impl LogSettings {
    pub fn resolve(level: Option<&str>, format: Option<&str>) -> Self {
        Self::resolve_with(level, format, |key| std::env::var(key).ok())
    }

    /// Resolution with an injectable environment lookup
    pub fn resolve_with(
        level: Option<&str>,
        format: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let level = level
            .map(str::to_string)
            .or_else(|| env(LEVEL_ENV))
            .or_else(|| env("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());
        let format = format
            .map(str::to_string)
            .or_else(|| env(FORMAT_ENV))
            .unwrap_or_else(|| "compact".to_string());
        Self { level, format }
    }
}

/// Install the global subscriber
///
/// `level` and `format` override the environment. Fails on an unknown format
/// or when a global subscriber is already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_arch = "wasm32")]
    {
        // browser console; level and format are not configurable there
        let _ = (level, format);
        tracing_wasm::set_as_global_default_with_config(WASMLayerConfig::default());
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let settings = LogSettings::resolve(level, format);

        let filter = if settings.level == "off" {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_new(&settings.level).unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let format = LogFormat::from_str(&settings.format)
            .map_err(|e| format!("Invalid log format: {}", e))?;

        match format {
            LogFormat::Compact => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_writer(std::io::stderr)
                            .with_target(false)
                            .with_level(true)
                            .with_span_events(FmtSpan::NONE)
                            .compact(),
                    )
                    .try_init()?;
            }
            LogFormat::Pretty => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_writer(std::io::stderr)
                            .with_target(true)
                            .with_file(true)
                            .with_line_number(true)
                            .with_span_events(FmtSpan::ACTIVE)
                            .pretty(),
                    )
                    .try_init()?;
            }
            LogFormat::Json => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_writer(std::io::stderr)
                            .with_target(true)
                            .with_span_events(FmtSpan::CLOSE)
                            .json(),
                    )
                    .try_init()?;
            }
        }

        Ok(())
    }
}

pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str(" JSON ").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_resolve_prefers_arguments() {
        let settings = LogSettings::resolve_with(Some("trace"), Some("json"), |_| {
            Some("error".to_string())
        });
        assert_eq!(settings.level, "trace");
        assert_eq!(settings.format, "json");
    }

    #[test]
    fn test_resolve_falls_back_to_env_then_default() {
        let settings = LogSettings::resolve_with(None, None, |key| match key {
            "RUST_LOG" => Some("warn".to_string()),
            _ => None,
        });
        assert_eq!(settings.level, "warn");
        assert_eq!(settings.format, "compact");

        let settings = LogSettings::resolve_with(None, None, |key| match key {
            LEVEL_ENV => Some("debug".to_string()),
            "RUST_LOG" => Some("warn".to_string()),
            FORMAT_ENV => Some("pretty".to_string()),
            _ => None,
        });
        assert_eq!(settings.level, "debug");
        assert_eq!(settings.format, "pretty");

        let settings = LogSettings::resolve_with(None, None, |_| None);
        assert_eq!(settings.level, "info");
    }
}
