//! Diagnostic logging setup.
//!
//! All diagnostics go to stderr so stdout carries only the projection.
//! The filter comes from `DIRDIGEST_LOG` when set (an `EnvFilter`
//! directive string), otherwise from the configured level.

use std::io::IsTerminal;

use clap::ValueEnum;
use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV: &str = "DIRDIGEST_LOG";

/// Environment variable selecting the output format (`text` or `json`).
pub const LOG_FORMAT_ENV: &str = "DIRDIGEST_LOG_FORMAT";

/// Diagnostic line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    pub level: String,

    /// Output format. `None` defers to `DIRDIGEST_LOG_FORMAT`, then text.
    pub format: Option<LogFormat>,

    /// Enable colored output (text format only). Defaults to whether
    /// stderr is a terminal.
    pub color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: None,
            color: std::io::stderr().is_terminal(),
        }
    }
}

/// Initialize the logging system
///
/// Filter priority: `DIRDIGEST_LOG`, then `config.level`.
/// Format priority: `config.format`, then `DIRDIGEST_LOG_FORMAT`, then text.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;

    let base_subscriber = Registry::default().with(filter);

    let result = match format {
        LogFormat::Json => base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => base_subscriber
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| eyre!("Failed to install log subscriber: {e}"))
}

/// Build environment filter from config or environment variables
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level)
        .map_err(|e| eyre!("Invalid log level '{}': {e}", config.level))
}

/// Determine output format from config or environment
fn determine_format(config: &LoggingConfig) -> Result<LogFormat> {
    if let Some(format) = config.format {
        return Ok(format);
    }

    match std::env::var(LOG_FORMAT_ENV) {
        Ok(value) => LogFormat::parse(&value).ok_or_else(|| {
            eyre!("Invalid log format: {value} (must be 'json' or 'text')")
        }),
        Err(_) => Ok(LogFormat::Text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, None);
        assert_eq!(config.color, std::io::stderr().is_terminal());
    }

    #[test]
    fn test_explicit_format_wins() {
        let config = LoggingConfig {
            format: Some(LogFormat::Json),
            ..LoggingConfig::default()
        };
        assert_eq!(determine_format(&config).unwrap(), LogFormat::Json);
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse(" text "), Some(LogFormat::Text));
        assert_eq!(LogFormat::parse("xml"), None);
    }

    #[test]
    fn test_level_filter() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..LoggingConfig::default()
        };
        assert!(EnvFilter::try_new(&config.level).is_ok());
    }
}
