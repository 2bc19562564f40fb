//! Tracing/logging initialization.
//!
//! `RUST_LOG` selects the filter (default `info`); `CAMPUS_LOG_FORMAT`
//! selects `json` (default) or `pretty` output.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const FORMAT_ENV: &str = "CAMPUS_LOG_FORMAT";
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown log format `{0}` (expected `json` or `pretty`)")]
pub struct LogFormatError(pub String);

impl FromStr for LogFormat {
    type Err = LogFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            _ => Err(LogFormatError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// `EnvFilter` directive, e.g. `campus_assignments=debug,info`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl TracingConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(EnvFilter::DEFAULT_ENV).ok(),
            std::env::var(FORMAT_ENV).ok(),
        )
    }

    /// Build from raw variable values. Blank or unparseable values fall back
    /// to the defaults.
    pub fn from_vars(filter: Option<String>, format: Option<String>) -> Self {
        let filter = filter
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        let format = format
            .and_then(|f| f.parse().ok())
            .unwrap_or_default();
        Self { filter, format }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber described by `config`.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_with(config: &TracingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    match config.format {
        LogFormat::Json => builder.json().with_target(false).try_init().is_ok(),
        LogFormat::Pretty => builder.pretty().try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset_or_blank() {
        assert_eq!(TracingConfig::from_vars(None, None), TracingConfig::default());
        let cfg = TracingConfig::from_vars(Some("  ".into()), Some("yaml".into()));
        assert_eq!(cfg.filter, "info");
        assert_eq!(cfg.format, LogFormat::Json);
    }

    #[test]
    fn reads_filter_and_format() {
        let cfg = TracingConfig::from_vars(Some("campus_auth=debug".into()), Some("Pretty".into()));
        assert_eq!(cfg.filter, "campus_auth=debug");
        assert_eq!(cfg.format, LogFormat::Pretty);
    }

    #[test]
    fn unknown_format_is_reported() {
        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert_eq!(err, LogFormatError("xml".into()));
        assert!(err.to_string().contains("json"));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: TracingConfig = serde_json::from_str(r#"{ "format": "pretty" }"#).unwrap();
        assert_eq!(cfg.filter, "info");
        assert_eq!(cfg.format, LogFormat::Pretty);
    }

    #[test]
    fn second_init_is_a_no_op() {
        let cfg = TracingConfig::from_vars(Some("not a [valid filter".into()), None);
        let first = init_with(&cfg);
        let second = init_with(&cfg);
        assert!(!second || !first);
        ::tracing::info!("subscriber installed");
    }
}
