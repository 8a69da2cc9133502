//! Tracing subscriber setup for applications using Parla
//!
//! Library crates only emit events; binaries opt in by calling
//! [`init_tracing`] once at startup.
//!
//! | Target | Level | Events |
//! |--------|-------|--------|
//! | `parla_exec` | `debug` | pool start and stop |
//! | `parla_exec` | `trace` | every dispatch |
//! | `parla_exec` | `warn` | panics caught on a worker |
//! | `parla_solve` | `trace` | each CG iteration |
//! | `parla_solve` | `debug` | CG completion |
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directive (default `parla=info,warn`)
//! - `PARLA_LOG_FORMAT`: `pretty`, `json` or `compact` (default `pretty`)

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "PARLA_LOG_FORMAT";

const DEFAULT_FILTER: &str = "parla=info,warn";

/// Tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingFormat {
    /// Multi-line human-readable output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
    /// Single line per event
    Compact,
}

impl TracingFormat {
    /// Parse a format name; unknown names fall back to `Pretty`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => TracingFormat::Json,
            "compact" => TracingFormat::Compact,
            _ => TracingFormat::Pretty,
        }
    }
}

/// Subscriber configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub format: TracingFormat,
    /// `EnvFilter` directive, e.g. `parla_solve=trace,info`
    pub filter: String,
    pub with_ansi: bool,
    pub with_target: bool,
    /// Worker threads are named, so this is on by default
    pub with_thread_names: bool,
    pub with_file: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        let format = std::env::var(LOG_FORMAT_ENV)
            .map(|s| TracingFormat::parse(&s))
            .unwrap_or_default();
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

        Self {
            format,
            filter,
            with_ansi: true,
            with_target: true,
            with_thread_names: true,
            with_file: false,
        }
    }
}

impl TracingConfig {
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_ansi(mut self, enabled: bool) -> Self {
        self.with_ansi = enabled;
        self
    }
}

/// Install a global subscriber built from `config`
///
/// # Errors
///
/// Fails if the filter directive does not parse or a global subscriber is
/// already installed.
///
/// # Example
///
/// ```no_run
/// use parla::logging::{init_tracing, TracingConfig, TracingFormat};
///
/// fn main() -> anyhow::Result<()> {
///     init_tracing(TracingConfig::default().with_format(TracingFormat::Compact))?;
///     Ok(())
/// }
/// ```
pub fn init_tracing(config: TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .with_context(|| format!("invalid tracing filter {:?}", config.filter))?;

    let layer = match config.format {
        TracingFormat::Pretty => fmt::layer()
            .pretty()
            .with_ansi(config.with_ansi)
            .with_target(config.with_target)
            .with_thread_names(config.with_thread_names)
            .with_file(config.with_file)
            .with_filter(filter)
            .boxed(),
        TracingFormat::Json => fmt::layer()
            .json()
            .with_target(config.with_target)
            .with_thread_names(config.with_thread_names)
            .with_file(config.with_file)
            .with_filter(filter)
            .boxed(),
        TracingFormat::Compact => fmt::layer()
            .compact()
            .with_ansi(config.with_ansi)
            .with_target(config.with_target)
            .with_thread_names(config.with_thread_names)
            .with_file(config.with_file)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!(TracingFormat::parse("JSON"), TracingFormat::Json);
        assert_eq!(TracingFormat::parse(" compact "), TracingFormat::Compact);
        assert_eq!(TracingFormat::parse("pretty"), TracingFormat::Pretty);
        assert_eq!(TracingFormat::parse("fancy"), TracingFormat::Pretty);
    }

    #[test]
    fn test_builder() {
        let config = TracingConfig::default()
            .with_format(TracingFormat::Json)
            .with_filter("parla_exec=trace")
            .with_ansi(false);
        assert_eq!(config.format, TracingFormat::Json);
        assert_eq!(config.filter, "parla_exec=trace");
        assert!(!config.with_ansi);
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let config = TracingConfig::default().with_filter("parla=loudest");
        assert!(init_tracing(config).is_err());
    }
}
