//! Tracing subscriber setup.

use anyhow::{anyhow, Result};
use std::env;
use std::io;
use tracing::debug;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `chef_genius=debug`.
    pub level: String,
    pub format: LogFormat,
    /// Include source file and line numbers.
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Compact,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format: LogFormat::parse(env::var("LOG_FORMAT").ok().as_deref()),
            include_location: env::var("LOG_INCLUDE_LOCATION").is_ok(),
        }
    }

    /// A copy with `level` replaced, used by `--verbose`.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    fn filter(&self) -> EnvFilter {
        let quiet = |directive: &str| -> Directive {
            directive
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into())
        };
        EnvFilter::new(&self.level)
            .add_directive(quiet("hyper=warn"))
            .add_directive(quiet("reqwest=warn"))
    }

    /// Installs the global subscriber. Logs go to stderr so command output
    /// on stdout stays clean.
    ///
    /// # Errors
    ///
    /// Fails if a global subscriber is already set.
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.filter());
        let result = match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_writer(io::stderr),
                )
                .try_init(),
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_writer(io::stderr),
                )
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_writer(io::stderr),
                )
                .try_init(),
        };
        result.map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;
        debug!(level = %self.level, format = ?self.format, "Logging initialized");
        Ok(())
    }
}
