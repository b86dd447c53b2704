//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so console tables on stdout stay clean. `RUST_LOG`
//! overrides the level chosen on the command line.

use crate::error::{ReportError, Result};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::default(),
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// - 0 (no `-v`): warn
    /// - 1 (`-v`): info
    /// - 2 (`-vv`): debug
    /// - 3+: trace
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,apbd_report={level}")))
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = build_env_filter(config.level);
    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .without_time()
                    .with_ansi(config.with_ansi)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .without_time()
                    .with_target(false)
                    .with_ansi(config.with_ansi)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    result.map_err(|e| ReportError::Logging(e.to_string()))
}
