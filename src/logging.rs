//! Structured logging setup.
//!
//! - stdout is reserved for command payloads (summaries, CSV, JSON)
//! - stderr receives all log output, human-readable or JSON lines
//! - `RUST_LOG` overrides the configured level when set

use std::io::IsTerminal;

use clap::ValueEnum;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable console output.
    Human,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Default filter directive when `RUST_LOG` is unset.
pub fn default_directive(level: LogLevel) -> String {
    format!("convsim={}", level.as_str())
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(level: LogLevel, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    // `try_init` fails only when a subscriber is already installed (e.g. tests).
    let _ = match format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
        LogFormat::Json => {
            let layer = fmt::layer().json().with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_targets_this_crate() {
        assert_eq!(default_directive(LogLevel::Debug), "convsim=debug");
    }

    #[test]
    fn repeated_init_does_not_panic() {
        init_logging(LogLevel::Warn, LogFormat::Human);
        init_logging(LogLevel::Info, LogFormat::Json);
    }
}
