//! Observability for raidguard.
//!
//! [`init_tracing`] installs the global `tracing` subscriber; [`audit`] records raid
//! attempts on a dedicated target so they can be routed to their own sink.

#![warn(missing_docs, clippy::pedantic)]

pub mod audit;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured filter directive.
pub const LOG_ENV: &str = "RAIDGUARD_LOG";

/// Output format of the subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Human,
    /// Newline-delimited JSON.
    Json,
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Output format.
    pub format: LogFormat,
    /// Filter directive used when `RAIDGUARD_LOG` is unset.
    pub default_directive: String,
    /// Whether to print event targets.
    pub show_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Human,
            default_directive: "info".into(),
            show_target: false,
        }
    }
}

impl TelemetryConfig {
    /// Maps a `-v` count to a directive: 0 info, 1 debug, 2+ trace.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.default_directive = match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
        .into();
        self.show_target = verbosity > 0;
        self
    }
}

/// Installs the global subscriber. Returns `false` when one was already installed,
/// so repeated calls are harmless.
pub fn init_tracing(config: &TelemetryConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));

    match config.format {
        LogFormat::Human => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(config.show_target)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(config.show_target)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_directives() {
        assert_eq!(TelemetryConfig::default().default_directive, "info");
        let verbose = TelemetryConfig::default().with_verbosity(1);
        assert_eq!(verbose.default_directive, "debug");
        assert!(verbose.show_target);
        assert_eq!(
            TelemetryConfig::default().with_verbosity(9).default_directive,
            "trace"
        );
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_tracing(&TelemetryConfig::default());
        let json = TelemetryConfig {
            format: LogFormat::Json,
            ..TelemetryConfig::default()
        };
        assert!(!init_tracing(&json));
    }
}
