use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading configuration. Out-of-range values are not errors;
/// they fall back to defaults with a warning.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid JSON for the schema.
    #[error("invalid configuration in {origin}: {source}")]
    Parse {
        /// File path, or `<inline>` for in-memory text.
        origin: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
