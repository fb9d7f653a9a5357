//! Shared error definitions for raidguard primitives.

use std::num::ParseIntError;

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided identifier could not be parsed.
    #[error("invalid id `{value}`: {source}")]
    InvalidId {
        /// The offending identifier string.
        value: String,
        /// Source parsing error.
        source: ParseIntError,
    },

    /// World bounds failed validation.
    #[error("invalid world bounds: {reason}")]
    InvalidBounds {
        /// Human-readable reason for rejection.
        reason: String,
    },
}
