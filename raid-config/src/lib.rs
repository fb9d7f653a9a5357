//! Configuration for the raidguard policy engine.
//!
//! [`RaidConfigFile`] is the on-disk JSON shape; every field has a default so partial
//! files load. [`ConfigLoader`] validates it into a [`raid_policy::EngineConfig`],
//! replacing out-of-range values with defaults and reporting each replacement as a
//! [`LoadWarning`]. [`ConfigSource`] feeds new generations to the reload loop.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod loader;
pub mod schema;
pub mod source;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, LoadResult, LoadWarning};
pub use schema::{BonusSection, RaidConfigFile};
pub use source::{ConfigSource, FileConfigSource, StaticConfigSource};
