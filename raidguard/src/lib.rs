//! Raid blocking and PvP zone access control.
//!
//! Bundles the raidguard crates behind feature flags. The decision engine and its
//! primitives are always available; file configuration, background maintenance and
//! tracing setup can be switched off for embedders that bring their own.

#![warn(missing_docs, clippy::pedantic)]

/// Shared identifiers, geometry and clocks.
pub use raid_primitives as primitives;

/// Decision engine, time window, exceptions and zones.
pub use raid_policy as policy;

/// JSON configuration loading (enabled by `config` feature).
#[cfg(feature = "config")]
pub use raid_config as config;

/// Sweep, reload and announcement loops (enabled by `kernel` feature).
#[cfg(feature = "kernel")]
pub use raid_kernel as kernel;

/// Tracing setup and audit logging (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use raid_telemetry as telemetry;

pub use raid_policy::{PolicyDecision, PolicyDecisionEngine, PolicyEngine, PolicyRequest};
