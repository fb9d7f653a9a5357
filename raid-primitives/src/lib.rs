//! Core shared types for the raidguard access-control engine.

#![warn(missing_docs, clippy::pedantic)]

mod clock;
mod error;
mod geometry;
mod ids;

/// Time sources threaded into decisions as an explicit `now`.
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// World-space positions and terrain normalisation.
pub use geometry::{NormalizedPoint, Position, WorldBounds};
/// Identifiers for actors and raid-protectable targets.
pub use ids::{ActorId, TargetId};
