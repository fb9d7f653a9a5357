//! Maintenance runtime for the raidguard policy engine.
//!
//! Decisions never run here. This crate owns the periodic work around the engine:
//! pruning expired zones and publishing status snapshots, pulling configuration
//! generations from a [`raid_config::ConfigSource`], and broadcasting how long raid
//! blocking still lasts.

#![warn(missing_docs, clippy::pedantic)]

mod maintenance;
mod observer;

pub use maintenance::{
    MaintenanceConfig, MaintenanceError, MaintenanceResult, MaintenanceRuntime,
};
pub use observer::{ChannelObserver, StatusObserver};
