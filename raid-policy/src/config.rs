//! Validated engine configuration.
//!
//! A value of [`EngineConfig`] is one configuration generation. The engine swaps
//! whole generations on reload; override state is deliberately absent from it.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{NaiveTime, TimeDelta};
use raid_primitives::Timestamp;

use crate::temporal::TimeWindow;

/// One complete configuration generation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineConfig {
    /// Raid-block window settings.
    pub temporal: TemporalConfig,
    /// Grace, cooldown, and decay thresholds.
    pub exceptions: ExceptionConfig,
    /// Spatial classifier settings.
    pub zones: ZoneConfig,
    /// Multipliers applied inside active zones.
    pub bonuses: BonusConfig,
}

/// Raid-block window and the offset used to turn UTC into local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemporalConfig {
    /// Daily window during which raiding is blocked.
    pub window: TimeWindow,
    /// Hours added to UTC before comparing against the window.
    pub timezone_offset_hours: i32,
}

impl TemporalConfig {
    /// Local time of day for `now`.
    #[must_use]
    pub fn local_time(&self, now: Timestamp) -> NaiveTime {
        let offset = TimeDelta::hours(i64::from(self.timezone_offset_hours));
        now.checked_add_signed(offset).unwrap_or(now).time()
    }
}

/// Thresholds for the per-target raid-block exceptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionConfig {
    /// How long a newly placed target stays raidable.
    pub grace_period: Duration,
    /// How long after an authorised contact a target stays raidable.
    pub raid_cooldown: Duration,
    /// Hours without a decay tick before a decaying target loses protection.
    pub decay_bypass_hours: u32,
}

impl Default for ExceptionConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(30 * 60),
            raid_cooldown: Duration::from_secs(15 * 60),
            decay_bypass_hours: 6,
        }
    }
}

/// Settings for the biome, monument, and dynamic classifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneConfig {
    /// Minimum splat weight for a biome to count at a point.
    pub terrain_threshold: f32,
    /// Biome name to enabled flag. Unknown names are ignored.
    pub biomes: BTreeMap<String, bool>,
    /// Default radius around every monument.
    pub monument_radius: f32,
    /// Monument short name to enabled flag. Missing names are disabled.
    pub monuments: BTreeMap<String, bool>,
    /// Per-monument radius replacing [`monument_radius`](Self::monument_radius).
    pub monument_radius_overrides: BTreeMap<String, f32>,
    /// Radius of the zone around a hackable crate.
    pub hackable_crate_radius: f32,
    /// Radius of the zone around the cargo ship.
    pub cargo_ship_radius: f32,
    /// Radius of timed event zones.
    pub event_zone_radius: f32,
    /// Lifetime of timed event zones.
    pub event_zone_duration: Duration,
    /// Lifetime of tracked-entity zones (crates, vehicles) between refreshes.
    pub tracked_zone_lease: Duration,
}

impl ZoneConfig {
    /// Effective radius for a named monument.
    #[must_use]
    pub fn monument_radius_for(&self, name: &str) -> f32 {
        self.monument_radius_overrides
            .get(name)
            .copied()
            .unwrap_or(self.monument_radius)
    }

    /// Returns `true` when the named monument is enabled.
    #[must_use]
    pub fn monument_enabled(&self, name: &str) -> bool {
        self.monuments.get(name).copied().unwrap_or(false)
    }

    /// Returns `true` when at least one biome is enabled.
    #[must_use]
    pub fn any_biome_enabled(&self) -> bool {
        self.biomes.values().any(|enabled| *enabled)
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        let biomes = [
            ("grass", false),
            ("forest", false),
            ("rock", false),
            ("snow", true),
            ("sand", true),
            ("dirt", false),
        ]
        .into_iter()
        .map(|(name, enabled)| (name.to_owned(), enabled))
        .collect();

        Self {
            terrain_threshold: 0.2,
            biomes,
            monument_radius: 150.0,
            monuments: BTreeMap::new(),
            monument_radius_overrides: BTreeMap::new(),
            hackable_crate_radius: 100.0,
            cargo_ship_radius: 100.0,
            event_zone_radius: 60.0,
            event_zone_duration: Duration::from_secs(300),
            tracked_zone_lease: Duration::from_secs(120),
        }
    }
}

/// Multipliers granted inside active zones. `None` disables a bonus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusConfig {
    /// Crafting speed multiplier.
    pub crafting_speed: Option<f32>,
    /// Upkeep cost multiplier.
    pub upkeep: Option<f32>,
    /// Gather rate multiplier.
    pub gather_rate: Option<f32>,
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            crafting_speed: Some(2.0),
            upkeep: Some(0.75),
            gather_rate: Some(1.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn local_time_applies_offset() {
        let config = TemporalConfig {
            window: TimeWindow::default(),
            timezone_offset_hours: -5,
        };
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 3, 30, 0).unwrap();
        assert_eq!(config.local_time(now), NaiveTime::from_hms_opt(22, 30, 0).unwrap());
    }

    #[test]
    fn monument_radius_prefers_override() {
        let mut zones = ZoneConfig::default();
        zones.monument_radius_overrides.insert("Outpost".into(), 80.0);
        assert!((zones.monument_radius_for("Outpost") - 80.0).abs() < f32::EPSILON);
        assert!((zones.monument_radius_for("Airfield") - 150.0).abs() < f32::EPSILON);
        assert!(!zones.monument_enabled("Airfield"));
        assert!(zones.any_biome_enabled());
    }
}
