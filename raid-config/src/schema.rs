//! On-disk configuration schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The JSON configuration file. Missing fields take their defaults.
///
/// Numeric fields are signed so that negative values survive parsing and can be
/// reported before falling back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaidConfigFile {
    /// Start of the raid-block window, `HH:MM` or `HH:MM:SS`.
    pub no_raid_start: String,
    /// End of the raid-block window.
    pub no_raid_end: String,
    /// Hours added to UTC to obtain server-local time.
    pub timezone_offset_hours: i32,
    /// Grace period after placement, in minutes.
    pub grace_minutes: i64,
    /// Cooldown after an authorised hit, in minutes.
    pub raid_cooldown_minutes: i64,
    /// Hours without decay before a decaying target loses protection.
    pub decay_bypass_hours: i64,
    /// Splat weight a biome must exceed to count.
    pub terrain_threshold: f32,
    /// Default monument radius.
    pub monument_radius: f32,
    /// Radius around hackable crates.
    pub hackable_crate_radius: f32,
    /// Radius around the cargo ship.
    pub cargo_ship_radius: f32,
    /// Radius of timed event zones.
    pub event_zone_radius: f32,
    /// Lifetime of timed event zones, in seconds.
    pub event_zone_duration_secs: i64,
    /// Lifetime of tracked-entity zones between refreshes, in seconds.
    pub tracked_zone_lease_secs: i64,
    /// Biome name to PvP flag.
    pub biomes: BTreeMap<String, bool>,
    /// Monument short name to PvP flag.
    pub monuments: BTreeMap<String, bool>,
    /// Per-monument radius overrides.
    pub monument_radius_overrides: BTreeMap<String, f32>,
    /// Bonuses granted inside PvP zones.
    pub bonuses: BonusSection,
}

impl Default for RaidConfigFile {
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
            no_raid_start: "22:00".into(),
            no_raid_end: "08:00".into(),
            timezone_offset_hours: 0,
            grace_minutes: 30,
            raid_cooldown_minutes: 15,
            decay_bypass_hours: 6,
            terrain_threshold: 0.2,
            monument_radius: 150.0,
            hackable_crate_radius: 100.0,
            cargo_ship_radius: 100.0,
            event_zone_radius: 60.0,
            event_zone_duration_secs: 300,
            tracked_zone_lease_secs: 120,
            biomes,
            monuments: BTreeMap::new(),
            monument_radius_overrides: BTreeMap::new(),
            bonuses: BonusSection::default(),
        }
    }
}

/// Zone bonus toggles and multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct BonusSection {
    /// Enables the crafting speed bonus.
    pub enable_crafting_boost: bool,
    /// Crafting speed multiplier.
    pub crafting_speed_multiplier: f32,
    /// Enables the upkeep reduction.
    pub enable_upkeep_reduction: bool,
    /// Upkeep cost multiplier.
    pub upkeep_multiplier: f32,
    /// Enables the gather bonus.
    pub enable_gather_boost: bool,
    /// Gather rate multiplier.
    pub gather_rate_multiplier: f32,
}

impl Default for BonusSection {
    fn default() -> Self {
        Self {
            enable_crafting_boost: true,
            crafting_speed_multiplier: 2.0,
            enable_upkeep_reduction: true,
            upkeep_multiplier: 0.75,
            enable_gather_boost: true,
            gather_rate_multiplier: 1.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let file: RaidConfigFile =
            serde_json::from_str(r#"{ "no_raid_start": "21:30", "bonuses": { "enable_gather_boost": false } }"#)
                .unwrap();
        assert_eq!(file.no_raid_start, "21:30");
        assert_eq!(file.no_raid_end, "08:00");
        assert_eq!(file.biomes.get("snow"), Some(&true));
        assert!(!file.bonuses.enable_gather_boost);
        assert!((file.bonuses.upkeep_multiplier - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn defaults_serialize_round_trip() {
        let json = serde_json::to_string_pretty(&RaidConfigFile::default()).unwrap();
        let back: RaidConfigFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RaidConfigFile::default());
    }
}
