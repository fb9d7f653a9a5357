//! Parsing and load-time validation.
//!
//! Invalid values never reach the engine: each one is replaced by its default and
//! reported once as a [`LoadWarning`] (and a `warn!` event).

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveTime;
use raid_policy::zones::Biome;
use raid_policy::{
    BonusConfig, EngineConfig, ExceptionConfig, TemporalConfig, TimeWindow, ZoneConfig,
};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{BonusSection, RaidConfigFile};

/// A value replaced by its default during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Offending field.
    pub field: String,
    /// What was wrong and what was used instead.
    pub message: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validated configuration plus the fallbacks applied to reach it.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// Configuration generation ready for the engine.
    pub config: EngineConfig,
    /// Fallbacks applied during validation.
    pub warnings: Vec<LoadWarning>,
}

/// Reads and validates [`RaidConfigFile`] documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Creates a loader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not valid JSON for the schema.
    pub async fn load_path(&self, path: impl AsRef<Path>) -> ConfigResult<LoadResult> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), bytes = text.len(), "configuration file read");
        self.parse(&text, &path.display().to_string())
    }

    /// Loads configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid JSON for the schema.
    pub fn load_str(&self, text: &str) -> ConfigResult<LoadResult> {
        self.parse(text, "<inline>")
    }

    /// Validates an already parsed file.
    #[must_use]
    pub fn validate(&self, file: &RaidConfigFile) -> LoadResult {
        let mut check = Validation::default();
        let defaults = RaidConfigFile::default();

        let temporal = TemporalConfig {
            window: check.window(&file.no_raid_start, &file.no_raid_end),
            timezone_offset_hours: check.offset(file.timezone_offset_hours),
        };

        let exceptions = ExceptionConfig {
            grace_period: check.minutes("grace_minutes", file.grace_minutes, defaults.grace_minutes),
            raid_cooldown: check.minutes(
                "raid_cooldown_minutes",
                file.raid_cooldown_minutes,
                defaults.raid_cooldown_minutes,
            ),
            decay_bypass_hours: check.hours(
                "decay_bypass_hours",
                file.decay_bypass_hours,
                defaults.decay_bypass_hours,
            ),
        };

        let zones = ZoneConfig {
            terrain_threshold: check.positive(
                "terrain_threshold",
                file.terrain_threshold,
                defaults.terrain_threshold,
            ),
            biomes: check.biomes(&file.biomes),
            monument_radius: check.positive(
                "monument_radius",
                file.monument_radius,
                defaults.monument_radius,
            ),
            monuments: file.monuments.clone(),
            monument_radius_overrides: check.radius_overrides(&file.monument_radius_overrides),
            hackable_crate_radius: check.positive(
                "hackable_crate_radius",
                file.hackable_crate_radius,
                defaults.hackable_crate_radius,
            ),
            cargo_ship_radius: check.positive(
                "cargo_ship_radius",
                file.cargo_ship_radius,
                defaults.cargo_ship_radius,
            ),
            event_zone_radius: check.positive(
                "event_zone_radius",
                file.event_zone_radius,
                defaults.event_zone_radius,
            ),
            event_zone_duration: check.seconds(
                "event_zone_duration_secs",
                file.event_zone_duration_secs,
                defaults.event_zone_duration_secs,
            ),
            tracked_zone_lease: check.seconds(
                "tracked_zone_lease_secs",
                file.tracked_zone_lease_secs,
                defaults.tracked_zone_lease_secs,
            ),
        };

        let bonuses = check.bonuses(&file.bonuses);

        LoadResult {
            config: EngineConfig {
                temporal,
                exceptions,
                zones,
                bonuses,
            },
            warnings: check.warnings,
        }
    }

    fn parse(&self, text: &str, origin: &str) -> ConfigResult<LoadResult> {
        let file: RaidConfigFile =
            serde_json::from_str(text).map_err(|source| ConfigError::Parse {
                origin: origin.to_owned(),
                source,
            })?;
        Ok(self.validate(&file))
    }
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

#[derive(Default)]
struct Validation {
    warnings: Vec<LoadWarning>,
}

impl Validation {
    fn fallback(&mut self, field: &str, message: String) {
        warn!(field, %message, "configuration value replaced by default");
        self.warnings.push(LoadWarning {
            field: field.to_owned(),
            message,
        });
    }

    fn window(&mut self, start: &str, end: &str) -> TimeWindow {
        match (parse_time(start), parse_time(end)) {
            (Some(start), Some(end)) => TimeWindow::new(start, end),
            (parsed_start, _) => {
                let field = if parsed_start.is_none() {
                    "no_raid_start"
                } else {
                    "no_raid_end"
                };
                let window = TimeWindow::default();
                self.fallback(
                    field,
                    format!("cannot parse `{start}` - `{end}` as HH:MM, using {window}"),
                );
                window
            }
        }
    }

    fn offset(&mut self, hours: i32) -> i32 {
        if (-12..=14).contains(&hours) {
            hours
        } else {
            self.fallback(
                "timezone_offset_hours",
                format!("{hours} is outside -12..=14, using 0"),
            );
            0
        }
    }

    fn non_negative(&mut self, field: &str, value: i64, default: i64) -> u64 {
        u64::try_from(value).unwrap_or_else(|_| {
            self.fallback(field, format!("{value} is negative, using {default}"));
            u64::try_from(default).unwrap_or_default()
        })
    }

    fn minutes(&mut self, field: &str, value: i64, default: i64) -> Duration {
        Duration::from_secs(self.non_negative(field, value, default).saturating_mul(60))
    }

    fn hours(&mut self, field: &str, value: i64, default: i64) -> u32 {
        let hours = self.non_negative(field, value, default);
        u32::try_from(hours).unwrap_or(u32::MAX)
    }

    fn seconds(&mut self, field: &str, value: i64, default: i64) -> Duration {
        if value <= 0 {
            self.fallback(field, format!("{value} is not positive, using {default}"));
            return Duration::from_secs(u64::try_from(default).unwrap_or_default());
        }
        Duration::from_secs(value.unsigned_abs())
    }

    fn positive(&mut self, field: &str, value: f32, default: f32) -> f32 {
        if value.is_finite() && value > 0.0 {
            value
        } else {
            self.fallback(field, format!("{value} is not positive, using {default}"));
            default
        }
    }

    fn biomes(&mut self, biomes: &BTreeMap<String, bool>) -> BTreeMap<String, bool> {
        let (known, unknown): (Vec<_>, Vec<_>) = biomes
            .iter()
            .partition(|(name, _)| Biome::from_name(name).is_some());
        if !unknown.is_empty() {
            let names: Vec<&str> = unknown.iter().map(|(name, _)| name.as_str()).collect();
            self.fallback("biomes", format!("unknown biomes ignored: {}", names.join(", ")));
        }
        known
            .into_iter()
            .map(|(name, enabled)| (name.to_ascii_lowercase(), *enabled))
            .collect()
    }

    fn radius_overrides(&mut self, overrides: &BTreeMap<String, f32>) -> BTreeMap<String, f32> {
        let mut kept = BTreeMap::new();
        for (name, radius) in overrides {
            if radius.is_finite() && *radius > 0.0 {
                kept.insert(name.clone(), *radius);
            } else {
                self.fallback(
                    "monument_radius_overrides",
                    format!("{name}: {radius} is not positive, using the default radius"),
                );
            }
        }
        kept
    }

    fn bonuses(&mut self, section: &BonusSection) -> BonusConfig {
        let defaults = BonusSection::default();
        BonusConfig {
            crafting_speed: section.enable_crafting_boost.then(|| {
                self.positive(
                    "bonuses.crafting_speed_multiplier",
                    section.crafting_speed_multiplier,
                    defaults.crafting_speed_multiplier,
                )
            }),
            upkeep: section.enable_upkeep_reduction.then(|| {
                self.positive(
                    "bonuses.upkeep_multiplier",
                    section.upkeep_multiplier,
                    defaults.upkeep_multiplier,
                )
            }),
            gather_rate: section.enable_gather_boost.then(|| {
                self.positive(
                    "bonuses.gather_rate_multiplier",
                    section.gather_rate_multiplier,
                    defaults.gather_rate_multiplier,
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> LoadResult {
        ConfigLoader::new().load_str(text).unwrap()
    }

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn empty_document_yields_engine_defaults() {
        let result = load("{}");
        assert!(result.warnings.is_empty());
        assert_eq!(result.config, EngineConfig::default());
    }

    #[test]
    fn custom_window_and_offset_are_kept() {
        let result = load(r#"{ "no_raid_start": "23:15", "no_raid_end": "06:00:30", "timezone_offset_hours": -5 }"#);
        assert!(result.warnings.is_empty());
        let temporal = result.config.temporal;
        assert_eq!(temporal.window.start(), hm(23, 15));
        assert_eq!(
            temporal.window.end(),
            NaiveTime::from_hms_opt(6, 0, 30).unwrap()
        );
        assert_eq!(temporal.timezone_offset_hours, -5);
    }

    #[test]
    fn malformed_window_falls_back_to_default() {
        let result = load(r#"{ "no_raid_start": "24:00", "no_raid_end": "07:00" }"#);
        assert_eq!(result.config.temporal.window, TimeWindow::default());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].field, "no_raid_start");

        let result = load(r#"{ "no_raid_end": "soon" }"#);
        assert_eq!(result.warnings[0].field, "no_raid_end");
    }

    #[test]
    fn non_positive_values_fall_back() {
        let result = load(
            r#"{
                "monument_radius": 0,
                "terrain_threshold": -0.5,
                "grace_minutes": -1,
                "event_zone_duration_secs": 0,
                "monument_radius_overrides": { "Outpost": 80, "Airfield": -3 }
            }"#,
        );
        let zones = &result.config.zones;
        assert!((zones.monument_radius - 150.0).abs() < f32::EPSILON);
        assert!((zones.terrain_threshold - 0.2).abs() < f32::EPSILON);
        assert_eq!(zones.event_zone_duration, Duration::from_secs(300));
        assert_eq!(result.config.exceptions.grace_period, Duration::from_secs(1800));
        assert_eq!(zones.monument_radius_overrides.len(), 1);
        assert_eq!(result.warnings.len(), 5);
    }

    #[test]
    fn unknown_biomes_warn_once() {
        let result = load(r#"{ "biomes": { "lava": true, "mud": true, "Snow": true } }"#);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("lava, mud"));
        assert_eq!(result.config.zones.biomes.len(), 1);
        assert_eq!(result.config.zones.biomes.get("snow"), Some(&true));
    }

    #[test]
    fn disabled_bonuses_become_none() {
        let result = load(r#"{ "bonuses": { "enable_upkeep_reduction": false, "gather_rate_multiplier": 3.0 } }"#);
        let bonuses = result.config.bonuses;
        assert_eq!(bonuses.upkeep, None);
        assert_eq!(bonuses.gather_rate, Some(3.0));
        assert_eq!(bonuses.crafting_speed, Some(2.0));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = ConfigLoader::new().load_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref origin, .. } if origin == "<inline>"));
    }

    #[tokio::test]
    async fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raidguard.json");
        tokio::fs::write(&path, r#"{ "grace_minutes": 45 }"#).await.unwrap();

        let result = ConfigLoader::new().load_path(&path).await.unwrap();
        assert_eq!(result.config.exceptions.grace_period, Duration::from_secs(45 * 60));

        let missing = ConfigLoader::new()
            .load_path(dir.path().join("missing.json"))
            .await
            .unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
