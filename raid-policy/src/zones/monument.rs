//! Fixed-radius zones around named landmarks.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use raid_primitives::{Position, Timestamp};
use serde::{Deserialize, Serialize};

use super::{ZoneKind, ZonePredicate};
use crate::config::ZoneConfig;

/// Prefab path fragments mapped to monument short names. Order matters: more
/// specific fragments come first.
const SHORT_NAMES: &[(&str, &str)] = &[
    ("oilrig2", "Large Oilrig"),
    ("oilrig", "Small Oilrig"),
    ("underwater_lab", "Underwater Lab"),
    ("airfield", "Airfield"),
    ("harbor_1", "Harbor 1"),
    ("harbor_2", "Harbor 2"),
    ("harbor", "Harbor"),
    ("launchsite", "Launch Site"),
    ("military_tunnel", "Military Tunnel"),
    ("trainyard", "Train Yard"),
    ("oxum", "Oxum's Gas Station"),
    ("satellite", "Satellite Dish"),
    ("junkyard", "Junkyard"),
    ("bandit", "Bandit Camp"),
    ("outpost", "Outpost"),
    ("supermarket", "Supermarket"),
    ("warehouse", "Warehouse"),
    ("powerplant", "Power Plant"),
    ("water_treatment", "Water Treatment Plant"),
];

/// Canonical short name for a landmark prefab path.
#[must_use]
pub fn monument_short_name(prefab_path: &str) -> String {
    if prefab_path.trim().is_empty() {
        return "Unknown".to_owned();
    }

    let lower = prefab_path.to_ascii_lowercase();
    if let Some((_, name)) = SHORT_NAMES.iter().find(|(needle, _)| lower.contains(needle)) {
        return (*name).to_owned();
    }

    let file = prefab_path.rsplit('/').next().unwrap_or(prefab_path);
    file.replace(".prefab", "").replace('_', " ").trim().to_owned()
}

/// A named anchor reported by the map collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Canonical short name.
    pub name: String,
    /// World position of the anchor.
    pub position: Position,
}

impl Landmark {
    /// Creates a landmark with an already canonical name.
    #[must_use]
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    /// Creates a landmark from a raw prefab path.
    #[must_use]
    pub fn from_prefab(prefab_path: &str, position: Position) -> Self {
        Self::new(monument_short_name(prefab_path), position)
    }
}

/// A landmark resolved against one configuration generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedZone {
    /// Monument short name.
    pub name: String,
    /// Centre of the zone.
    pub anchor: Position,
    /// Effective radius after overrides.
    pub radius: f32,
    /// Disabled zones never match, whatever their radius.
    pub enabled: bool,
}

impl NamedZone {
    /// Returns `true` when enabled and `position` is within the radius.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.enabled && self.anchor.within(position, self.radius)
    }
}

/// Known landmarks. The set is replaced wholesale when landmarks are rediscovered.
#[derive(Debug, Default)]
pub struct MonumentZones {
    landmarks: RwLock<Arc<Vec<Landmark>>>,
}

impl MonumentZones {
    /// Creates the index from an initial landmark list.
    #[must_use]
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks: RwLock::new(Arc::new(landmarks)),
        }
    }

    /// Replaces the landmark set.
    pub fn replace(&self, landmarks: Vec<Landmark>) {
        *self.landmarks.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(landmarks);
    }

    /// Snapshot of the current landmarks.
    #[must_use]
    pub fn landmarks(&self) -> Arc<Vec<Landmark>> {
        Arc::clone(&self.landmarks.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Landmarks resolved against `rules`.
    #[must_use]
    pub fn named_zones(&self, rules: &ZoneConfig) -> Vec<NamedZone> {
        self.landmarks()
            .iter()
            .map(|landmark| NamedZone {
                name: landmark.name.clone(),
                anchor: landmark.position,
                radius: rules.monument_radius_for(&landmark.name),
                enabled: rules.monument_enabled(&landmark.name),
            })
            .collect()
    }

    /// Table entries for landmarks the configuration does not mention yet.
    ///
    /// New monuments are enabled exactly when any biome is enabled.
    #[must_use]
    pub fn undiscovered_defaults(&self, rules: &ZoneConfig) -> BTreeMap<String, bool> {
        let enable = rules.any_biome_enabled();
        self.landmarks()
            .iter()
            .filter(|landmark| !landmark.name.is_empty())
            .filter(|landmark| !rules.monuments.contains_key(&landmark.name))
            .map(|landmark| (landmark.name.clone(), enable))
            .collect()
    }
}

impl ZonePredicate for MonumentZones {
    fn kind(&self) -> ZoneKind {
        ZoneKind::Monument
    }

    fn contains(&self, rules: &ZoneConfig, position: Position, _now: Timestamp) -> bool {
        self.landmarks().iter().any(|landmark| {
            rules.monument_enabled(&landmark.name)
                && landmark
                    .position
                    .within(position, rules.monument_radius_for(&landmark.name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn rules() -> ZoneConfig {
        let mut rules = ZoneConfig::default();
        rules.monuments.insert("Outpost".into(), true);
        rules.monuments.insert("Airfield".into(), true);
        rules.monuments.insert("Junkyard".into(), false);
        rules.monument_radius_overrides.insert("Outpost".into(), 80.0);
        rules
    }

    #[test]
    fn short_names_are_canonical() {
        assert_eq!(
            monument_short_name("assets/bundled/prefabs/autospawn/monument/offshore/oilrig_2.prefab"),
            "Small Oilrig"
        );
        assert_eq!(
            monument_short_name("assets/bundled/prefabs/autospawn/monument/large/oilrig2.prefab"),
            "Large Oilrig"
        );
        assert_eq!(
            monument_short_name("assets/bundled/prefabs/autospawn/monument/medium/bandit_town.prefab"),
            "Bandit Camp"
        );
        assert_eq!(
            monument_short_name("assets/bundled/prefabs/autospawn/monument/small/sphere_tank.prefab"),
            "sphere tank"
        );
        assert_eq!(monument_short_name(""), "Unknown");
    }

    #[test]
    fn radius_override_shrinks_zone() {
        let anchor = Position::new(500.0, 0.0, 500.0);
        let zones = MonumentZones::new(vec![
            Landmark::new("Outpost", anchor),
            Landmark::new("Airfield", Position::new(-500.0, 0.0, -500.0)),
        ]);
        let edge = anchor.offset(100.0, 0.0, 0.0);
        assert!(!zones.contains(&rules(), edge, now()));

        let airfield_edge = Position::new(-500.0, 0.0, -400.0);
        assert!(zones.contains(&rules(), airfield_edge, now()));
    }

    #[test]
    fn disabled_zone_is_skipped_entirely() {
        let anchor = Position::new(0.0, 0.0, 0.0);
        let zones = MonumentZones::new(vec![Landmark::new("Junkyard", anchor)]);
        assert!(!zones.contains(&rules(), anchor, now()));

        let resolved = zones.named_zones(&rules());
        assert_eq!(resolved.len(), 1);
        assert!(!resolved[0].enabled);
        assert!(!resolved[0].contains(anchor));
    }

    #[test]
    fn discovery_defaults_follow_biome_switches() {
        let zones = MonumentZones::new(vec![
            Landmark::new("Outpost", Position::default()),
            Landmark::new("Bandit Camp", Position::default()),
            Landmark::new("Launch Site", Position::default()),
        ]);
        let defaults = zones.undiscovered_defaults(&rules());
        assert_eq!(defaults.len(), 3);
        assert_eq!(defaults.get("Launch Site"), Some(&true));
        assert_eq!(defaults.get("Bandit Camp"), Some(&true));

        let mut no_biomes = rules();
        no_biomes.biomes.values_mut().for_each(|enabled| *enabled = false);
        assert_eq!(
            zones.undiscovered_defaults(&no_biomes).get("Launch Site"),
            Some(&false)
        );
    }
}
