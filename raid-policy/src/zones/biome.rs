//! Biome classification from terrain splat weights.

use std::sync::Arc;

use raid_primitives::{NormalizedPoint, Position, Timestamp, WorldBounds};
use serde::{Deserialize, Serialize};

use super::{ZoneKind, ZonePredicate};
use crate::config::ZoneConfig;

/// Terrain splat layers, in splat-map channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    /// Channel 0.
    Gravel,
    /// Channel 1.
    Dirt,
    /// Channel 2.
    Sand,
    /// Channel 3.
    Rock,
    /// Channel 4.
    Forest,
    /// Channel 5.
    Grass,
    /// Channel 6.
    Snow,
}

impl Biome {
    /// Every biome in channel order.
    pub const ALL: [Self; 7] = [
        Self::Gravel,
        Self::Dirt,
        Self::Sand,
        Self::Rock,
        Self::Forest,
        Self::Grass,
        Self::Snow,
    ];

    /// Splat-map channel index.
    #[must_use]
    pub const fn splat_index(self) -> usize {
        self as usize
    }

    /// Lower-case configuration name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gravel => "gravel",
            Self::Dirt => "dirt",
            Self::Sand => "sand",
            Self::Rock => "rock",
            Self::Forest => "forest",
            Self::Grass => "grass",
            Self::Snow => "snow",
        }
    }

    /// Looks a biome up by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|biome| biome.name().eq_ignore_ascii_case(name))
    }
}

/// Terrain collaborator exposing per-biome weights.
pub trait SplatSampler: Send + Sync {
    /// Horizontal extent used to normalise world positions.
    fn bounds(&self) -> WorldBounds;

    /// Weight in `[0, 1]` of channel `splat_index` at `point`.
    fn weight(&self, point: NormalizedPoint, splat_index: usize) -> f32;
}

/// Sampler returning the same weights everywhere. Handy for tests and tools that
/// have no terrain loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformSplatMap {
    bounds: WorldBounds,
    weights: [f32; 7],
}

impl UniformSplatMap {
    /// All-zero weights over `bounds`.
    #[must_use]
    pub const fn new(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            weights: [0.0; 7],
        }
    }

    /// Sets the weight of one biome.
    #[must_use]
    pub fn with_weight(mut self, biome: Biome, weight: f32) -> Self {
        self.weights[biome.splat_index()] = weight;
        self
    }
}

impl SplatSampler for UniformSplatMap {
    fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    fn weight(&self, _point: NormalizedPoint, splat_index: usize) -> f32 {
        self.weights.get(splat_index).copied().unwrap_or(0.0)
    }
}

/// Matches points where an enabled biome's weight exceeds the threshold.
#[derive(Clone)]
pub struct BiomeZones {
    sampler: Arc<dyn SplatSampler>,
}

impl std::fmt::Debug for BiomeZones {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiomeZones")
            .field("bounds", &self.sampler.bounds())
            .finish()
    }
}

impl BiomeZones {
    /// Wraps the terrain sampler.
    #[must_use]
    pub fn new(sampler: Arc<dyn SplatSampler>) -> Self {
        Self { sampler }
    }
}

impl ZonePredicate for BiomeZones {
    fn kind(&self) -> ZoneKind {
        ZoneKind::Biome
    }

    fn contains(&self, rules: &ZoneConfig, position: Position, _now: Timestamp) -> bool {
        let point = self.sampler.bounds().normalize(position);
        rules
            .biomes
            .iter()
            .filter(|(_, enabled)| **enabled)
            .filter_map(|(name, _)| Biome::from_name(name))
            .any(|biome| self.sampler.weight(point, biome.splat_index()) > rules.terrain_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn zones(map: UniformSplatMap) -> BiomeZones {
        BiomeZones::new(Arc::new(map))
    }

    fn map() -> UniformSplatMap {
        UniformSplatMap::new(WorldBounds::centered(3000.0).unwrap())
    }

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn enabled_biome_above_threshold_matches() {
        let rules = ZoneConfig::default();
        let snowy = zones(map().with_weight(Biome::Snow, 0.6));
        assert!(snowy.contains(&rules, Position::default(), now()));
    }

    #[test]
    fn threshold_is_strict() {
        let rules = ZoneConfig::default();
        let edge = zones(map().with_weight(Biome::Sand, 0.2));
        assert!(!edge.contains(&rules, Position::default(), now()));
    }

    #[test]
    fn disabled_biome_never_matches() {
        let rules = ZoneConfig::default();
        let grassy = zones(map().with_weight(Biome::Grass, 1.0));
        assert!(!grassy.contains(&rules, Position::default(), now()));
    }

    #[test]
    fn unknown_biome_names_are_skipped() {
        let mut rules = ZoneConfig::default();
        rules.biomes.clear();
        rules.biomes.insert("lava".into(), true);
        rules.biomes.insert("FOREST".into(), true);
        let forest = zones(map().with_weight(Biome::Forest, 0.9));
        assert!(forest.contains(&rules, Position::default(), now()));

        rules.biomes.remove("FOREST");
        assert!(!forest.contains(&rules, Position::default(), now()));
    }

    #[test]
    fn biome_names_round_trip() {
        for biome in Biome::ALL {
            assert_eq!(Biome::from_name(biome.name()), Some(biome));
        }
        assert_eq!(Biome::Snow.splat_index(), 6);
    }
}
