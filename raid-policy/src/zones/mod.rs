//! Spatial classification of positions into active zones.
//!
//! Each zone kind is a [`ZonePredicate`]; [`SpatialZoneEvaluator`] ORs them in
//! registration order. A position is zone-active when any predicate matches.

mod biome;
mod dynamic;
mod monument;

use std::fmt;
use std::sync::Arc;

use raid_primitives::{Position, Timestamp};
use serde::{Deserialize, Serialize};

use crate::config::{BonusConfig, ZoneConfig};
use crate::decision::DecisionReason;

pub use biome::{Biome, BiomeZones, SplatSampler, UniformSplatMap};
pub use dynamic::{DynamicZone, DynamicZones, ZoneTrigger};
pub use monument::{Landmark, MonumentZones, NamedZone, monument_short_name};

/// The closed set of zone kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// Terrain biome weight above threshold.
    Biome,
    /// Within the radius of an enabled named monument.
    Monument,
    /// Within a non-expired dynamic zone.
    Dynamic,
}

impl ZoneKind {
    /// Decision reason reported when this kind triggers.
    #[must_use]
    pub const fn reason(self) -> DecisionReason {
        match self {
            Self::Biome => DecisionReason::ZoneBiome,
            Self::Monument => DecisionReason::ZoneMonument,
            Self::Dynamic => DecisionReason::ZoneDynamic,
        }
    }
}

/// A single spatial classifier.
pub trait ZonePredicate: Send + Sync {
    /// Kind reported when the predicate matches.
    fn kind(&self) -> ZoneKind;

    /// Returns `true` when `position` is inside one of this predicate's zones at `now`.
    fn contains(&self, rules: &ZoneConfig, position: Position, now: Timestamp) -> bool;
}

/// ORs a list of zone predicates.
#[derive(Clone, Default)]
pub struct SpatialZoneEvaluator {
    predicates: Vec<Arc<dyn ZonePredicate>>,
}

impl fmt::Debug for SpatialZoneEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialZoneEvaluator")
            .field(
                "predicates",
                &self.predicates.iter().map(|p| p.kind()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SpatialZoneEvaluator {
    /// Creates an evaluator with no predicates; nothing is zone-active.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a predicate. Evaluation order follows registration order.
    #[must_use]
    pub fn with_predicate(mut self, predicate: Arc<dyn ZonePredicate>) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Returns `true` when any predicate matches.
    #[must_use]
    pub fn is_zone_active(&self, rules: &ZoneConfig, position: Position, now: Timestamp) -> bool {
        self.first_match(rules, position, now).is_some()
    }

    /// Kind of the first matching predicate.
    #[must_use]
    pub fn first_match(
        &self,
        rules: &ZoneConfig,
        position: Position,
        now: Timestamp,
    ) -> Option<ZoneKind> {
        self.predicates
            .iter()
            .find(|predicate| predicate.contains(rules, position, now))
            .map(|predicate| predicate.kind())
    }

    /// Every matching kind, in registration order without duplicates.
    #[must_use]
    pub fn diagnose(&self, rules: &ZoneConfig, position: Position, now: Timestamp) -> Vec<ZoneKind> {
        let mut triggered = Vec::new();
        for predicate in &self.predicates {
            let kind = predicate.kind();
            if !triggered.contains(&kind) && predicate.contains(rules, position, now) {
                triggered.push(kind);
            }
        }
        triggered
    }
}

/// Multipliers for gather, crafting, and upkeep at a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneModifiers {
    /// Gather rate multiplier.
    pub gather_rate: f32,
    /// Crafting speed multiplier; crafting time is divided by it.
    pub crafting_speed: f32,
    /// Upkeep cost multiplier.
    pub upkeep: f32,
}

impl ZoneModifiers {
    /// No change.
    pub const NEUTRAL: Self = Self {
        gather_rate: 1.0,
        crafting_speed: 1.0,
        upkeep: 1.0,
    };

    /// Modifiers for an active zone under `bonuses`.
    #[must_use]
    pub fn active(bonuses: &BonusConfig) -> Self {
        Self {
            gather_rate: bonuses.gather_rate.unwrap_or(1.0),
            crafting_speed: bonuses.crafting_speed.unwrap_or(1.0),
            upkeep: bonuses.upkeep.unwrap_or(1.0),
        }
    }
}

impl Default for ZoneModifiers {
    fn default() -> Self {
        Self::NEUTRAL
    }
}
