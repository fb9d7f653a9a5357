//! Temporary zones created by external triggers.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::TimeDelta;
use raid_primitives::{Position, Timestamp};
use serde::{Deserialize, Serialize};

use super::{ZoneKind, ZonePredicate};
use crate::config::ZoneConfig;

/// A circular zone that stops matching once `now > expiry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicZone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    position: Position,
    radius: f32,
    expiry: Timestamp,
}

impl DynamicZone {
    /// Creates an anonymous zone.
    #[must_use]
    pub fn new(position: Position, radius: f32, expiry: Timestamp) -> Self {
        Self {
            key: None,
            position,
            radius,
            expiry,
        }
    }

    /// Tags the zone with a key; upserting a zone with the same key replaces it.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Optional upsert key.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Centre of the zone.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Radius of the zone.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Last instant at which the zone still matches.
    #[must_use]
    pub const fn expiry(&self) -> Timestamp {
        self.expiry
    }

    /// Returns `true` until the expiry has passed.
    #[must_use]
    pub fn is_active(&self, now: Timestamp) -> bool {
        now <= self.expiry
    }

    /// Returns `true` when active and `position` is within the radius.
    #[must_use]
    pub fn contains(&self, position: Position, now: Timestamp) -> bool {
        self.is_active(now) && self.position.within(position, self.radius)
    }
}

/// External events that open a dynamic zone with configured dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneTrigger {
    /// A hackable crate was dropped.
    HackableCrate,
    /// The cargo ship spawned or moved.
    CargoShip,
    /// A timed event (e.g. a boss spawn) started.
    Event,
}

impl ZoneTrigger {
    /// Configured radius for this trigger.
    #[must_use]
    pub fn radius(self, rules: &ZoneConfig) -> f32 {
        match self {
            Self::HackableCrate => rules.hackable_crate_radius,
            Self::CargoShip => rules.cargo_ship_radius,
            Self::Event => rules.event_zone_radius,
        }
    }

    /// How long the zone lives. Tracked entities renew their lease on every update.
    #[must_use]
    pub fn lifetime(self, rules: &ZoneConfig) -> Duration {
        match self {
            Self::HackableCrate | Self::CargoShip => rules.tracked_zone_lease,
            Self::Event => rules.event_zone_duration,
        }
    }

    /// Builds the zone this trigger opens at `position`.
    #[must_use]
    pub fn zone(self, rules: &ZoneConfig, position: Position, now: Timestamp) -> DynamicZone {
        let lifetime = TimeDelta::from_std(self.lifetime(rules)).unwrap_or(TimeDelta::MAX);
        let expiry = now.checked_add_signed(lifetime).unwrap_or(now);
        DynamicZone::new(position, self.radius(rules), expiry)
    }
}

/// Dynamic zones behind a single mutex. Expired entries are ignored on read and
/// reclaimed by [`sweep`](Self::sweep).
#[derive(Debug, Default)]
pub struct DynamicZones {
    zones: Mutex<Vec<DynamicZone>>,
}

impl DynamicZones {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `zone`, replacing an existing zone with the same key. Returns `true`
    /// when a zone was replaced.
    pub fn upsert(&self, zone: DynamicZone) -> bool {
        let mut guard = self.zones.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(key) = zone.key() {
            if let Some(existing) = guard.iter_mut().find(|z| z.key() == Some(key)) {
                *existing = zone;
                return true;
            }
        }
        guard.push(zone);
        false
    }

    /// Removes the zone with `key`. Returns `true` when one was removed.
    pub fn remove(&self, key: &str) -> bool {
        let mut guard = self.zones.lock().unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|zone| zone.key() != Some(key));
        guard.len() != before
    }

    /// Drops expired zones and returns how many were removed.
    pub fn sweep(&self, now: Timestamp) -> usize {
        let mut guard = self.zones.lock().unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|zone| zone.is_active(now));
        before - guard.len()
    }

    /// Zones still active at `now`.
    #[must_use]
    pub fn active(&self, now: Timestamp) -> Vec<DynamicZone> {
        self.zones
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|zone| zone.is_active(now))
            .cloned()
            .collect()
    }

    /// Stored zones, including expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ZonePredicate for DynamicZones {
    fn kind(&self) -> ZoneKind {
        ZoneKind::Dynamic
    }

    fn contains(&self, _rules: &ZoneConfig, position: Position, now: Timestamp) -> bool {
        self.zones
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|zone| zone.contains(position, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 10, 31, 23, 0, 0).unwrap()
    }

    #[test]
    fn zone_expires_after_expiry_instant() {
        let centre = Position::new(100.0, 5.0, 100.0);
        let zones = DynamicZones::new();
        zones.upsert(DynamicZone::new(centre, 50.0, start() + TimeDelta::seconds(300)));

        let edge = centre.offset(40.0, 0.0, 0.0);
        let rules = ZoneConfig::default();
        assert!(zones.contains(&rules, edge, start() + TimeDelta::seconds(300)));
        assert!(!zones.contains(&rules, edge, start() + TimeDelta::seconds(301)));
        assert!(!zones.contains(&rules, centre.offset(51.0, 0.0, 0.0), start()));
    }

    #[test]
    fn keyed_upsert_moves_zone() {
        let zones = DynamicZones::new();
        let expiry = start() + TimeDelta::minutes(2);
        assert!(!zones.upsert(
            DynamicZone::new(Position::new(0.0, 0.0, 0.0), 100.0, expiry).with_key("cargo")
        ));
        assert!(zones.upsert(
            DynamicZone::new(Position::new(1000.0, 0.0, 0.0), 100.0, expiry).with_key("cargo")
        ));
        assert_eq!(zones.len(), 1);

        let rules = ZoneConfig::default();
        assert!(!zones.contains(&rules, Position::new(0.0, 0.0, 0.0), start()));
        assert!(zones.contains(&rules, Position::new(950.0, 0.0, 0.0), start()));

        assert!(zones.remove("cargo"));
        assert!(zones.is_empty());
    }

    #[test]
    fn sweep_reclaims_only_expired() {
        let zones = DynamicZones::new();
        zones.upsert(DynamicZone::new(Position::default(), 10.0, start()));
        zones.upsert(DynamicZone::new(Position::default(), 10.0, start() + TimeDelta::hours(1)));

        assert_eq!(zones.sweep(start() + TimeDelta::seconds(1)), 1);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones.active(start()).len(), 1);
    }

    #[test]
    fn triggers_use_configured_dimensions() {
        let rules = ZoneConfig::default();
        let event = ZoneTrigger::Event.zone(&rules, Position::default(), start());
        assert!((event.radius() - 60.0).abs() < f32::EPSILON);
        assert_eq!(event.expiry(), start() + TimeDelta::seconds(300));

        let crate_zone = ZoneTrigger::HackableCrate.zone(&rules, Position::default(), start());
        assert!((crate_zone.radius() - 100.0).abs() < f32::EPSILON);
        assert_eq!(crate_zone.expiry(), start() + TimeDelta::seconds(120));
    }
}
