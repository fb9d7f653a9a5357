//! Policy engine trait and the raid/zone decision engine.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use raid_primitives::{Position, TargetId, Timestamp};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::contracts::{PolicyAction, PolicyContext, PolicyRequest, Victim};
use crate::decay::{DecayLookup, DecayStatusOracle};
use crate::decision::{DecisionReason, PolicyDecision};
use crate::exceptions::{GraceCooldownTracker, TrackedTarget};
use crate::override_control::{Override, OverrideCommand, OverrideController};
use crate::status::{EngineStatus, MonumentStatus, RaidStatus};
use crate::zones::{
    BiomeZones, DynamicZone, DynamicZones, Landmark, MonumentZones, SpatialZoneEvaluator,
    SplatSampler, ZoneModifiers, ZonePredicate, ZoneTrigger,
};

const RAID_BLOCKED_MESSAGE: &str =
    "Raiding is currently blocked! You don't have building privilege here.";
const AREA_MESSAGE: &str = "PvP is disabled in this area!";
const ZONE_MESSAGE: &str = "PvP is disabled in this zone!";

/// Errors surfaced by the policy layer. Decisions themselves never fail.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The engine builder lacks a required collaborator.
    #[error("policy engine is missing its {0}")]
    MissingCollaborator(&'static str),
    /// An administrative override verb was not recognised.
    #[error("unknown override command `{0}` (expected on, off or reset)")]
    UnknownOverrideCommand(String),
}

/// Result alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Trait implemented by policy engines.
///
/// Evaluation is synchronous and total: it runs on the damage path and never
/// touches I/O.
pub trait PolicyEngine: Send + Sync {
    /// Evaluates the supplied request.
    fn evaluate(&self, request: &PolicyRequest) -> PolicyDecision;
}

/// Builder wiring the engine's collaborators.
#[derive(Default)]
pub struct PolicyEngineBuilder {
    config: EngineConfig,
    splat: Option<Arc<dyn SplatSampler>>,
    decay: Option<Arc<dyn DecayLookup>>,
    landmarks: Vec<Landmark>,
    extra_predicates: Vec<Arc<dyn ZonePredicate>>,
}

impl PolicyEngineBuilder {
    /// Creates a builder using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial configuration generation.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the terrain sampler used by the biome classifier.
    #[must_use]
    pub fn with_splat_sampler(mut self, sampler: Arc<dyn SplatSampler>) -> Self {
        self.splat = Some(sampler);
        self
    }

    /// Sets the decay subsystem lookup.
    #[must_use]
    pub fn with_decay_lookup(mut self, lookup: Arc<dyn DecayLookup>) -> Self {
        self.decay = Some(lookup);
        self
    }

    /// Seeds the landmark list.
    #[must_use]
    pub fn with_landmarks(mut self, landmarks: Vec<Landmark>) -> Self {
        self.landmarks = landmarks;
        self
    }

    /// Registers an additional zone kind, evaluated after the built-in ones.
    #[must_use]
    pub fn with_zone_predicate(mut self, predicate: Arc<dyn ZonePredicate>) -> Self {
        self.extra_predicates.push(predicate);
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::MissingCollaborator`] when the terrain sampler or the
    /// decay lookup was not supplied.
    pub fn build(self) -> PolicyResult<PolicyDecisionEngine> {
        let splat = self
            .splat
            .ok_or(PolicyError::MissingCollaborator("terrain sampler"))?;
        let decay = self
            .decay
            .ok_or(PolicyError::MissingCollaborator("decay lookup"))?;

        let monuments = Arc::new(MonumentZones::new(self.landmarks));
        let dynamic = Arc::new(DynamicZones::new());

        let mut zones = SpatialZoneEvaluator::new()
            .with_predicate(Arc::new(BiomeZones::new(splat)))
            .with_predicate(Arc::clone(&monuments) as Arc<dyn ZonePredicate>)
            .with_predicate(Arc::clone(&dynamic) as Arc<dyn ZonePredicate>);
        for predicate in self.extra_predicates {
            zones = zones.with_predicate(predicate);
        }

        let mut config = self.config;
        config
            .zones
            .monuments
            .extend(monuments.undiscovered_defaults(&config.zones));

        Ok(PolicyDecisionEngine {
            config: RwLock::new(Arc::new(config)),
            overrides: OverrideController::new(),
            targets: GraceCooldownTracker::new(),
            decay: DecayStatusOracle::new(decay),
            monuments,
            dynamic,
            zones,
        })
    }
}

/// Owns every piece of mutable policy state and answers both decision axes.
///
/// The configuration is held as a whole generation behind one lock, so readers see
/// either the old or the new value. Override state is kept apart and survives
/// [`reload`](Self::reload).
#[derive(Debug)]
pub struct PolicyDecisionEngine {
    config: RwLock<Arc<EngineConfig>>,
    overrides: OverrideController,
    targets: GraceCooldownTracker,
    decay: DecayStatusOracle,
    monuments: Arc<MonumentZones>,
    dynamic: Arc<DynamicZones>,
    zones: SpatialZoneEvaluator,
}

impl PolicyDecisionEngine {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> PolicyEngineBuilder {
        PolicyEngineBuilder::new()
    }

    /// Current configuration generation.
    #[must_use]
    pub fn config(&self) -> Arc<EngineConfig> {
        Arc::clone(&self.config.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Atomically replaces the configuration. Override state is untouched.
    ///
    /// Known landmarks missing from the new monument table are re-added with
    /// discovery defaults.
    pub fn reload(&self, mut next: EngineConfig) {
        // Landmarks are read under the write lock; see `discover_landmarks`.
        let mut guard = self.config.write().unwrap_or_else(PoisonError::into_inner);
        next.zones
            .monuments
            .extend(self.monuments.undiscovered_defaults(&next.zones));
        *guard = Arc::new(next);
        drop(guard);

        let override_state = self.overrides.current();
        info!(
            override_state = override_state.label(),
            "policy configuration reloaded"
        );
    }

    /// Forces the raid-block outcome.
    pub fn set_override(&self, forced_blocked: bool) {
        self.overrides.set(forced_blocked);
    }

    /// Returns to time-based blocking.
    pub fn clear_override(&self) {
        self.overrides.clear();
    }

    /// Applies an administrative override command.
    pub fn apply_override(&self, command: OverrideCommand) -> Override {
        self.overrides.apply(command)
    }

    /// Current override.
    #[must_use]
    pub fn override_state(&self) -> Override {
        self.overrides.current()
    }

    /// Records a structure placement, restarting its grace period.
    pub fn record_placement(&self, target: TargetId, now: Timestamp) {
        self.targets.record_placement(target, now);
    }

    /// Records an authorised hostile contact, starting the cooldown.
    pub fn record_hostile_contact(&self, target: TargetId, now: Timestamp) {
        self.targets.record_hostile_contact(target, now);
    }

    /// Drops bookkeeping for a destroyed structure.
    pub fn forget_target(&self, target: TargetId) -> Option<TrackedTarget> {
        self.targets.forget(target)
    }

    /// Bookkeeping for `target`, if tracked.
    #[must_use]
    pub fn tracked_target(&self, target: TargetId) -> Option<TrackedTarget> {
        self.targets.get(target)
    }

    /// Inserts or, for keyed zones, moves a dynamic zone. Returns `true` on replace.
    pub fn upsert_dynamic_zone(&self, zone: DynamicZone) -> bool {
        debug!(
            key = zone.key().unwrap_or("-"),
            radius = zone.radius(),
            expiry = %zone.expiry(),
            "dynamic zone upserted"
        );
        self.dynamic.upsert(zone)
    }

    /// Opens (or refreshes, when `key` is set) the zone for an external trigger.
    pub fn register_trigger(
        &self,
        trigger: ZoneTrigger,
        key: Option<&str>,
        position: Position,
        now: Timestamp,
    ) -> DynamicZone {
        let mut zone = trigger.zone(&self.config().zones, position, now);
        if let Some(key) = key {
            zone = zone.with_key(key);
        }
        self.upsert_dynamic_zone(zone.clone());
        zone
    }

    /// Removes a keyed dynamic zone.
    pub fn remove_dynamic_zone(&self, key: &str) -> bool {
        self.dynamic.remove(key)
    }

    /// Replaces the landmark set and adds unseen monuments to the table as a new
    /// configuration generation. Returns the added entries.
    pub fn discover_landmarks(&self, landmarks: Vec<Landmark>) -> BTreeMap<String, bool> {
        self.monuments.replace(landmarks);

        let mut guard = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let added = self.monuments.undiscovered_defaults(&guard.zones);
        if !added.is_empty() {
            let mut next = EngineConfig::clone(&guard);
            next.zones.monuments.extend(added.clone());
            *guard = Arc::new(next);
            info!(added = added.len(), "new monuments added to zone table");
        }
        added
    }

    /// Whether raiding is blocked at `now`, and whether the override or the window
    /// decided it.
    #[must_use]
    pub fn temporal_state(&self, now: Timestamp) -> (bool, DecisionReason) {
        temporal_state(&self.config(), self.overrides.current(), now)
    }

    /// Returns `true` when any zone kind matches `position`.
    #[must_use]
    pub fn is_zone_active(&self, position: Position, now: Timestamp) -> bool {
        self.zones
            .is_zone_active(&self.config().zones, position, now)
    }

    /// Every zone reason triggered at `position`, in evaluation order.
    #[must_use]
    pub fn diagnose(&self, position: Position, now: Timestamp) -> Vec<DecisionReason> {
        self.zones
            .diagnose(&self.config().zones, position, now)
            .into_iter()
            .map(|kind| kind.reason())
            .collect()
    }

    /// Gather, crafting and upkeep multipliers at `position`.
    #[must_use]
    pub fn zone_modifiers(&self, position: Position, now: Timestamp) -> ZoneModifiers {
        let config = self.config();
        if self.zones.is_zone_active(&config.zones, position, now) {
            ZoneModifiers::active(&config.bonuses)
        } else {
            ZoneModifiers::NEUTRAL
        }
    }

    /// Raid-block projection for status surfaces.
    #[must_use]
    pub fn raid_status(&self, now: Timestamp) -> RaidStatus {
        let config = self.config();
        let override_state = self.overrides.current();
        let (blocked, reason) = temporal_state(&config, override_state, now);
        let window = config.temporal.window;
        let local_time = config.temporal.local_time(now);

        RaidStatus {
            blocked,
            reason,
            override_state,
            window,
            local_time,
            time_until_change: window.time_until_next_change(local_time, blocked),
        }
    }

    /// Full snapshot for the maintenance sweep.
    #[must_use]
    pub fn status(&self, now: Timestamp) -> EngineStatus {
        let config = self.config();
        let monuments = config
            .zones
            .monuments
            .iter()
            .map(|(name, enabled)| MonumentStatus {
                name: name.clone(),
                enabled: *enabled,
                radius: config.zones.monument_radius_for(name),
            })
            .collect();

        EngineStatus {
            generated_at: now,
            raid: self.raid_status(now),
            monuments,
            dynamic_zones: self.dynamic.active(now).len(),
            tracked_targets: self.targets.len(),
        }
    }

    /// Reclaims expired dynamic zones. Returns how many were dropped.
    pub fn sweep(&self, now: Timestamp) -> usize {
        let removed = self.dynamic.sweep(now);
        if removed > 0 {
            debug!(removed, "expired dynamic zones swept");
        }
        removed
    }

    fn evaluate_raid(
        &self,
        config: &EngineConfig,
        context: &PolicyContext,
        authorized: bool,
        protectable: bool,
    ) -> PolicyDecision {
        if !protectable {
            return PolicyDecision::allow(DecisionReason::Allowed)
                .with_trail(vec!["protectable=false".into()]);
        }

        let now = context.now();
        let (blocked, temporal_reason) = temporal_state(config, self.overrides.current(), now);
        let mut trail = vec![format!("blocked={blocked}"), format!("by={temporal_reason}")];

        let Some(target) = context.target_id() else {
            trail.push("target=none".into());
            let decision = if blocked {
                PolicyDecision::block(temporal_reason, RAID_BLOCKED_MESSAGE)
            } else {
                PolicyDecision::allow(temporal_reason)
            };
            return decision.with_trail(trail);
        };

        let exceptions = &config.exceptions;
        let grace = self
            .targets
            .in_grace_period(target, now, exceptions.grace_period);
        let cooldown = self
            .targets
            .in_cooldown(target, now, exceptions.raid_cooldown);
        let decay_exempt = self
            .decay
            .is_exempt(target, now, exceptions.decay_bypass_hours);
        trail.extend([
            format!("target={target}"),
            format!("authorized={authorized}"),
            format!("grace={grace}"),
            format!("cooldown={cooldown}"),
            format!("decay_exempt={decay_exempt}"),
        ]);

        let decision = if authorized {
            PolicyDecision::allow(DecisionReason::Allowed)
        } else if grace {
            PolicyDecision::allow(DecisionReason::Grace)
        } else if !blocked {
            PolicyDecision::allow(temporal_reason)
        } else if decay_exempt {
            PolicyDecision::allow(DecisionReason::DecayExempt)
        } else if cooldown {
            PolicyDecision::allow(DecisionReason::Cooldown)
        } else {
            PolicyDecision::block(temporal_reason, RAID_BLOCKED_MESSAGE)
        };
        decision.with_trail(trail)
    }

    fn evaluate_interaction(
        &self,
        config: &EngineConfig,
        context: &PolicyContext,
        victim: Victim,
    ) -> PolicyDecision {
        let actor = context.actor_id();
        match victim {
            Victim::Npc => {
                return PolicyDecision::allow(DecisionReason::Allowed)
                    .with_trail(vec!["npc=true".into()]);
            }
            Victim::Environment => {
                return PolicyDecision::allow(DecisionReason::Allowed)
                    .with_trail(vec!["environment=true".into()]);
            }
            Victim::Actor { id } if id == actor => {
                return PolicyDecision::allow(DecisionReason::Allowed)
                    .with_trail(vec!["self=true".into()]);
            }
            Victim::Actor { .. } | Victim::Structure { .. } => {}
        }

        let self_owned = matches!(victim, Victim::Structure { owner: Some(owner) } if owner == actor);
        let zone = self
            .zones
            .first_match(&config.zones, context.position(), context.now());
        let mut trail = vec![
            format!("zone={}", zone.map_or("none", |kind| kind.reason().label())),
            format!("self_owned={self_owned}"),
        ];

        let Some(kind) = zone else {
            return if self_owned {
                PolicyDecision::allow(DecisionReason::Allowed).with_trail(trail)
            } else {
                PolicyDecision::block(DecisionReason::NoZone, AREA_MESSAGE).with_trail(trail)
            };
        };

        if self_owned {
            return PolicyDecision::allow(DecisionReason::Allowed).with_trail(trail);
        }
        if let Victim::Actor { .. } = victim {
            trail.push("actor_victim=true".into());
            return PolicyDecision::block(kind.reason(), ZONE_MESSAGE).with_trail(trail);
        }
        PolicyDecision::block(kind.reason(), AREA_MESSAGE).with_trail(trail)
    }
}

impl PolicyEngine for PolicyDecisionEngine {
    fn evaluate(&self, request: &PolicyRequest) -> PolicyDecision {
        let config = self.config();
        let context = request.context();
        let decision = match *request.action() {
            PolicyAction::Raid {
                authorized,
                protectable,
            } => self.evaluate_raid(&config, context, authorized, protectable),
            PolicyAction::Interact { victim } => {
                self.evaluate_interaction(&config, context, victim)
            }
        };

        debug!(
            actor = %context.actor_id(),
            action = %request.action().label(),
            allowed = decision.is_allow(),
            reason = %decision.reason(),
            "policy evaluated"
        );
        decision
    }
}

fn temporal_state(
    config: &EngineConfig,
    override_state: Override,
    now: Timestamp,
) -> (bool, DecisionReason) {
    match override_state.resolve() {
        Some(forced) => (forced, DecisionReason::Override),
        None => {
            let local = config.temporal.local_time(now);
            (
                config.temporal.window.contains(local),
                DecisionReason::TimeWindow,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;
    use crate::zones::{Biome, UniformSplatMap};
    use chrono::{TimeDelta, TimeZone, Utc};
    use raid_primitives::{ActorId, WorldBounds};

    #[derive(Default)]
    struct DecayTicks(HashMap<TargetId, Timestamp>);

    impl DecayLookup for DecayTicks {
        fn last_decay_tick(&self, target: TargetId) -> Option<Timestamp> {
            self.0.get(&target).copied()
        }
    }

    fn at(hour: u32, minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 14, hour, minute, 0).unwrap()
    }

    fn flat_map() -> UniformSplatMap {
        UniformSplatMap::new(WorldBounds::centered(4000.0).unwrap())
    }

    fn engine_with(decay: DecayTicks, map: UniformSplatMap) -> PolicyDecisionEngine {
        PolicyDecisionEngine::builder()
            .with_splat_sampler(Arc::new(map))
            .with_decay_lookup(Arc::new(decay))
            .build()
            .unwrap()
    }

    fn engine() -> PolicyDecisionEngine {
        engine_with(DecayTicks::default(), flat_map())
    }

    fn raid(now: Timestamp, target: Option<u64>, authorized: bool) -> PolicyRequest {
        let mut ctx = PolicyContext::new(now, Position::default(), ActorId::new(1));
        if let Some(target) = target {
            ctx = ctx.with_target(TargetId::new(target));
        }
        PolicyRequest::raid(ctx, authorized)
    }

    fn interact(now: Timestamp, victim: Victim) -> PolicyRequest {
        let ctx = PolicyContext::new(now, Position::default(), ActorId::new(1));
        PolicyRequest::interact(ctx, victim)
    }

    #[test]
    fn builder_requires_collaborators() {
        let err = PolicyDecisionEngine::builder()
            .with_decay_lookup(Arc::new(DecayTicks::default()))
            .build()
            .unwrap_err();
        assert!(matches!(err, PolicyError::MissingCollaborator("terrain sampler")));

        let err = PolicyDecisionEngine::builder()
            .with_splat_sampler(Arc::new(flat_map()))
            .build()
            .unwrap_err();
        assert!(matches!(err, PolicyError::MissingCollaborator("decay lookup")));
    }

    #[test]
    fn authorization_beats_everything() {
        let engine = engine();
        engine.set_override(true);
        let decision = engine.evaluate(&raid(at(12, 0), Some(5), true));
        assert!(decision.is_allow());
        assert_eq!(decision.reason(), DecisionReason::Allowed);
        assert!(decision.trail().contains(&"authorized=true".to_owned()));
    }

    #[test]
    fn blocked_without_exceptions_carries_message() {
        let engine = engine();
        let decision = engine.evaluate(&raid(at(23, 0), Some(5), false));
        assert!(decision.is_block());
        assert_eq!(decision.reason(), DecisionReason::TimeWindow);
        assert_eq!(decision.message(), Some(RAID_BLOCKED_MESSAGE));
    }

    #[test]
    fn cooldown_softly_allows_blocked_raid() {
        let engine = engine();
        let target = TargetId::new(5);
        engine.record_hostile_contact(target, at(22, 50));

        let decision = engine.evaluate(&raid(at(23, 0), Some(5), false));
        assert!(decision.is_allow());
        assert_eq!(decision.reason(), DecisionReason::Cooldown);
        assert!(decision.reason().is_soft_exception());
        assert_eq!(decision.message(), None);

        let decision = engine.evaluate(&raid(at(23, 5), Some(5), false));
        assert!(decision.is_block());
    }

    #[test]
    fn decay_exemption_is_checked_before_cooldown() {
        let target = TargetId::new(9);
        let mut ticks = DecayTicks::default();
        ticks.0.insert(target, at(0, 0) - TimeDelta::hours(1));
        let engine = engine_with(ticks, flat_map());
        engine.record_hostile_contact(target, at(22, 55));

        let decision = engine.evaluate(&raid(at(23, 0), Some(9), false));
        assert!(decision.is_allow());
        assert_eq!(decision.reason(), DecisionReason::DecayExempt);
        assert!(decision.reason().is_soft_exception());
    }

    #[test]
    fn open_window_allows_with_window_reason() {
        let engine = engine();
        let decision = engine.evaluate(&raid(at(12, 0), Some(5), false));
        assert!(decision.is_allow());
        assert_eq!(decision.reason(), DecisionReason::TimeWindow);
    }

    #[test]
    fn non_structures_skip_raid_blocking() {
        let engine = engine();
        let ctx = PolicyContext::new(at(23, 0), Position::default(), ActorId::new(1));
        let decision = engine.evaluate(&PolicyRequest::raid_on_prefab(ctx, "furnace", false, false));
        assert!(decision.is_allow());
        assert_eq!(decision.reason(), DecisionReason::Allowed);
    }

    #[test]
    fn timezone_offset_shifts_window() {
        let engine = engine();
        let mut config = EngineConfig::clone(&engine.config());
        config.temporal.timezone_offset_hours = 3;
        engine.reload(config);

        // 20:00 UTC is 23:00 local.
        assert_eq!(
            engine.temporal_state(at(20, 0)),
            (true, DecisionReason::TimeWindow)
        );
        assert!(!engine.temporal_state(at(18, 0)).0);
    }

    #[test]
    fn override_survives_reload() {
        let engine = engine();
        engine.apply_override(OverrideCommand::ForceAllow);
        engine.reload(EngineConfig::default());

        assert_eq!(engine.override_state(), Override::forced(false));
        assert_eq!(
            engine.temporal_state(at(23, 0)),
            (false, DecisionReason::Override)
        );

        engine.clear_override();
        assert_eq!(
            engine.temporal_state(at(23, 0)),
            (true, DecisionReason::TimeWindow)
        );
    }

    #[test]
    fn interactions_outside_zones() {
        let engine = engine();
        let now = at(12, 0);

        let own = engine.evaluate(&interact(now, Victim::Structure { owner: Some(ActorId::new(1)) }));
        assert!(own.is_allow());

        let other = engine.evaluate(&interact(now, Victim::Actor { id: ActorId::new(2) }));
        assert!(other.is_block());
        assert_eq!(other.reason(), DecisionReason::NoZone);
        assert_eq!(other.message(), Some(AREA_MESSAGE));

        assert!(engine.evaluate(&interact(now, Victim::Npc)).is_allow());
        assert!(engine.evaluate(&interact(now, Victim::Environment)).is_allow());
        assert!(engine
            .evaluate(&interact(now, Victim::Actor { id: ActorId::new(1) }))
            .is_allow());
    }

    #[test]
    fn interactions_inside_zone_keep_both_deny_paths() {
        let engine = engine_with(
            DecayTicks::default(),
            flat_map().with_weight(Biome::Snow, 0.9),
        );
        let now = at(12, 0);

        let own = engine.evaluate(&interact(now, Victim::Structure { owner: Some(ActorId::new(1)) }));
        assert!(own.is_allow());

        let actor = engine.evaluate(&interact(now, Victim::Actor { id: ActorId::new(2) }));
        assert!(actor.is_block());
        assert_eq!(actor.reason(), DecisionReason::ZoneBiome);
        assert_eq!(actor.message(), Some(ZONE_MESSAGE));

        let foreign = engine.evaluate(&interact(now, Victim::Structure { owner: None }));
        assert!(foreign.is_block());
        assert_eq!(foreign.reason(), DecisionReason::ZoneBiome);
        assert_eq!(foreign.message(), Some(AREA_MESSAGE));
    }

    #[test]
    fn diagnose_and_modifiers_follow_zones() {
        let engine = engine();
        let now = at(12, 0);
        let here = Position::new(10.0, 0.0, 10.0);
        assert!(engine.diagnose(here, now).is_empty());
        assert_eq!(engine.zone_modifiers(here, now), ZoneModifiers::NEUTRAL);

        engine.register_trigger(ZoneTrigger::CargoShip, Some("cargo"), here, now);
        assert_eq!(engine.diagnose(here, now), vec![DecisionReason::ZoneDynamic]);
        let modifiers = engine.zone_modifiers(here, now);
        assert!((modifiers.upkeep - 0.75).abs() < f32::EPSILON);

        let later = now + TimeDelta::seconds(121);
        assert!(!engine.is_zone_active(here, later));
        assert_eq!(engine.sweep(later), 1);
    }

    #[test]
    fn discovery_adds_monuments_as_new_generation() {
        let engine = engine();
        let before = engine.config();
        let added = engine.discover_landmarks(vec![
            Landmark::from_prefab("assets/monument/large/airfield_1.prefab", Position::default()),
            Landmark::from_prefab("assets/monument/medium/compound.prefab", Position::default()),
        ]);

        assert_eq!(added.get("Airfield"), Some(&true));
        assert_eq!(added.get("compound"), Some(&true));
        assert!(before.zones.monuments.is_empty());
        assert_eq!(engine.config().zones.monuments.len(), 2);

        assert!(engine
            .discover_landmarks(vec![Landmark::new("Airfield", Position::default())])
            .is_empty());

        // Reloading a file that never mentioned the landmark keeps it known.
        engine.reload(EngineConfig::default());
        assert_eq!(engine.config().zones.monuments.get("Airfield"), Some(&true));
    }

    #[test]
    fn reload_keeps_concurrent_discoveries() {
        let engine = engine();
        for round in 0..200 {
            let name = format!("Site {round}");
            std::thread::scope(|scope| {
                scope.spawn(|| engine.reload(EngineConfig::default()));
                scope.spawn(|| {
                    let site = Landmark::new(name.clone(), Position::default());
                    engine.discover_landmarks(vec![site]);
                });
            });
            assert_eq!(engine.config().zones.monuments.get(&name), Some(&true));
        }
    }

    #[test]
    fn forgotten_target_loses_grace() {
        let engine = engine();
        let target = TargetId::new(9);
        engine.record_placement(target, at(22, 50));
        assert!(engine.tracked_target(target).is_some());
        let graced = engine.evaluate(&raid(at(23, 0), Some(9), false));
        assert_eq!(graced.reason(), DecisionReason::Grace);

        assert!(engine.forget_target(target).is_some());
        assert!(engine.tracked_target(target).is_none());
        let decision = engine.evaluate(&raid(at(23, 0), Some(9), false));
        assert!(decision.is_block());
        assert_eq!(decision.reason(), DecisionReason::TimeWindow);
    }

    #[test]
    fn removed_vehicle_zone_stops_matching() {
        let engine = engine();
        let deck = Position::new(300.0, 0.0, -120.0);
        engine.register_trigger(ZoneTrigger::CargoShip, Some("cargo"), deck, at(12, 0));
        assert!(engine.is_zone_active(deck, at(12, 1)));

        assert!(engine.remove_dynamic_zone("cargo"));
        assert!(!engine.is_zone_active(deck, at(12, 1)));
        assert!(!engine.remove_dynamic_zone("cargo"));
    }

    #[test]
    fn status_reports_every_surface() {
        let engine = engine();
        engine.record_placement(TargetId::new(3), at(21, 0));
        engine.upsert_dynamic_zone(DynamicZone::new(
            Position::default(),
            50.0,
            at(23, 0) + TimeDelta::minutes(5),
        ));
        engine.discover_landmarks(vec![Landmark::new("Launch Site", Position::default())]);

        let status = engine.status(at(23, 0));
        assert!(status.raid.blocked);
        assert_eq!(status.raid.time_until_change, Duration::from_secs(9 * 3600));
        assert_eq!(status.dynamic_zones, 1);
        assert_eq!(status.tracked_targets, 1);
        assert_eq!(status.monument_report(), "Monument PvP Status:\nLaunch Site: PvP\n");
    }
}
