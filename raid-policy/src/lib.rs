//! Access-control decisions for raiding and zone-gated interactions.
//!
//! Two policy axes live here. The temporal axis decides whether structure damage is
//! raid-blocked by combining a recurring time window, an administrative override,
//! and per-target grace, cooldown, and decay exceptions. The spatial axis decides
//! whether an interaction is allowed at a position by classifying it against biome
//! weight maps, named monuments, and expiring dynamic zones.
//!
//! Everything is driven through [`PolicyDecisionEngine`], which owns all mutable
//! state and takes `now` explicitly on every call.

#![warn(missing_docs, clippy::pedantic)]

pub mod config;
pub mod contracts;
pub mod decay;
pub mod decision;
pub mod engine;
pub mod exceptions;
pub mod override_control;
pub mod status;
pub mod temporal;
pub mod zones;

pub use config::{BonusConfig, EngineConfig, ExceptionConfig, TemporalConfig, ZoneConfig};
pub use contracts::{PolicyAction, PolicyContext, PolicyRequest, Victim, is_raid_protectable};
pub use decay::{DecayLookup, DecayStatusOracle, NeverDecays, is_decay_exempt};
pub use decision::{DecisionKind, DecisionReason, PolicyDecision};
pub use engine::{
    PolicyDecisionEngine, PolicyEngine, PolicyEngineBuilder, PolicyError, PolicyResult,
};
pub use exceptions::{GraceCooldownTracker, TrackedTarget};
pub use override_control::{Override, OverrideCommand, OverrideController};
pub use status::{BlockAnnouncement, EngineStatus, MonumentStatus, RaidStatus};
pub use temporal::TimeWindow;
pub use zones::{
    Biome, DynamicZone, Landmark, NamedZone, SpatialZoneEvaluator, SplatSampler,
    UniformSplatMap, ZoneKind, ZoneModifiers, ZonePredicate, ZoneTrigger,
};
