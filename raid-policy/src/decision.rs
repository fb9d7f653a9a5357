//! Decision types returned by the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Action proceeds.
    Allow,
    /// Action is rejected; callers zero out the consequence.
    Block,
}

/// Why the engine reached its decision. Callers use it for messaging and logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// The recurring time window decided.
    TimeWindow,
    /// An administrative override decided.
    Override,
    /// The target is still inside its placement grace period.
    Grace,
    /// The target was recently hit by an authorised actor.
    Cooldown,
    /// The target decayed once and has gone stale.
    DecayExempt,
    /// A biome zone matched.
    ZoneBiome,
    /// A monument zone matched.
    ZoneMonument,
    /// A dynamic zone matched.
    ZoneDynamic,
    /// No zone matched.
    NoZone,
    /// Nothing restricts the action.
    Allowed,
}

impl DecisionReason {
    /// Stable snake-case label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TimeWindow => "time_window",
            Self::Override => "override",
            Self::Grace => "grace",
            Self::Cooldown => "cooldown",
            Self::DecayExempt => "decay_exempt",
            Self::ZoneBiome => "zone_biome",
            Self::ZoneMonument => "zone_monument",
            Self::ZoneDynamic => "zone_dynamic",
            Self::NoZone => "no_zone",
            Self::Allowed => "allowed",
        }
    }

    /// Returns `true` for exceptions that let a blocked raid through silently,
    /// with no message to the actor.
    #[must_use]
    pub const fn is_soft_exception(self) -> bool {
        matches!(self, Self::Cooldown | Self::DecayExempt)
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured decision emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    kind: DecisionKind,
    reason: DecisionReason,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    trail: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl PolicyDecision {
    /// Allow decision.
    #[must_use]
    pub fn allow(reason: DecisionReason) -> Self {
        Self {
            kind: DecisionKind::Allow,
            reason,
            trail: Vec::new(),
            message: None,
        }
    }

    /// Block decision with the message shown to the actor.
    #[must_use]
    pub fn block(reason: DecisionReason, message: impl Into<String>) -> Self {
        Self {
            kind: DecisionKind::Block,
            reason,
            trail: Vec::new(),
            message: Some(message.into()),
        }
    }

    /// Replaces the human-readable reason trail.
    #[must_use]
    pub fn with_trail(mut self, trail: Vec<String>) -> Self {
        self.trail = trail;
        self
    }

    /// Decision kind.
    #[must_use]
    pub fn kind(&self) -> DecisionKind {
        self.kind
    }

    /// Returns `true` when the action proceeds.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        self.kind == DecisionKind::Allow
    }

    /// Returns `true` when the action is rejected.
    #[must_use]
    pub fn is_block(&self) -> bool {
        self.kind == DecisionKind::Block
    }

    /// Reason for the decision.
    #[must_use]
    pub fn reason(&self) -> DecisionReason {
        self.reason
    }

    /// Every signal consulted, in evaluation order, as `name=value` entries.
    #[must_use]
    pub fn trail(&self) -> &[String] {
        &self.trail
    }

    /// Message for the actor, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
