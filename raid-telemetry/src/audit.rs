//! Structured audit trail for raid attempts.

use raid_policy::{PolicyAction, PolicyDecision, PolicyRequest};
use tracing::info;

/// Target of every audit event.
pub const AUDIT_TARGET: &str = "raidguard::audit";

/// Signals behind a raid decision, recovered from its trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RaidSignals {
    /// Actor held building privilege.
    pub authorized: bool,
    /// Target was in its grace period.
    pub grace: bool,
    /// Target was in cooldown.
    pub cooldown: bool,
    /// Target was decay-exempt.
    pub decay_exempt: bool,
    /// Window or override said blocked.
    pub blocked: bool,
}

impl RaidSignals {
    /// Reads the `name=value` entries of a decision trail.
    #[must_use]
    pub fn from_trail(trail: &[String]) -> Self {
        let flag = |name: &str| {
            trail
                .iter()
                .filter_map(|entry| entry.split_once('='))
                .any(|(key, value)| key == name && value == "true")
        };
        Self {
            authorized: flag("authorized"),
            grace: flag("grace"),
            cooldown: flag("cooldown"),
            decay_exempt: flag("decay_exempt"),
            blocked: flag("blocked"),
        }
    }
}

/// Emits one audit event for a raid decision. Non-raid requests are ignored.
///
/// Returns the signals that were logged.
pub fn record(
    request: &PolicyRequest,
    decision: &PolicyDecision,
    target_name: &str,
) -> Option<RaidSignals> {
    let PolicyAction::Raid { .. } = request.action() else {
        return None;
    };
    let context = request.context();
    let signals = RaidSignals::from_trail(decision.trail());

    info!(
        target: AUDIT_TARGET,
        actor = %context.actor_id(),
        target_id = context.target_id().map(raid_primitives::TargetId::get),
        structure = target_name,
        authorized = signals.authorized,
        grace = signals.grace,
        cooldown = signals.cooldown,
        decay_exempt = signals.decay_exempt,
        blocked = signals.blocked,
        allowed = decision.is_allow(),
        reason = %decision.reason(),
        "raid attempt"
    );
    Some(signals)
}
