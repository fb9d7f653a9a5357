//! Decay-based exemption for abandoned structures.

use std::sync::Arc;

use chrono::TimeDelta;
use raid_primitives::{TargetId, Timestamp};

/// External decay subsystem.
pub trait DecayLookup: Send + Sync {
    /// Instant of the last decay tick applied to `target`, if it ever decayed.
    fn last_decay_tick(&self, target: TargetId) -> Option<Timestamp>;
}

/// Decay lookup for servers without decay: nothing is ever exempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverDecays;

impl DecayLookup for NeverDecays {
    fn last_decay_tick(&self, _target: TargetId) -> Option<Timestamp> {
        None
    }
}

/// Returns `true` when the last decay tick is older than `bypass_hours`.
///
/// A target that never decayed (no tick, or a tick at or before the epoch) is
/// never exempt; new structures are covered by the grace period instead.
#[must_use]
pub fn is_decay_exempt(last_decay_tick: Option<Timestamp>, now: Timestamp, bypass_hours: u32) -> bool {
    let Some(tick) = last_decay_tick.filter(|tick| tick.timestamp() > 0) else {
        return false;
    };
    now.signed_duration_since(tick) > TimeDelta::hours(i64::from(bypass_hours))
}

/// Consults the decay subsystem for a target.
#[derive(Clone)]
pub struct DecayStatusOracle {
    lookup: Arc<dyn DecayLookup>,
}

impl std::fmt::Debug for DecayStatusOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecayStatusOracle")
            .field("lookup", &"dyn DecayLookup")
            .finish()
    }
}

impl DecayStatusOracle {
    /// Wraps a decay lookup.
    #[must_use]
    pub fn new(lookup: Arc<dyn DecayLookup>) -> Self {
        Self { lookup }
    }

    /// Returns `true` when `target` has gone stale beyond `bypass_hours`.
    #[must_use]
    pub fn is_exempt(&self, target: TargetId, now: Timestamp, bypass_hours: u32) -> bool {
        is_decay_exempt(self.lookup.last_decay_tick(target), now, bypass_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn never_decayed_is_not_exempt() {
        assert!(!is_decay_exempt(None, now(), 6));
        assert!(!is_decay_exempt(Some(Utc.timestamp_opt(0, 0).unwrap()), now(), 0));
    }

    #[test]
    fn stale_beyond_threshold_is_exempt() {
        let tick = now();
        let exactly = tick + TimeDelta::hours(6);
        assert!(!is_decay_exempt(Some(tick), exactly, 6));
        assert!(is_decay_exempt(Some(tick), exactly + TimeDelta::seconds(1), 6));
    }

    struct FixedTick(Timestamp);

    impl DecayLookup for FixedTick {
        fn last_decay_tick(&self, _target: TargetId) -> Option<Timestamp> {
            Some(self.0)
        }
    }

    #[test]
    fn oracle_consults_lookup() {
        let oracle = DecayStatusOracle::new(Arc::new(FixedTick(now())));
        let target = TargetId::new(3);
        assert!(!oracle.is_exempt(target, now() + TimeDelta::hours(1), 6));
        assert!(oracle.is_exempt(target, now() + TimeDelta::hours(7), 6));

        let never = DecayStatusOracle::new(Arc::new(NeverDecays));
        assert!(!never.is_exempt(target, now() + TimeDelta::days(30), 6));
    }
}
