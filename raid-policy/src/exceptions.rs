//! Per-target grace and cooldown bookkeeping.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use chrono::TimeDelta;
use raid_primitives::{TargetId, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Timestamps kept for one raid-protectable structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTarget {
    /// Identifier of the structure.
    pub id: TargetId,
    /// When the structure was last placed. Absent for structures that predate
    /// tracking.
    pub placed_at: Option<Timestamp>,
    /// Most recent authorised hostile contact.
    pub last_hostile_contact: Option<Timestamp>,
}

impl TrackedTarget {
    const fn empty(id: TargetId) -> Self {
        Self {
            id,
            placed_at: None,
            last_hostile_contact: None,
        }
    }
}

/// `true` when `now - since < span`. Spans too large for the calendar never elapse.
fn within(since: Timestamp, now: Timestamp, span: Duration) -> bool {
    match TimeDelta::from_std(span) {
        Ok(span) => now.signed_duration_since(since) < span,
        Err(_) => true,
    }
}

/// Tracks placement and authorised-contact times per target.
///
/// Unknown targets never have an exception. Entries are only dropped through
/// [`forget`](Self::forget) when the owning structure is destroyed.
#[derive(Debug, Default)]
pub struct GraceCooldownTracker {
    targets: RwLock<HashMap<TargetId, TrackedTarget>>,
}

impl GraceCooldownTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a placement. A later placement of the same id restarts the grace clock.
    pub fn record_placement(&self, target: TargetId, now: Timestamp) {
        let mut guard = self.targets.write().unwrap_or_else(PoisonError::into_inner);
        let entry = guard
            .entry(target)
            .or_insert_with(|| TrackedTarget::empty(target));
        entry.placed_at = Some(now);
        trace!(%target, %now, "target placement recorded");
    }

    /// Records an authorised hostile contact on `target`.
    pub fn record_hostile_contact(&self, target: TargetId, now: Timestamp) {
        let mut guard = self.targets.write().unwrap_or_else(PoisonError::into_inner);
        let entry = guard
            .entry(target)
            .or_insert_with(|| TrackedTarget::empty(target));
        entry.last_hostile_contact = Some(now);
        trace!(%target, %now, "hostile contact recorded");
    }

    /// Returns `true` while `target` is younger than `grace`.
    #[must_use]
    pub fn in_grace_period(&self, target: TargetId, now: Timestamp, grace: Duration) -> bool {
        self.get(target)
            .and_then(|tracked| tracked.placed_at)
            .is_some_and(|placed_at| within(placed_at, now, grace))
    }

    /// Returns `true` while the last authorised contact is more recent than `cooldown`.
    #[must_use]
    pub fn in_cooldown(&self, target: TargetId, now: Timestamp, cooldown: Duration) -> bool {
        self.get(target)
            .and_then(|tracked| tracked.last_hostile_contact)
            .is_some_and(|contact| within(contact, now, cooldown))
    }

    /// Returns the tracked timestamps for `target`.
    #[must_use]
    pub fn get(&self, target: TargetId) -> Option<TrackedTarget> {
        self.targets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&target)
            .copied()
    }

    /// Drops `target` after its structure was destroyed.
    pub fn forget(&self, target: TargetId) -> Option<TrackedTarget> {
        self.targets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&target)
    }

    /// Number of tracked targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
