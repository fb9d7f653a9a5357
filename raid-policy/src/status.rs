//! Operator-facing projections of engine state.

use std::time::Duration;

use chrono::NaiveTime;
use raid_primitives::Timestamp;
use serde::{Deserialize, Serialize};

use crate::decision::DecisionReason;
use crate::override_control::Override;
use crate::temporal::{TimeWindow, format_hours_minutes};

/// Current raid-block state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidStatus {
    /// Whether structure damage is currently blocked.
    pub blocked: bool,
    /// [`DecisionReason::Override`] or [`DecisionReason::TimeWindow`].
    pub reason: DecisionReason,
    /// Administrative override in effect.
    pub override_state: Override,
    /// Configured window.
    pub window: TimeWindow,
    /// Local time of day used for the window check.
    pub local_time: NaiveTime,
    /// Time until the window next opens or closes.
    pub time_until_change: Duration,
}

impl RaidStatus {
    /// Whole hours until raiding is allowed again, rounded up and at least one.
    /// `None` while raiding is allowed.
    #[must_use]
    pub fn hours_until_allowed(&self) -> Option<u32> {
        self.blocked
            .then(|| self.window.hours_until_end(self.local_time))
    }

    /// Multi-line status text for chat or console.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::with_capacity(4);
        lines.push(if self.blocked {
            "Raiding is currently BLOCKED.".to_owned()
        } else {
            "Raiding is currently ALLOWED.".to_owned()
        });
        if let Some(forced) = self.override_state.resolve() {
            let label = if forced { "Blocked" } else { "Allowed" };
            lines.push(format!("Admin override: {label}"));
        }
        lines.push(format!("Block Time: {}", self.window));
        lines.push(format!(
            "Next change in {}",
            format_hours_minutes(self.time_until_change)
        ));
        lines.join("\n")
    }
}

/// Periodic broadcast while raiding is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAnnouncement {
    /// Whole hours until raiding is allowed again.
    pub hours_remaining: u32,
}

impl BlockAnnouncement {
    /// Builds the announcement for `status`, or `None` while raiding is allowed.
    #[must_use]
    pub fn for_status(status: &RaidStatus) -> Option<Self> {
        status
            .hours_until_allowed()
            .map(|hours_remaining| Self { hours_remaining })
    }

    /// Broadcast text.
    #[must_use]
    pub fn message(&self) -> String {
        let plural = if self.hours_remaining == 1 { "" } else { "s" };
        format!(
            "Raid blocking is active. Raiding allowed again in {} hour{plural}.",
            self.hours_remaining
        )
    }
}

/// One monument as resolved by the current configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonumentStatus {
    /// Monument short name.
    pub name: String,
    /// Whether the monument is a PvP zone.
    pub enabled: bool,
    /// Effective radius.
    pub radius: f32,
}

/// Snapshot published by the maintenance sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// When the snapshot was taken.
    pub generated_at: Timestamp,
    /// Raid-block state.
    pub raid: RaidStatus,
    /// Monument table, sorted by name.
    pub monuments: Vec<MonumentStatus>,
    /// Dynamic zones still active.
    pub dynamic_zones: usize,
    /// Targets with grace or cooldown bookkeeping.
    pub tracked_targets: usize,
}

impl EngineStatus {
    /// Monument table rendered as `name: PvP|PvE` lines.
    #[must_use]
    pub fn monument_report(&self) -> String {
        let mut report = String::from("Monument PvP Status:\n");
        for monument in &self.monuments {
            let mode = if monument.enabled { "PvP" } else { "PvE" };
            report.push_str(&monument.name);
            report.push_str(": ");
            report.push_str(mode);
            report.push('\n');
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::hm;

    fn status(blocked: bool, local_time: NaiveTime) -> RaidStatus {
        let window = TimeWindow::default();
        RaidStatus {
            blocked,
            reason: DecisionReason::TimeWindow,
            override_state: Override::AUTOMATIC,
            window,
            local_time,
            time_until_change: window.time_until_next_change(local_time, blocked),
        }
    }

    #[test]
    fn summary_mentions_window_and_next_change() {
        let text = status(true, hm(23, 0)).summary();
        assert_eq!(
            text,
            "Raiding is currently BLOCKED.\nBlock Time: 22:00 - 08:00\nNext change in 9h 0m"
        );
    }

    #[test]
    fn summary_reports_override() {
        let mut forced = status(false, hm(12, 0));
        forced.override_state = Override::forced(false);
        forced.reason = DecisionReason::Override;
        assert!(forced.summary().contains("Admin override: Allowed"));
    }

    #[test]
    fn announcement_rounds_up_hours() {
        let announcement = BlockAnnouncement::for_status(&status(true, hm(7, 30))).unwrap();
        assert_eq!(announcement.hours_remaining, 1);
        assert_eq!(
            announcement.message(),
            "Raid blocking is active. Raiding allowed again in 1 hour."
        );

        let late = BlockAnnouncement::for_status(&status(true, hm(22, 10))).unwrap();
        assert_eq!(late.hours_remaining, 10);
        assert!(BlockAnnouncement::for_status(&status(false, hm(12, 0))).is_none());
    }

    #[test]
    fn monument_report_lists_modes() {
        let report = EngineStatus {
            generated_at: chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            raid: status(false, hm(12, 0)),
            monuments: vec![
                MonumentStatus {
                    name: "Airfield".into(),
                    enabled: true,
                    radius: 150.0,
                },
                MonumentStatus {
                    name: "Outpost".into(),
                    enabled: false,
                    radius: 80.0,
                },
            ],
            dynamic_zones: 0,
            tracked_targets: 0,
        }
        .monument_report();
        assert_eq!(report, "Monument PvP Status:\nAirfield: PvP\nOutpost: PvE\n");
    }
}
