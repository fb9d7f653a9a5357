//! Recurring daily windows that may wrap past midnight.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

const SECS_PER_HOUR: u64 = 3600;

pub(crate) fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// A daily interval `[start, end)` in local wall-clock time.
///
/// When `start >= end` the window wraps across midnight, so `22:00-08:00` covers the
/// night. A window with `start == end` therefore covers the whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    /// Creates a window from its boundaries.
    #[must_use]
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// The 18:00-05:00 night used to gate night-only events.
    #[must_use]
    pub fn night() -> Self {
        Self::new(hm(18, 0), hm(5, 0))
    }

    /// Inclusive start of the window.
    #[must_use]
    pub const fn start(self) -> NaiveTime {
        self.start
    }

    /// Exclusive end of the window.
    #[must_use]
    pub const fn end(self) -> NaiveTime {
        self.end
    }

    /// Returns `true` when the window spans midnight.
    #[must_use]
    pub fn wraps(self) -> bool {
        self.start >= self.end
    }

    /// Returns `true` when `now` falls inside the window.
    #[must_use]
    pub fn contains(self, now: NaiveTime) -> bool {
        if self.wraps() {
            now >= self.start || now < self.end
        } else {
            self.start <= now && now < self.end
        }
    }

    /// Time until the next boundary crossing.
    ///
    /// `currently_inside` is the effective state, which can disagree with
    /// [`contains`](Self::contains) while an override is active: the next boundary is
    /// `end` when inside and `start` otherwise, rolled forward a day when it already
    /// passed today.
    #[must_use]
    pub fn time_until_next_change(self, now: NaiveTime, currently_inside: bool) -> Duration {
        let boundary = if currently_inside { self.end } else { self.start };
        let mut until = boundary.signed_duration_since(now);
        if until < TimeDelta::zero() {
            until += TimeDelta::days(1);
        }
        until.max(TimeDelta::zero()).to_std().unwrap_or_default()
    }

    /// Whole hours until the window closes, rounded up and never below one.
    #[must_use]
    pub fn hours_until_end(self, now: NaiveTime) -> u32 {
        let secs = self.time_until_next_change(now, true).as_secs();
        let hours = secs.div_ceil(SECS_PER_HOUR);
        u32::try_from(hours).unwrap_or(u32::MAX).max(1)
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::new(hm(22, 0), hm(8, 0))
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Formats a duration as `"{h}h {m}m"`.
#[must_use]
pub fn format_hours_minutes(duration: Duration) -> String {
    let minutes = duration.as_secs() / 60;
    format!("{}h {}m", minutes / 60, minutes % 60)
}
