//! Administrative override of the raid-block window.

use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::PolicyError;

/// Forced raid-block outcome set by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Override {
    active: bool,
    forced_blocked: bool,
}

impl Override {
    /// No override; the time window decides.
    pub const AUTOMATIC: Self = Self {
        active: false,
        forced_blocked: false,
    };

    /// Override forcing the supplied outcome.
    #[must_use]
    pub const fn forced(forced_blocked: bool) -> Self {
        Self {
            active: true,
            forced_blocked,
        }
    }

    /// Returns `true` while the override supersedes the window.
    #[must_use]
    pub const fn is_active(self) -> bool {
        self.active
    }

    /// Returns the forced outcome, or `None` when the window should decide.
    #[must_use]
    pub const fn resolve(self) -> Option<bool> {
        if self.active {
            Some(self.forced_blocked)
        } else {
            None
        }
    }

    /// Short label for status output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self.resolve() {
            None => "automatic",
            Some(true) => "blocked",
            Some(false) => "allowed",
        }
    }
}

/// The three administrative override operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideCommand {
    /// Force raiding blocked regardless of the window.
    ForceBlock,
    /// Force raiding allowed regardless of the window.
    ForceAllow,
    /// Return to time-based blocking.
    Reset,
}

impl OverrideCommand {
    /// Override state produced by this command.
    #[must_use]
    pub const fn target_state(self) -> Override {
        match self {
            Self::ForceBlock => Override::forced(true),
            Self::ForceAllow => Override::forced(false),
            Self::Reset => Override::AUTOMATIC,
        }
    }
}

impl FromStr for OverrideCommand {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" | "block" => Ok(Self::ForceBlock),
            "off" | "allow" => Ok(Self::ForceAllow),
            "reset" | "auto" => Ok(Self::Reset),
            other => Err(PolicyError::UnknownOverrideCommand(other.to_owned())),
        }
    }
}

/// Holds the override state. Lives outside the swappable configuration so that
/// configuration reloads never touch it.
#[derive(Debug, Default)]
pub struct OverrideController {
    state: RwLock<Override>,
}

impl OverrideController {
    /// Creates a controller in automatic mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current override.
    #[must_use]
    pub fn current(&self) -> Override {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the forced outcome, if any.
    #[must_use]
    pub fn resolve(&self) -> Option<bool> {
        self.current().resolve()
    }

    /// Forces the raid-block outcome.
    pub fn set(&self, forced_blocked: bool) {
        self.store(Override::forced(forced_blocked));
    }

    /// Returns to automatic mode.
    pub fn clear(&self) {
        self.store(Override::AUTOMATIC);
    }

    /// Applies an administrative command and returns the resulting state.
    pub fn apply(&self, command: OverrideCommand) -> Override {
        let next = command.target_state();
        self.store(next);
        next
    }

    fn store(&self, next: Override) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *guard != next {
            info!(from = guard.label(), to = next.label(), "raid block override changed");
        }
        *guard = next;
    }
}
