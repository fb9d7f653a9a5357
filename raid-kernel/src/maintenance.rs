//! Background loops that keep the engine fresh.
//!
//! Three independent tokio tasks share a shutdown flag: the status sweep, the
//! configuration reload check, and the hourly block announcement. None of them is
//! on the decision path; each takes the engine's locks only for the duration of a
//! single call.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use raid_config::ConfigSource;
use raid_policy::{BlockAnnouncement, PolicyDecisionEngine};
use raid_primitives::Clock;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::observer::StatusObserver;

/// Intervals for the maintenance loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceConfig {
    sweep_interval: Duration,
    reload_interval: Duration,
    announce_interval: Duration,
}

impl MaintenanceConfig {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(
        sweep_interval: Duration,
        reload_interval: Duration,
        announce_interval: Duration,
    ) -> Self {
        Self {
            sweep_interval,
            reload_interval,
            announce_interval,
        }
    }

    /// Period of the status sweep.
    #[must_use]
    pub const fn sweep_interval(self) -> Duration {
        self.sweep_interval
    }

    /// Period of the configuration reload check.
    #[must_use]
    pub const fn reload_interval(self) -> Duration {
        self.reload_interval
    }

    /// Period of the block announcement.
    #[must_use]
    pub const fn announce_interval(self) -> Duration {
        self.announce_interval
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MaintenanceError::InvalidConfig`] when any interval is zero.
    pub fn validate(self) -> MaintenanceResult<()> {
        if self.sweep_interval.is_zero() {
            return Err(MaintenanceError::InvalidConfig(
                "sweep interval must be greater than zero",
            ));
        }
        if self.reload_interval.is_zero() {
            return Err(MaintenanceError::InvalidConfig(
                "reload interval must be greater than zero",
            ));
        }
        if self.announce_interval.is_zero() {
            return Err(MaintenanceError::InvalidConfig(
                "announce interval must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(30),
            reload_interval: Duration::from_secs(60),
            announce_interval: Duration::from_secs(3600),
        }
    }
}

/// Result alias for maintenance operations.
pub type MaintenanceResult<T> = Result<T, MaintenanceError>;

/// Errors surfaced when starting the maintenance runtime.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MaintenanceError {
    /// Interval configuration was invalid.
    #[error("invalid maintenance configuration: {0}")]
    InvalidConfig(&'static str),
    /// No tokio runtime is available to spawn the loops on.
    #[error("maintenance loops require a tokio runtime")]
    NoRuntime,
}

struct Shared {
    engine: Arc<PolicyDecisionEngine>,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn StatusObserver>,
    shutdown: AtomicBool,
}

impl Shared {
    fn stopped(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

/// Handle to the running maintenance loops. Dropping it aborts them.
pub struct MaintenanceRuntime {
    shared: Arc<Shared>,
    config: MaintenanceConfig,
    workers: Vec<JoinHandle<()>>,
}

impl fmt::Debug for MaintenanceRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaintenanceRuntime")
            .field("config", &self.config)
            .field("shutdown", &self.shared.stopped())
            .field("workers", &self.workers.len())
            .finish_non_exhaustive()
    }
}

impl MaintenanceRuntime {
    /// Validates `config` and spawns the loops on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`MaintenanceError::InvalidConfig`] for zero intervals and
    /// [`MaintenanceError::NoRuntime`] when called outside a tokio runtime.
    pub fn start(
        engine: Arc<PolicyDecisionEngine>,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn StatusObserver>,
        source: Arc<dyn ConfigSource>,
        config: MaintenanceConfig,
    ) -> MaintenanceResult<Self> {
        config.validate()?;
        let handle =
            tokio::runtime::Handle::try_current().map_err(|_| MaintenanceError::NoRuntime)?;

        let shared = Arc::new(Shared {
            engine,
            clock,
            observer,
            shutdown: AtomicBool::new(false),
        });

        let workers = vec![
            handle.spawn(run_sweep_loop(Arc::clone(&shared), config.sweep_interval())),
            handle.spawn(run_reload_loop(
                Arc::clone(&shared),
                source,
                config.reload_interval(),
            )),
            handle.spawn(run_announce_loop(
                Arc::clone(&shared),
                config.announce_interval(),
            )),
        ];
        info!(
            sweep_secs = config.sweep_interval().as_secs_f64(),
            reload_secs = config.reload_interval().as_secs_f64(),
            announce_secs = config.announce_interval().as_secs_f64(),
            "maintenance runtime started"
        );

        Ok(Self {
            shared,
            config,
            workers,
        })
    }

    /// Intervals in use.
    #[must_use]
    pub const fn config(&self) -> MaintenanceConfig {
        self.config
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) was requested.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shared.stopped()
    }

    /// Stops the loops and waits for their tasks to wind down.
    pub async fn shutdown(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        for worker in self.workers.drain(..) {
            worker.abort();
            if let Err(err) = worker.await {
                if !err.is_cancelled() {
                    warn!(?err, "maintenance worker failed");
                }
            }
        }
        info!("maintenance runtime stopped");
    }
}

impl Drop for MaintenanceRuntime {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        for worker in &self.workers {
            worker.abort();
        }
    }
}

fn ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn run_sweep_loop(shared: Arc<Shared>, period: Duration) {
    let mut interval = ticker(period);
    while !shared.stopped() {
        interval.tick().await;
        if shared.stopped() {
            break;
        }

        let now = shared.clock.now();
        let swept = shared.engine.sweep(now);
        let status = shared.engine.status(now);
        debug!(
            swept,
            blocked = status.raid.blocked,
            dynamic_zones = status.dynamic_zones,
            "status sweep"
        );
        shared.observer.publish_status(&status).await;
    }
}

async fn run_reload_loop(shared: Arc<Shared>, source: Arc<dyn ConfigSource>, period: Duration) {
    let mut interval = ticker(period);
    while !shared.stopped() {
        interval.tick().await;
        if shared.stopped() {
            break;
        }

        match source.poll().await {
            Ok(Some(config)) => shared.engine.reload(config),
            Ok(None) => {}
            Err(err) => warn!(%err, "configuration reload failed; keeping current generation"),
        }
    }
}

async fn run_announce_loop(shared: Arc<Shared>, period: Duration) {
    let mut interval = ticker(period);
    // The first tick completes immediately; announcements start one period in.
    interval.tick().await;
    while !shared.stopped() {
        interval.tick().await;
        if shared.stopped() {
            break;
        }

        let status = shared.engine.raid_status(shared.clock.now());
        if let Some(announcement) = BlockAnnouncement::for_status(&status) {
            info!(hours_remaining = announcement.hours_remaining, "raid block announcement");
            shared.observer.announce(&announcement).await;
        }
    }
}
