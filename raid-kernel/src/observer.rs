//! Consumers of the maintenance loops' output.

use async_trait::async_trait;
use raid_policy::{BlockAnnouncement, EngineStatus};
use tokio::sync::{broadcast, watch};
use tracing::trace;

/// Receives projections pushed by [`MaintenanceRuntime`](crate::MaintenanceRuntime).
///
/// Implementations must not block; the sweep waits for them.
#[async_trait]
pub trait StatusObserver: Send + Sync {
    /// Called after every status sweep.
    async fn publish_status(&self, status: &EngineStatus);

    /// Called on every announce tick while raiding is blocked.
    async fn announce(&self, announcement: &BlockAnnouncement) {
        let _ = announcement;
    }
}

/// Observer backed by tokio channels: the latest status in a `watch`, block
/// announcements on a `broadcast`.
#[derive(Debug)]
pub struct ChannelObserver {
    status: watch::Sender<Option<EngineStatus>>,
    announcements: broadcast::Sender<BlockAnnouncement>,
}

impl ChannelObserver {
    /// Creates the observer with room for `announcement_capacity` undelivered
    /// announcements per subscriber.
    #[must_use]
    pub fn new(announcement_capacity: usize) -> Self {
        let (status, _) = watch::channel(None);
        let (announcements, _) = broadcast::channel(announcement_capacity.max(1));
        Self {
            status,
            announcements,
        }
    }

    /// Receiver holding the most recent status. Reads may be up to one sweep stale.
    #[must_use]
    pub fn status(&self) -> watch::Receiver<Option<EngineStatus>> {
        self.status.subscribe()
    }

    /// Subscribes to block announcements.
    #[must_use]
    pub fn announcements(&self) -> broadcast::Receiver<BlockAnnouncement> {
        self.announcements.subscribe()
    }
}

impl Default for ChannelObserver {
    fn default() -> Self {
        Self::new(16)
    }
}

#[async_trait]
impl StatusObserver for ChannelObserver {
    async fn publish_status(&self, status: &EngineStatus) {
        self.status.send_replace(Some(status.clone()));
    }

    async fn announce(&self, announcement: &BlockAnnouncement) {
        if self.announcements.send(*announcement).is_err() {
            trace!("no announcement subscribers");
        }
    }
}
