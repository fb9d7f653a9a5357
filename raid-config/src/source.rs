//! Sources polled by the reload loop.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use raid_policy::EngineConfig;
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::loader::ConfigLoader;

/// Supplies new configuration generations.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Returns the next generation, or `None` when nothing changed since the last
    /// poll.
    async fn poll(&self) -> ConfigResult<Option<EngineConfig>>;
}

/// Re-reads a JSON file and yields a generation whenever its content changes.
#[derive(Debug)]
pub struct FileConfigSource {
    path: PathBuf,
    loader: ConfigLoader,
    last_seen: Mutex<Option<String>>,
}

impl FileConfigSource {
    /// Watches `path`. The first poll always yields the file's configuration.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loader: ConfigLoader::new(),
            last_seen: Mutex::new(None),
        }
    }

    /// File being watched.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    async fn poll(&self) -> ConfigResult<Option<EngineConfig>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ConfigError::Io {
                path: self.path.clone(),
                source,
            })?;

        {
            let last = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
            if last.as_deref() == Some(text.as_str()) {
                debug!(path = %self.path.display(), "configuration unchanged");
                return Ok(None);
            }
        }

        let result = self.loader.load_str(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                origin: self.path.display().to_string(),
                source,
            },
            other => other,
        })?;
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Some(text);
        info!(
            path = %self.path.display(),
            warnings = result.warnings.len(),
            "configuration change detected"
        );
        Ok(Some(result.config))
    }
}

/// In-memory queue of generations, handy for tests and embedders that push
/// configuration themselves.
#[derive(Debug, Default)]
pub struct StaticConfigSource {
    pending: Mutex<VecDeque<EngineConfig>>,
}

impl StaticConfigSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a generation for the next poll.
    pub fn push(&self, config: EngineConfig) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(config);
    }
}

#[async_trait]
impl ConfigSource for StaticConfigSource {
    async fn poll(&self) -> ConfigResult<Option<EngineConfig>> {
        Ok(self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front())
    }
}
