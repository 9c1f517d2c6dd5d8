//! Log registry.
//!
//! [`LineLogs`] owns the storage directory and the worker lanes, and hands
//! out [`LineLog`] handles per category.

use crate::config::LogConfig;
use crate::log::LineLog;
use linelog_concurrency::{LaneManager, LaneMetrics, LanePolicy};
use linelog_core::{Category, Result};
use linelog_storage::{LogDir, SyncMode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Registry of line logs sharing one storage directory.
///
/// # Example
///
/// ```ignore
/// use linelog::prelude::*;
///
/// // Open with default settings
/// let logs = LineLogs::open("./logs")?;
///
/// let errors = logs.log("errors")?;
/// errors.append("first");
/// errors.sync()?;
///
/// // Drain queued work and stop the workers
/// logs.shutdown();
/// ```
///
/// # Lifetime
///
/// Workers stop when [`LineLogs::shutdown`] is called, or when the registry
/// and every [`LineLog`] obtained from it have been dropped. In both cases
/// operations already queued still run.
pub struct LineLogs {
    config: LogConfig,
    dir: LogDir,
    lanes: Arc<LaneManager>,
}

impl LineLogs {
    /// Open logs stored under `path` with default settings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open()
    }

    /// Open logs configured from the process environment.
    ///
    /// See [`LogConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::builder().config(LogConfig::from_env()?).open()
    }

    /// Create a builder for registry configuration.
    pub fn builder() -> LineLogsBuilder {
        LineLogsBuilder::new()
    }

    /// Open logs with an explicit configuration.
    pub fn with_config(config: LogConfig) -> Result<Self> {
        config.validate()?;
        let dir = LogDir::create(&config.dir, config.sync_mode)?;
        let lanes = Arc::new(
            LaneManager::new(config.lane_policy, config.queue_capacity)
                .with_lane_limit(config.lane_limit),
        );
        debug!(
            dir = %config.dir.display(),
            lanes = ?config.lane_policy,
            lane_limit = config.lane_limit,
            sync = config.sync_mode.description(),
            "opened line logs"
        );
        Ok(Self { config, dir, lanes })
    }

    /// Handle to the log named `category`.
    ///
    /// Nothing is created on disk until the first mutation.
    pub fn log(&self, category: &str) -> Result<LineLog> {
        Ok(self.log_for(Category::new(category)?))
    }

    /// Handle to the log for an already validated category.
    pub fn log_for(&self, category: Category) -> LineLog {
        let file = self.dir.file(&category);
        LineLog::new(category, file, Arc::clone(&self.lanes))
    }

    /// Categories that currently have a file, sorted by name.
    pub fn categories(&self) -> Result<Vec<Category>> {
        self.dir.categories()
    }

    /// Storage directory.
    pub fn path(&self) -> &Path {
        self.dir.root()
    }

    /// Active configuration.
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Worker lane statistics.
    ///
    /// `lanes` counts live lanes only; task counters include retired ones.
    pub fn metrics(&self) -> LogMetrics {
        LogMetrics {
            lanes: self.lanes.lane_count(),
            tasks: self.lanes.metrics(),
        }
    }

    /// Stop every worker after it drains its queue.
    ///
    /// Blocks until the workers have exited. Idempotent. Operations
    /// submitted afterwards, through any handle, complete with
    /// [`Error::Shutdown`](crate::Error::Shutdown).
    ///
    /// Called from a completion callback, the lanes are closed but the
    /// workers are not waited for, since another worker may be blocked on
    /// work queued behind that callback.
    pub fn shutdown(&self) {
        self.lanes.shutdown_all();
    }

    /// Check if [`LineLogs::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        self.lanes.is_closed()
    }
}

impl std::fmt::Debug for LineLogs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineLogs")
            .field("config", &self.config)
            .field("lanes", &self.lanes)
            .finish()
    }
}

/// Registry metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogMetrics {
    /// Live worker lanes
    pub lanes: usize,
    /// Task counters summed over lanes
    pub tasks: LaneMetrics,
}

/// Builder for registry configuration.
///
/// # Example
///
/// ```ignore
/// // Crash reports: survive power loss, one worker for everything
/// let logs = LineLogs::builder()
///     .path("./logs")
///     .strict()
///     .shared_lane()
///     .open()?;
///
/// // Busy logs: larger queues before submitters block
/// let logs = LineLogs::builder()
///     .path("./logs")
///     .queue_capacity(1024)
///     .open()?;
/// ```
#[derive(Debug, Clone)]
pub struct LineLogsBuilder {
    config: LogConfig,
}

impl LineLogsBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Replace every setting with `config`.
    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the storage directory.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.dir = PathBuf::from(path.as_ref());
        self
    }

    /// Set how many operations a lane buffers before submitters block.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Serialize every category through one worker.
    pub fn shared_lane(mut self) -> Self {
        self.config.lane_policy = LanePolicy::Shared;
        self
    }

    /// Set how many lanes may exist before idle ones are retired.
    ///
    /// Only matters with per-category lanes. A category whose lane was
    /// retired gets a new one on its next operation.
    pub fn lane_limit(mut self, limit: usize) -> Self {
        self.config.lane_limit = limit;
        self
    }

    /// Give each category its own worker (default).
    pub fn per_category_lanes(mut self) -> Self {
        self.config.lane_policy = LanePolicy::PerCategory;
        self
    }

    /// fsync after every mutation.
    pub fn strict(mut self) -> Self {
        self.config.sync_mode = SyncMode::Strict;
        self
    }

    /// Leave flushing to the OS (default).
    pub fn buffered(mut self) -> Self {
        self.config.sync_mode = SyncMode::Buffered;
        self
    }

    /// Create the storage directory and open the registry.
    pub fn open(self) -> Result<LineLogs> {
        LineLogs::with_config(self.config)
    }
}

impl Default for LineLogsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
