//! Configuration.
//!
//! [`LogConfig`] can be built in code, through
//! [`LineLogsBuilder`](crate::LineLogsBuilder), or loaded from the process
//! environment:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `LINELOG_DIR` | storage directory | platform data dir + `/linelog` |
//! | `LINELOG_QUEUE_CAPACITY` | pending operations per lane | 64 |
//! | `LINELOG_LANES` | `per-category` or `shared` | `per-category` |
//! | `LINELOG_LANE_LIMIT` | lanes kept before idle ones are retired | 64 |
//! | `LINELOG_SYNC` | `buffered` or `strict` | `buffered` |

use linelog_concurrency::{LanePolicy, DEFAULT_LANE_LIMIT, DEFAULT_QUEUE_CAPACITY};
use linelog_core::{Error, Result};
use linelog_storage::SyncMode;
use std::env;
use std::path::PathBuf;

/// Storage directory variable
pub const ENV_DIR: &str = "LINELOG_DIR";
/// Queue capacity variable
pub const ENV_QUEUE_CAPACITY: &str = "LINELOG_QUEUE_CAPACITY";
/// Lane policy variable
pub const ENV_LANES: &str = "LINELOG_LANES";
/// Lane limit variable
pub const ENV_LANE_LIMIT: &str = "LINELOG_LANE_LIMIT";
/// Sync mode variable
pub const ENV_SYNC: &str = "LINELOG_SYNC";

/// Settings of a [`LineLogs`](crate::LineLogs) registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Directory holding one file per category
    pub dir: PathBuf,
    /// Pending operations a lane buffers before submitters block
    pub queue_capacity: usize,
    /// How categories map to worker lanes
    pub lane_policy: LanePolicy,
    /// Lanes kept before idle ones are retired
    pub lane_limit: usize,
    /// Whether mutations are fsynced before completing
    pub sync_mode: SyncMode,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            lane_policy: LanePolicy::default(),
            lane_limit: DEFAULT_LANE_LIMIT,
            sync_mode: SyncMode::default(),
        }
    }
}

impl LogConfig {
    /// Application-private storage directory used when none is configured.
    ///
    /// `<local data dir>/linelog`, or `./linelog` on platforms without one.
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("linelog"))
            .unwrap_or_else(|| PathBuf::from("linelog"))
    }

    /// Load configuration from the process environment.
    ///
    /// Unset variables keep their defaults; malformed ones are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DIR).filter(|v| !v.trim().is_empty()) {
            config.dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(ENV_QUEUE_CAPACITY) {
            config.queue_capacity = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a positive integer, got {:?}", ENV_QUEUE_CAPACITY, raw))
            })?;
        }

        if let Some(raw) = lookup(ENV_LANES) {
            config.lane_policy = LanePolicy::parse(&raw).ok_or_else(|| {
                Error::Config(format!("{} must be per-category or shared, got {:?}", ENV_LANES, raw))
            })?;
        }

        if let Some(raw) = lookup(ENV_LANE_LIMIT) {
            config.lane_limit = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a positive integer, got {:?}", ENV_LANE_LIMIT, raw))
            })?;
        }

        if let Some(raw) = lookup(ENV_SYNC) {
            config.sync_mode = SyncMode::parse(&raw).ok_or_else(|| {
                Error::Config(format!("{} must be buffered or strict, got {:?}", ENV_SYNC, raw))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(Error::Config("queue capacity must be at least 1".into()));
        }
        if self.lane_limit == 0 {
            return Err(Error::Config("lane limit must be at least 1".into()));
        }
        if self.dir.as_os_str().is_empty() {
            return Err(Error::Config("storage directory must not be empty".into()));
        }
        Ok(())
    }
}
