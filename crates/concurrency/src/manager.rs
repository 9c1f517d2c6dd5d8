//! Lane manager: maps categories to lanes
//!
//! Under [`LanePolicy::PerCategory`] each category gets its own lane,
//! created on first use, so unrelated logs never wait on each other.
//! Under [`LanePolicy::Shared`] every category goes through one lane and
//! operations are serialized across categories as well.
//!
//! # Thread Safety
//!
//! Lanes live in a DashMap keyed by lane name. Lookups only lock the
//! target shard. Shutdown closes the manager first and then each lane, and
//! a submit that raced past the closed check shuts its lane down itself, so
//! no worker outlives [`LaneManager::shutdown_all`].
//!
//! # Idle Lanes
//!
//! Spawning a lane when [`LaneManager::lane_limit`] lanes already exist
//! first retires every idle lane (nothing queued, nothing running) and
//! joins its worker, so many short-lived categories do not accumulate
//! threads. A category whose lane was retired gets a fresh one on its next
//! submit. Retirement only happens between tasks, so a category's
//! operations still never run concurrently.

use crate::lane::{LaneMetrics, SerialLane};
use crate::task::Task;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use linelog_core::{Error, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of pending operations a lane buffers before submitters block
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Default number of lanes kept before idle ones are retired
pub const DEFAULT_LANE_LIMIT: usize = 64;

const SHARED_LANE: &str = "shared";

/// How categories are assigned to lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanePolicy {
    /// One lane per category
    #[default]
    PerCategory,
    /// One lane for every category
    Shared,
}

impl LanePolicy {
    /// Parse a policy name as used in configuration (`per-category` or `shared`)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "per-category" | "per_category" | "category" => Some(LanePolicy::PerCategory),
            "shared" | "global" => Some(LanePolicy::Shared),
            _ => None,
        }
    }
}

/// Owns every lane of a registry
pub struct LaneManager {
    policy: LanePolicy,
    capacity: usize,
    lane_limit: usize,
    lanes: DashMap<String, Arc<SerialLane>>,
    closed: AtomicBool,
    /// Tasks rejected before reaching a lane
    refused: AtomicU64,
    /// Counters of lanes retired while idle
    retired: Mutex<LaneMetrics>,
}

impl LaneManager {
    /// Create a manager; lanes are spawned lazily
    pub fn new(policy: LanePolicy, capacity: usize) -> Self {
        Self {
            policy,
            capacity,
            lane_limit: DEFAULT_LANE_LIMIT,
            lanes: DashMap::new(),
            closed: AtomicBool::new(false),
            refused: AtomicU64::new(0),
            retired: Mutex::new(LaneMetrics::default()),
        }
    }

    /// Set how many lanes may exist before idle ones are retired
    ///
    /// Values below 1 are treated as 1.
    pub fn with_lane_limit(mut self, limit: usize) -> Self {
        self.lane_limit = limit.max(1);
        self
    }

    /// Lane assignment policy
    pub fn policy(&self) -> LanePolicy {
        self.policy
    }

    /// Queue capacity of each lane
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lane count at which idle lanes are retired before spawning another
    pub fn lane_limit(&self) -> usize {
        self.lane_limit
    }

    /// Name of the lane serving `category`
    pub fn lane_name<'a>(&self, category: &'a str) -> &'a str {
        match self.policy {
            LanePolicy::PerCategory => category,
            LanePolicy::Shared => SHARED_LANE,
        }
    }

    /// Lane serving `category`, spawning it if needed
    pub fn lane(&self, category: &str) -> Result<Arc<SerialLane>> {
        if self.is_closed() {
            return Err(Error::Shutdown);
        }

        let name = self.lane_name(category);
        if let Some(lane) = self.lanes.get(name) {
            return Ok(Arc::clone(lane.value()));
        }

        if self.lanes.len() >= self.lane_limit {
            self.retire_idle();
        }

        let lane = match self.lanes.entry(name.to_string()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let lane = Arc::new(SerialLane::spawn(name, self.capacity)?);
                entry.insert(Arc::clone(&lane));
                lane
            }
        };
        Ok(lane)
    }

    /// Queue `task` on the lane serving `category`
    ///
    /// Returns `true` if queued; otherwise `task.reject` has been called.
    pub fn submit(&self, category: &str, task: Box<dyn Task>) -> bool {
        let mut task = task;
        loop {
            let lane = match self.lane(category) {
                Ok(lane) => lane,
                Err(e) => return self.refuse(task, e),
            };

            match lane.try_submit(task) {
                Ok(()) => {
                    if self.is_closed() {
                        // Raced with shutdown_all; it may not have seen this lane
                        lane.shutdown();
                    }
                    return true;
                }
                Err((returned, Error::Shutdown)) if !self.is_closed() => {
                    // Retired between lookup and submit; drop it and respawn
                    self.lanes
                        .remove_if(lane.name(), |_, current| Arc::ptr_eq(current, &lane));
                    task = returned;
                }
                Err((returned, reason)) => return self.refuse(returned, reason),
            }
        }
    }

    /// Retire every lane with nothing queued or running
    ///
    /// Returns the number of lanes retired. Their workers are joined, and
    /// their counters stay in [`LaneManager::metrics`].
    pub fn retire_idle(&self) -> usize {
        let candidates: Vec<Arc<SerialLane>> =
            self.lanes.iter().map(|l| Arc::clone(l.value())).collect();

        let mut retired = 0;
        for lane in candidates {
            let removed = self
                .lanes
                .remove_if(lane.name(), |_, current| {
                    Arc::ptr_eq(current, &lane) && lane.retire_if_idle()
                })
                .is_some();
            if removed {
                lane.shutdown();
                self.retired.lock().merge(&lane.metrics());
                retired += 1;
            }
        }
        if retired > 0 {
            debug!(retired, remaining = self.lanes.len(), "retired idle lanes");
        }
        retired
    }

    /// Check if the calling thread is the worker serving `category`
    pub fn is_worker_thread(&self, category: &str) -> bool {
        self.lanes
            .get(self.lane_name(category))
            .map(|lane| lane.is_worker_thread())
            .unwrap_or(false)
    }

    /// Check if the manager has been shut down
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of live lanes
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Counters summed over all lanes, live and retired, plus tasks
    /// refused before reaching one
    pub fn metrics(&self) -> LaneMetrics {
        let mut total = *self.retired.lock();
        total.rejected += self.refused.load(Ordering::Relaxed);
        for lane in self.lanes.iter() {
            total.merge(&lane.metrics());
        }
        total
    }

    /// Close every lane, draining queued work, and join the workers
    ///
    /// Idempotent. Later submits are rejected with [`Error::Shutdown`].
    /// Called from a lane's worker thread, the lanes are closed but not
    /// joined: another worker may be waiting on work queued behind the
    /// caller.
    pub fn shutdown_all(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!(lanes = self.lanes.len(), "shutting down lanes");
        }
        // Collect first: a draining task may look up its lane
        let lanes: Vec<Arc<SerialLane>> = self.lanes.iter().map(|l| Arc::clone(l.value())).collect();
        if lanes.iter().any(|lane| lane.is_worker_thread()) {
            for lane in &lanes {
                lane.close();
            }
            return;
        }
        for lane in lanes {
            lane.shutdown();
        }
    }

    fn refuse(&self, task: Box<dyn Task>, reason: Error) -> bool {
        self.refused.fetch_add(1, Ordering::Relaxed);
        warn!(reason = %reason, "task rejected");
        task.reject(reason);
        false
    }
}

impl Drop for LaneManager {
    fn drop(&mut self) {
        self.shutdown_all();
    }
}

impl std::fmt::Debug for LaneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaneManager")
            .field("policy", &self.policy)
            .field("capacity", &self.capacity)
            .field("lane_limit", &self.lane_limit)
            .field("lane_count", &self.lanes.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
