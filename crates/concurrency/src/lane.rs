//! Serial lane: one worker thread, one bounded FIFO queue
//!
//! ## Guarantees
//!
//! - Tasks run one at a time, in the order `submit` accepted them
//! - `submit` blocks while the queue is full, except on the lane's own
//!   worker thread where a full queue rejects with [`Error::Saturated`]
//! - A panicking task is caught and logged; the worker keeps going
//! - `shutdown` stops accepting work, drains everything already queued,
//!   then joins the worker; `close` does the same without joining
//! - `retire_if_idle` closes the lane only when nothing is queued or
//!   running, so no task of a retired lane can overlap its successor
//!
//! ## Shutdown Sequence
//!
//! ```text
//! 1. take the sender out of the lane (new submits are rejected)
//! 2. drop it; the worker's receive loop ends once the queue is empty
//!    and every in-flight submitter has released its sender clone
//! 3. join the worker (skipped when called from the worker itself)
//! ```

use linelog_core::{Error, Result};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use tracing::{debug, error, warn};

use crate::task::Task;

type BoxedTask = Box<dyn Task>;

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    executed: AtomicU64,
    rejected: AtomicU64,
    panicked: AtomicU64,
}

impl Counters {
    fn pending(&self) -> u64 {
        self.submitted
            .load(Ordering::SeqCst)
            .saturating_sub(self.executed.load(Ordering::SeqCst))
            .saturating_sub(self.panicked.load(Ordering::SeqCst))
    }
}

/// Point-in-time counters of a lane (or a sum over lanes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneMetrics {
    /// Tasks accepted into a queue
    pub submitted: u64,
    /// Tasks that ran to completion
    pub executed: u64,
    /// Tasks rejected without running
    pub rejected: u64,
    /// Tasks that panicked while running
    pub panicked: u64,
}

impl LaneMetrics {
    /// Accepted tasks that have not finished yet
    pub fn pending(&self) -> u64 {
        self.submitted
            .saturating_sub(self.executed)
            .saturating_sub(self.panicked)
    }

    /// Add another lane's counters to these
    pub fn merge(&mut self, other: &LaneMetrics) {
        self.submitted += other.submitted;
        self.executed += other.executed;
        self.rejected += other.rejected;
        self.panicked += other.panicked;
    }
}

/// A dedicated sequential worker
///
/// # Example
///
/// ```ignore
/// let lane = SerialLane::spawn("errors", 64)?;
/// lane.submit(Job::new(|| println!("ran"), |e| eprintln!("{e}")).boxed());
/// lane.shutdown();
/// ```
pub struct SerialLane {
    name: String,
    sender: Mutex<Option<SyncSender<BoxedTask>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
    counters: Arc<Counters>,
}

impl SerialLane {
    /// Start a lane whose queue holds at most `capacity` pending tasks
    pub fn spawn(name: impl Into<String>, capacity: usize) -> Result<Self> {
        let name = name.into();
        if capacity == 0 {
            return Err(Error::Config("lane queue capacity must be at least 1".into()));
        }

        let (sender, receiver) = mpsc::sync_channel(capacity);
        let counters = Arc::new(Counters::default());

        let worker = {
            let name = name.clone();
            let counters = Arc::clone(&counters);
            thread::Builder::new()
                .name(format!("linelog-{}", name))
                .spawn(move || run_worker(name, receiver, counters))
                .map_err(|e| Error::Internal(format!("failed to spawn lane worker: {}", e)))?
        };
        let worker_id = worker.thread().id();
        debug!(lane = %name, capacity, "lane started");

        Ok(Self {
            name,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            worker_id,
            counters,
        })
    }

    /// Lane name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue `task` behind everything already submitted
    ///
    /// Returns `true` if the task was queued. Otherwise the task's
    /// `reject` has already been called on this thread.
    pub fn submit(&self, task: BoxedTask) -> bool {
        match self.try_submit(task) {
            Ok(()) => true,
            Err((task, reason)) => self.reject(task, reason),
        }
    }

    /// Queue `task`, handing it back with the reason if it cannot be queued
    ///
    /// Unlike [`SerialLane::submit`], a refused task is neither rejected
    /// nor counted, so the caller may retry it elsewhere.
    pub fn try_submit(&self, task: BoxedTask) -> std::result::Result<(), (BoxedTask, Error)> {
        // Counted under the lock so retire_if_idle never misses it
        let sender = {
            let guard = self.sender.lock();
            if guard.is_some() {
                self.counters.submitted.fetch_add(1, Ordering::SeqCst);
            }
            guard.clone()
        };
        let sender = match sender {
            Some(sender) => sender,
            None => return Err((task, Error::Shutdown)),
        };

        let sent = if self.is_worker_thread() {
            // Blocking here would wait on ourselves
            sender.try_send(task).map_err(|e| match e {
                TrySendError::Full(task) => (task, Error::Saturated),
                TrySendError::Disconnected(task) => (task, Error::Shutdown),
            })
        } else {
            sender.send(task).map_err(|e| (e.0, Error::Shutdown))
        };

        if sent.is_err() {
            self.counters.submitted.fetch_sub(1, Ordering::SeqCst);
        }
        sent
    }

    /// Check if the calling thread is this lane's worker
    pub fn is_worker_thread(&self) -> bool {
        thread::current().id() == self.worker_id
    }

    /// Check if the lane has stopped accepting work
    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Stop accepting work, drain the queue and join the worker
    ///
    /// Idempotent. When called from the worker itself the lane is closed
    /// but not joined; the worker exits after its current task.
    pub fn shutdown(&self) {
        self.close();
        if self.is_worker_thread() {
            return;
        }

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                error!(lane = %self.name, "lane worker terminated abnormally");
            }
        }
    }

    /// Stop accepting work without waiting for the worker
    ///
    /// Queued tasks still run; the worker exits once the queue is empty.
    pub fn close(&self) {
        let sender = self.sender.lock().take();
        if sender.is_some() {
            debug!(lane = %self.name, "lane closing");
        }
    }

    /// Close the lane if nothing is queued or running
    ///
    /// Returns `true` if the lane was closed by this call. The worker exits
    /// right away; join it with [`SerialLane::shutdown`].
    pub fn retire_if_idle(&self) -> bool {
        let mut sender = self.sender.lock();
        if sender.is_none() || self.counters.pending() > 0 {
            return false;
        }
        *sender = None;
        debug!(lane = %self.name, "idle lane retired");
        true
    }

    /// Current counters
    pub fn metrics(&self) -> LaneMetrics {
        LaneMetrics {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            executed: self.counters.executed.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            panicked: self.counters.panicked.load(Ordering::Relaxed),
        }
    }

    fn reject(&self, task: BoxedTask, reason: Error) -> bool {
        self.counters.rejected.fetch_add(1, Ordering::Relaxed);
        warn!(lane = %self.name, reason = %reason, "task rejected");
        task.reject(reason);
        false
    }
}

impl Drop for SerialLane {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SerialLane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLane")
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .field("metrics", &self.metrics())
            .finish()
    }
}

fn run_worker(name: String, receiver: Receiver<BoxedTask>, counters: Arc<Counters>) {
    for task in receiver {
        match panic::catch_unwind(AssertUnwindSafe(move || task.run())) {
            Ok(()) => {
                counters.executed.fetch_add(1, Ordering::SeqCst);
            }
            Err(payload) => {
                counters.panicked.fetch_add(1, Ordering::SeqCst);
                error!(
                    lane = %name,
                    panic = %panic_message(payload.as_ref()),
                    "task panicked, worker continues"
                );
            }
        }
    }
    debug!(lane = %name, "lane worker stopped");
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
