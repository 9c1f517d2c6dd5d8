//! Concurrency layer for linelog
//!
//! Every log is mutated by exactly one sequential worker:
//! - Task: unit of work with a run path and a reject path
//! - SerialLane: one dedicated thread draining a bounded FIFO queue
//! - LaneManager: lanes keyed by category, or one shared lane; idle
//!   lanes are retired once too many exist
//!
//! Tasks on a lane run one at a time in submission order. A task that
//! cannot be queued is rejected, never dropped.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod lane;
pub mod manager;
pub mod task;

pub use lane::{panic_message, LaneMetrics, SerialLane};
pub use manager::{LaneManager, LanePolicy, DEFAULT_LANE_LIMIT, DEFAULT_QUEUE_CAPACITY};
pub use task::{Job, Task};
