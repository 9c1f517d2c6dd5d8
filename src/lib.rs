//! # linelog
//!
//! Append-only, line-oriented log files with serialized mutation.
//!
//! Each log is identified by a category and stored as one flat file in the
//! storage directory, one entry per line, with no trailing newline. Every
//! mutation of a log (append, filter, clear) is queued to a single worker
//! and runs strictly in submission order, so concurrent callers never race
//! a read-modify-write. Results come back through completion callbacks.
//! Plain reads go straight to disk.
//!
//! ## Quick Start
//!
//! ```ignore
//! use linelog::prelude::*;
//!
//! let logs = LineLogs::open("./logs")?;
//! let errors = logs.log("errors")?;
//!
//! errors.append_entry("A", |_| {});
//! errors.append_entry("B", |_| {});
//! errors.filter_entries(|entry| entry != "A", |_| {});
//! errors.append_entry("C", |err| assert!(err.is_none()));
//!
//! errors.sync()?;
//! assert_eq!(errors.read_entries()?, vec!["B", "C"]);
//!
//! logs.shutdown();
//! ```
//!
//! ## Ordering
//!
//! - Mutations on one log run in FIFO order, whichever thread submits them
//! - With the default per-category lanes, different logs never wait on
//!   each other; [`LineLogsBuilder::shared_lane`] serializes them all
//! - [`LineLog::read_entries`] is not ordered with pending mutations;
//!   [`LineLog::read_entries_ordered`] and [`LineLog::sync`] are

#![warn(missing_docs)]

mod config;
mod log;
mod logs;
mod ops;

pub mod logging;
pub mod prelude;

pub use config::{
    LogConfig, ENV_DIR, ENV_LANES, ENV_LANE_LIMIT, ENV_QUEUE_CAPACITY, ENV_SYNC,
};
pub use log::LineLog;
pub use logs::{LineLogs, LineLogsBuilder, LogMetrics};
pub use ops::{Completion, Predicate, ReadCompletion};

// Re-export the lower layers' public vocabulary
pub use linelog_concurrency::{LaneMetrics, LanePolicy};
pub use linelog_core::{Category, Error, Result};
pub use linelog_storage::SyncMode;
