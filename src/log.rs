//! Line log handle.
//!
//! A [`LineLog`] is one category's append-only, line-oriented file.
//!
//! - Mutations (`append_entry`, `filter_entries`, `clear_entries`) are
//!   queued on the category's lane and run one at a time, in submission
//!   order, whatever thread submitted them. Their outcome arrives through a
//!   completion callback; they never return an error to the caller.
//! - `read_entries` reads the file directly, right now. It is not ordered
//!   with queued mutations: a read racing a pending append may or may not
//!   see it. Wait for the append's callback, or use
//!   [`LineLog::read_entries_ordered`], to read your own writes.
//!
//! # Example
//!
//! ```ignore
//! use linelog::prelude::*;
//!
//! let logs = LineLogs::open("./logs")?;
//! let errors = logs.log("errors")?;
//!
//! errors.append_entry("disk full", |err| {
//!     if let Some(err) = err {
//!         eprintln!("could not record error: {err}");
//!     }
//! });
//! errors.filter_entries(|entry| !entry.starts_with("debug"), |_| {});
//! errors.sync()?;
//!
//! let entries = errors.read_entries()?;
//! ```

use crate::ops::{LogOp, Mutation, ReadOp};
use linelog_concurrency::{Job, LaneManager, Task};
use linelog_core::{Category, Error, Result};
use linelog_storage::LineFile;
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;

/// One category's log.
///
/// Cheap to clone; clones share the registry's lanes. Get one from
/// [`LineLogs::log`](crate::LineLogs::log).
#[derive(Clone)]
pub struct LineLog {
    category: Category,
    file: LineFile,
    lanes: Arc<LaneManager>,
}

impl LineLog {
    pub(crate) fn new(category: Category, file: LineFile, lanes: Arc<LaneManager>) -> Self {
        Self {
            category,
            file,
            lanes,
        }
    }

    /// Category of this log
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    // =========================================================================
    // Synchronous read
    // =========================================================================

    /// Read every entry, in order, straight from disk.
    ///
    /// A log that was never written, or was cleared, has no entries.
    /// Not ordered with queued mutations.
    pub fn read_entries(&self) -> Result<Vec<String>> {
        self.file.read_entries()
    }

    // =========================================================================
    // Queued mutations
    // =========================================================================

    /// Queue an append of `entry`.
    ///
    /// The file is created if needed. `entry` must be non-empty and must not
    /// contain a newline; otherwise `on_complete` receives
    /// [`Error::InvalidEntry`]. `on_complete` runs on the worker after the
    /// write.
    ///
    /// May block while the lane's queue is full.
    pub fn append_entry<F>(&self, entry: impl Into<String>, on_complete: F)
    where
        F: FnOnce(Option<Error>) + Send + 'static,
    {
        self.mutate(Mutation::Append(entry.into()), Box::new(on_complete));
    }

    /// Queue an append without a completion handler.
    ///
    /// Failures are traced (invalid entries at `debug`, everything else at
    /// `warn`) and otherwise lost.
    pub fn append(&self, entry: impl Into<String>) {
        self.append_entry(entry, |_| {});
    }

    /// Queue a rewrite that keeps only the entries matching `predicate`.
    ///
    /// Order is preserved. The file is created if needed. Bytes that are
    /// not valid UTF-8 reach the predicate as U+FFFD and are stored that
    /// way. A panicking predicate leaves the file untouched and reports
    /// [`Error::Internal`].
    pub fn filter_entries<P, F>(&self, predicate: P, on_complete: F)
    where
        P: FnMut(&str) -> bool + Send + 'static,
        F: FnOnce(Option<Error>) + Send + 'static,
    {
        self.mutate(Mutation::Filter(Box::new(predicate)), Box::new(on_complete));
    }

    /// Queue deletion of the backing file.
    ///
    /// Deleting a log that has no file succeeds.
    pub fn clear_entries<F>(&self, on_complete: F)
    where
        F: FnOnce(Option<Error>) + Send + 'static,
    {
        self.mutate(Mutation::Clear, Box::new(on_complete));
    }

    // =========================================================================
    // Ordered access
    // =========================================================================

    /// Queue a read behind every mutation submitted so far.
    ///
    /// `on_complete` receives the entries as they are once those mutations
    /// have run.
    pub fn read_entries_queued<F>(&self, on_complete: F)
    where
        F: FnOnce(Result<Vec<String>>) + Send + 'static,
    {
        self.submit(Box::new(ReadOp::new(self.file.clone(), Box::new(on_complete))));
    }

    /// Read behind every mutation submitted so far, blocking until done.
    ///
    /// Fails with [`Error::WouldDeadlock`] when called from this log's own
    /// worker (inside a completion callback).
    pub fn read_entries_ordered(&self) -> Result<Vec<String>> {
        self.ensure_not_worker()?;
        let (tx, rx) = mpsc::channel();
        self.read_entries_queued(move |result| {
            let _ = tx.send(result);
        });
        rx.recv()
            .map_err(|_| Error::Internal("queued read dropped without completing".into()))?
    }

    /// Block until every operation submitted to this log's lane so far has
    /// completed.
    ///
    /// Fails with [`Error::WouldDeadlock`] when called from this log's own
    /// worker.
    pub fn sync(&self) -> Result<()> {
        self.ensure_not_worker()?;
        let (tx, rx) = mpsc::channel();
        let on_reject = tx.clone();
        let barrier = Job::new(
            move || {
                let _ = tx.send(None);
            },
            move |reason| {
                let _ = on_reject.send(Some(reason));
            },
        );
        self.submit(barrier.boxed());

        match rx.recv() {
            Ok(None) => Ok(()),
            Ok(Some(reason)) => Err(reason),
            Err(_) => Err(Error::Internal("barrier dropped without completing".into())),
        }
    }

    fn mutate(&self, mutation: Mutation, on_complete: crate::ops::Completion) {
        let op = LogOp::new(self.category.clone(), self.file.clone(), mutation, on_complete);
        self.submit(Box::new(op));
    }

    fn submit(&self, task: Box<dyn Task>) {
        self.lanes.submit(self.category.as_str(), task);
    }

    fn ensure_not_worker(&self) -> Result<()> {
        if self.lanes.is_worker_thread(self.category.as_str()) {
            return Err(Error::WouldDeadlock);
        }
        Ok(())
    }
}

impl std::fmt::Debug for LineLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineLog")
            .field("category", &self.category)
            .field("path", &self.file.path())
            .finish()
    }
}
