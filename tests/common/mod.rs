//! Shared test utilities for linelog integration tests.

#![allow(dead_code)]

use linelog::{Error, LineLog, LineLogs, LineLogsBuilder};
use std::fs;
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;
use tempfile::TempDir;

/// Generous upper bound for anything a worker has to do in a test.
pub const TIMEOUT: Duration = Duration::from_secs(10);

/// Registry over a temporary directory that lives as long as the harness.
pub struct TestLogs {
    pub logs: LineLogs,
    dir: TempDir,
}

impl TestLogs {
    /// Registry with default settings.
    pub fn new() -> Self {
        Self::with(|builder| builder)
    }

    /// Registry with settings adjusted by `configure`.
    pub fn with(configure: impl FnOnce(LineLogsBuilder) -> LineLogsBuilder) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let logs = configure(LineLogs::builder().path(dir.path()))
            .open()
            .expect("Failed to open line logs");
        Self { logs, dir }
    }

    pub fn log(&self, category: &str) -> LineLog {
        self.logs.log(category).expect("valid category")
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Raw bytes of a category's file, `None` if it does not exist.
    pub fn raw(&self, category: &str) -> Option<String> {
        fs::read_to_string(self.dir.path().join(category)).ok()
    }

    /// Write a category's file behind the registry's back.
    pub fn seed(&self, category: &str, content: &str) {
        fs::write(self.dir.path().join(category), content).expect("Failed to seed file");
    }
}

/// Completion callback paired with the receiver that observes it.
pub fn completion() -> (
    impl FnOnce(Option<Error>) + Send + 'static,
    Receiver<Option<Error>>,
) {
    let (tx, rx) = mpsc::channel();
    let callback = move |err: Option<Error>| {
        let _ = tx.send(err);
    };
    (callback, rx)
}

/// Wait for a completion, panicking if it never arrives.
pub fn wait(rx: &Receiver<Option<Error>>) -> Option<Error> {
    rx.recv_timeout(TIMEOUT).expect("completion never called")
}

/// Append and wait for the outcome.
pub fn append_now(log: &LineLog, entry: &str) -> Option<Error> {
    let (done, rx) = completion();
    log.append_entry(entry, done);
    wait(&rx)
}

/// Filter and wait for the outcome.
pub fn filter_now<P>(log: &LineLog, predicate: P) -> Option<Error>
where
    P: FnMut(&str) -> bool + Send + 'static,
{
    let (done, rx) = completion();
    log.filter_entries(predicate, done);
    wait(&rx)
}

/// Clear and wait for the outcome.
pub fn clear_now(log: &LineLog) -> Option<Error> {
    let (done, rx) = completion();
    log.clear_entries(done);
    wait(&rx)
}
