//! Lifecycle tests: shutdown drains, later work is rejected.

use crate::common::*;
use linelog::{Error, LineLogs};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[test]
fn shutdown_drains_pending_operations() {
    let t = TestLogs::new();
    let log = t.log("errors");
    let (tx, rx) = mpsc::channel();

    for i in 0..30 {
        let tx = tx.clone();
        log.append_entry(format!("{}", i), move |err| {
            tx.send(err.is_none()).unwrap();
        });
    }
    drop(tx);
    t.logs.shutdown();

    let outcomes: Vec<bool> = rx.iter().collect();
    assert_eq!(outcomes.len(), 30);
    assert!(outcomes.into_iter().all(|ok| ok));
    assert_eq!(log.read_entries().unwrap().len(), 30);
}

#[test]
fn operations_after_shutdown_are_rejected() {
    let t = TestLogs::new();
    let log = t.log("errors");
    assert!(append_now(&log, "A").is_none());

    t.logs.shutdown();
    assert!(t.logs.is_shut_down());

    let err = append_now(&log, "B").expect("should be rejected");
    assert!(matches!(err, Error::Shutdown));
    assert!(matches!(filter_now(&log, |_| false), Some(Error::Shutdown)));
    assert!(matches!(clear_now(&log), Some(Error::Shutdown)));
    assert!(matches!(log.sync(), Err(Error::Shutdown)));
    assert!(matches!(log.read_entries_ordered(), Err(Error::Shutdown)));

    // Nothing changed on disk; synchronous reads still work
    assert_eq!(log.read_entries().unwrap(), vec!["A"]);
}

#[test]
fn rejection_completes_on_the_calling_thread() {
    let t = TestLogs::new();
    let log = t.log("errors");
    t.logs.shutdown();

    let caller = thread::current().id();
    let (tx, rx) = mpsc::channel();
    log.append_entry("A", move |err| {
        tx.send((thread::current().id(), err)).unwrap();
    });

    // Already delivered by the time append_entry returns
    let (thread_id, err) = rx.try_recv().unwrap();
    assert_eq!(thread_id, caller);
    assert!(matches!(err, Some(Error::Shutdown)));
}

#[test]
fn shutdown_is_idempotent() {
    let t = TestLogs::new();
    let log = t.log("errors");
    log.append("A");

    t.logs.shutdown();
    t.logs.shutdown();
    assert!(t.logs.is_shut_down());
}

#[test]
fn new_handles_after_shutdown_are_rejected_too() {
    let t = TestLogs::new();
    t.logs.shutdown();

    let log = t.log("late");
    assert!(matches!(append_now(&log, "A"), Some(Error::Shutdown)));
    assert!(t.raw("late").is_none());
}

#[test]
fn handles_outlive_the_registry() {
    let dir = TempDir::new().unwrap();
    let logs = LineLogs::open(dir.path()).unwrap();
    let log = logs.log("errors").unwrap();
    drop(logs);

    assert!(append_now(&log, "A").is_none());
    assert_eq!(log.read_entries_ordered().unwrap(), vec!["A"]);
}

#[test]
fn metrics_count_executed_and_rejected() {
    let t = TestLogs::new();
    let log = t.log("errors");

    assert!(append_now(&log, "A").is_none());
    assert!(append_now(&log, "B").is_none());
    t.logs.shutdown();
    assert!(append_now(&log, "C").is_some());

    let metrics = t.logs.metrics();
    assert_eq!(metrics.lanes, 1);
    assert_eq!(metrics.tasks.executed, 2);
    assert_eq!(metrics.tasks.rejected, 1);
    assert_eq!(metrics.tasks.pending(), 0);
}

#[test]
fn shutdown_from_callback_does_not_wait_on_blocked_lanes() {
    let dir = TempDir::new().unwrap();
    let logs = Arc::new(LineLogs::open(dir.path()).unwrap());
    let a = logs.log("a").unwrap();
    let b = logs.log("b").unwrap();
    let (ready_tx, ready_rx) = mpsc::channel::<()>();
    let (a_done_tx, a_done_rx) = mpsc::channel();
    let (b_done_tx, b_done_rx) = mpsc::channel();

    // "a" shuts everything down from its callback once "b" is blocked on it
    let registry = Arc::clone(&logs);
    a.append_entry("first", move |_| {
        ready_rx.recv().unwrap();
        registry.shutdown();
        a_done_tx.send(registry.is_shut_down()).unwrap();
    });

    let a_inner = a.clone();
    b.append_entry("first", move |_| {
        let (read_tx, read_rx) = mpsc::channel();
        a_inner.read_entries_queued(move |result| {
            let _ = read_tx.send(result);
        });
        ready_tx.send(()).unwrap();
        b_done_tx.send(read_rx.recv().unwrap()).unwrap();
    });

    assert!(a_done_rx.recv_timeout(TIMEOUT).unwrap());
    let entries = b_done_rx.recv_timeout(TIMEOUT).unwrap().unwrap();
    assert_eq!(entries, vec!["first"]);

    logs.shutdown();
    assert!(matches!(append_now(&a, "late"), Some(Error::Shutdown)));
}
