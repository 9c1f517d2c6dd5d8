//! Ordering tests: FIFO execution, ordered reads, barriers.

use crate::common::*;
use linelog::Error;
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn errors_scenario() {
    let t = TestLogs::new();
    let log = t.log("errors");

    log.append_entry("A", |_| {});
    log.append_entry("B", |_| {});
    log.filter_entries(|entry| entry != "A", |_| {});
    let (done, rx) = completion();
    log.append_entry("C", done);

    assert!(wait(&rx).is_none());
    assert_eq!(log.read_entries().unwrap(), vec!["B", "C"]);
}

#[test]
fn completions_fire_in_submission_order() {
    let t = TestLogs::new();
    let log = t.log("errors");
    let (tx, rx) = mpsc::channel();

    for i in 0..20 {
        let tx = tx.clone();
        log.append_entry(format!("{}", i), move |err| {
            assert!(err.is_none());
            tx.send(i).unwrap();
        });
    }
    drop(tx);

    let order: Vec<i32> = rx.iter().take(20).collect();
    assert_eq!(order, (0..20).collect::<Vec<_>>());
}

#[test]
fn completion_runs_after_write() {
    let t = TestLogs::new();
    let log = t.log("errors");
    let reader = log.clone();
    let (tx, rx) = mpsc::channel();

    log.append_entry("A", move |err| {
        assert!(err.is_none());
        tx.send(reader.read_entries().unwrap()).unwrap();
    });

    assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), vec!["A"]);
}

#[test]
fn concurrent_submitters_keep_per_thread_order() {
    const THREADS: usize = 4;
    const PER_THREAD: usize = 25;

    let t = TestLogs::new();
    let log = t.log("shared");
    let start = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let log = log.clone();
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                for n in 0..PER_THREAD {
                    log.append(format!("{}:{}", id, n));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    log.sync().unwrap();

    let entries = log.read_entries().unwrap();
    assert_eq!(entries.len(), THREADS * PER_THREAD);
    for id in 0..THREADS {
        let prefix = format!("{}:", id);
        let mine: Vec<usize> = entries
            .iter()
            .filter_map(|e| e.strip_prefix(&prefix))
            .map(|n| n.parse().unwrap())
            .collect();
        assert_eq!(mine, (0..PER_THREAD).collect::<Vec<_>>());
    }
}

#[test]
fn ordered_read_sees_earlier_queued_writes() {
    let t = TestLogs::new();
    let log = t.log("errors");

    log.append("A");
    log.append("B");
    log.filter_entries(|e| e == "B", |_| {});
    log.append("C");

    assert_eq!(log.read_entries_ordered().unwrap(), vec!["B", "C"]);
}

#[test]
fn queued_read_delivers_to_callback() {
    let t = TestLogs::new();
    let log = t.log("errors");
    let (tx, rx) = mpsc::channel();

    log.append("A");
    log.read_entries_queued(move |result| {
        tx.send(result).unwrap();
    });

    let entries = rx.recv_timeout(TIMEOUT).unwrap().unwrap();
    assert_eq!(entries, vec!["A"]);
}

#[test]
fn sync_waits_for_pending_mutations() {
    let t = TestLogs::new();
    let log = t.log("errors");

    for i in 0..10 {
        log.append(format!("{}", i));
    }
    log.sync().unwrap();

    assert_eq!(log.read_entries().unwrap().len(), 10);
}

#[test]
fn blocking_calls_from_own_worker_would_deadlock() {
    let t = TestLogs::new();
    let log = t.log("errors");
    let inner = log.clone();
    let (tx, rx) = mpsc::channel();

    log.append_entry("A", move |_| {
        let sync = inner.sync();
        let read = inner.read_entries_ordered();
        tx.send((sync, read)).unwrap();
    });

    let (sync, read) = rx.recv_timeout(TIMEOUT).unwrap();
    assert!(matches!(sync, Err(Error::WouldDeadlock)));
    assert!(matches!(read, Err(Error::WouldDeadlock)));
}

#[test]
fn mutation_submitted_from_callback_runs_next() {
    let t = TestLogs::new();
    let log = t.log("errors");
    let inner = log.clone();
    let (done, rx) = completion();

    log.append_entry("A", move |_| {
        inner.append_entry("B", done);
    });

    assert!(wait(&rx).is_none());
    assert_eq!(log.read_entries().unwrap(), vec!["A", "B"]);
}
