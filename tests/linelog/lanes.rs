//! Lane policy tests.

use crate::common::*;
use linelog::LanePolicy;
use std::sync::mpsc;
use std::thread;

/// Name of the worker thread that runs `log`'s operations.
fn worker_name(log: &linelog::LineLog) -> String {
    let (tx, rx) = mpsc::channel();
    log.read_entries_queued(move |_| {
        let name = thread::current().name().unwrap_or_default().to_string();
        tx.send(name).unwrap();
    });
    rx.recv_timeout(TIMEOUT).unwrap()
}

#[test]
fn per_category_lanes_are_distinct() {
    let t = TestLogs::new();
    assert_eq!(t.logs.config().lane_policy, LanePolicy::PerCategory);

    let errors = t.log("errors");
    let events = t.log("events");

    assert_eq!(worker_name(&errors), "linelog-errors");
    assert_eq!(worker_name(&events), "linelog-events");
    assert_eq!(t.logs.metrics().lanes, 2);
}

#[test]
fn shared_policy_uses_one_lane() {
    let t = TestLogs::with(|b| b.shared_lane());

    let errors = t.log("errors");
    let events = t.log("events");

    assert_eq!(worker_name(&errors), worker_name(&events));
    assert_eq!(t.logs.metrics().lanes, 1);
}

#[test]
fn shared_lane_orders_across_categories() {
    let t = TestLogs::with(|b| b.shared_lane());
    let errors = t.log("errors");
    let events = t.log("events");
    let (tx, rx) = mpsc::channel();

    for i in 0..10 {
        let (log, tag) = if i % 2 == 0 { (&errors, "errors") } else { (&events, "events") };
        let tx = tx.clone();
        log.append_entry(format!("{}", i), move |_| {
            tx.send((tag, i)).unwrap();
        });
    }
    drop(tx);

    let order: Vec<i32> = rx.iter().map(|(_, i)| i).collect();
    assert_eq!(order, (0..10).collect::<Vec<_>>());
}

#[test]
fn slow_category_does_not_block_another() {
    let t = TestLogs::new();
    let slow = t.log("slow");
    let fast = t.log("fast");
    let (release_tx, release_rx) = mpsc::channel::<()>();

    // Park the slow lane until released
    slow.append_entry("hold", move |_| {
        let _ = release_rx.recv_timeout(TIMEOUT);
    });

    assert!(append_now(&fast, "quick").is_none());
    assert_eq!(fast.read_entries().unwrap(), vec!["quick"]);

    release_tx.send(()).unwrap();
    slow.sync().unwrap();
}

#[test]
fn small_queue_applies_backpressure_without_losing_work() {
    let t = TestLogs::with(|b| b.queue_capacity(1));
    let log = t.log("tight");

    for i in 0..40 {
        log.append(format!("{}", i));
    }
    log.sync().unwrap();

    assert_eq!(log.read_entries().unwrap().len(), 40);
}

#[test]
fn short_lived_categories_do_not_accumulate_lanes() {
    let t = TestLogs::with(|b| b.lane_limit(8));

    for day in 0..500 {
        let log = t.log(&format!("day-{:03}", day));
        assert!(append_now(&log, "opened").is_none());
        assert!(clear_now(&log).is_none());
        assert!(t.logs.metrics().lanes <= 8);
    }

    assert!(t.logs.categories().unwrap().is_empty());
    t.logs.shutdown();
    assert_eq!(t.logs.metrics().tasks.executed, 1000);
}

#[test]
fn retired_category_keeps_its_entries_and_order() {
    let t = TestLogs::with(|b| b.lane_limit(1));
    let errors = t.log("errors");
    let events = t.log("events");

    // Each switch of category retires the other's lane
    for i in 0..20 {
        let log = if i % 2 == 0 { &errors } else { &events };
        assert!(append_now(log, &format!("{}", i)).is_none());
    }

    let expected: Vec<String> = (0..20).step_by(2).map(|i| i.to_string()).collect();
    assert_eq!(errors.read_entries_ordered().unwrap(), expected);
    assert_eq!(events.read_entries().unwrap().len(), 10);
}
