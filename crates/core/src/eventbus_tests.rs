// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex as StdMutex;
use serde_json::json;

#[test]
fn delivers_to_exact_topic_match() {
    let bus = EventBus::default();
    let received = Arc::new(StdMutex::new(Vec::new()));
    let received_clone = received.clone();
    bus.subscribe("process.detected", move |topic, payload| {
        received_clone.lock().push((topic.to_string(), payload.clone()));
    });

    bus.publish("process.detected", json!({"pid": 42}));

    let got = received.lock();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].0, "process.detected");
}

#[test]
fn wildcard_segment_matches_any_single_segment() {
    let bus = EventBus::default();
    let count = Arc::new(StdMutex::new(0));
    let count_clone = count.clone();
    bus.subscribe("error.*", move |_, _| {
        *count_clone.lock() += 1;
    });

    bus.publish("error.escalated", json!({}));
    bus.publish("error.recovered", json!({}));
    bus.publish("process.detected", json!({}));

    assert_eq!(*count.lock(), 2);
}

#[test]
fn wildcard_does_not_match_different_segment_count() {
    let bus = EventBus::default();
    let count = Arc::new(StdMutex::new(0));
    let count_clone = count.clone();
    bus.subscribe("error.*", move |_, _| {
        *count_clone.lock() += 1;
    });

    bus.publish("error.escalated.retry", json!({}));
    assert_eq!(*count.lock(), 0);
}

#[test]
fn panicking_handler_is_caught_and_recorded_as_dead_letter() {
    let bus = EventBus::default();
    bus.subscribe("job.failed", |_, _| panic!("boom"));

    bus.publish("job.failed", json!({"job_id": "abc"}));

    let letters = bus.dead_letters();
    assert_eq!(letters.len(), 1);
    assert_eq!(letters[0].topic, "job.failed");
    assert_eq!(letters[0].reason, "boom");
}

#[test]
fn one_handler_panicking_does_not_stop_delivery_to_others() {
    let bus = EventBus::default();
    let received = Arc::new(StdMutex::new(false));
    let received_clone = received.clone();
    bus.subscribe("job.failed", |_, _| panic!("boom"));
    bus.subscribe("job.failed", move |_, _| {
        *received_clone.lock() = true;
    });

    bus.publish("job.failed", json!({}));
    assert!(*received.lock());
}

#[test]
fn dead_letter_sink_is_bounded() {
    let bus = EventBus::new(2);
    bus.subscribe("job.failed", |_, _| panic!("boom"));

    for _ in 0..5 {
        bus.publish("job.failed", json!({}));
    }

    assert_eq!(bus.dead_letters().len(), 2);
}
