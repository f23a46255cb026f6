// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use moverd_core::{FakeClock, Message, Priority};

fn msg() -> Message {
    Message::new("t", "c", Priority::Normal)
}

#[test]
fn tracking_with_zero_providers_is_pending_not_in_progress() {
    let tracker = DeliveryTracker::new(FakeClock::new());
    let id = DeliveryId::new();
    tracker.track(id.clone(), msg(), vec![]);
    assert_eq!(tracker.get(&id).unwrap().status, DispatchStatus::Pending);
}

#[test]
fn status_is_in_progress_until_every_provider_reports() {
    let tracker = DeliveryTracker::new(FakeClock::new());
    let id = DeliveryId::new();
    tracker.track(id.clone(), msg(), vec!["a".to_string(), "b".to_string()]);

    tracker.update(&id, "a", true, None, 10).unwrap();
    assert_eq!(tracker.get(&id).unwrap().status, DispatchStatus::InProgress);

    tracker.update(&id, "b", true, None, 12).unwrap();
    let result = tracker.get(&id).unwrap();
    assert_eq!(result.status, DispatchStatus::Success);
    assert!(result.completed_at.is_some());
}

#[test]
fn partial_status_on_mixed_outcomes() {
    let tracker = DeliveryTracker::new(FakeClock::new());
    let id = DeliveryId::new();
    tracker.track(id.clone(), msg(), vec!["a".to_string(), "b".to_string()]);

    tracker.update(&id, "a", true, None, 5).unwrap();
    tracker.update(&id, "b", false, Some("timeout".to_string()), 5).unwrap();

    let result = tracker.get(&id).unwrap();
    assert_eq!(result.status, DispatchStatus::Partial);
    assert!(result.results["a"].success);
    assert!(!result.results["b"].success);
}

#[test]
fn update_on_unknown_delivery_fails() {
    let tracker = DeliveryTracker::new(FakeClock::new());
    let err = tracker.update(&DeliveryId::new(), "a", true, None, 1).unwrap_err();
    assert!(matches!(err, TrackerError::UnknownDelivery(_)));
}

#[test]
fn cancel_outstanding_marks_unreported_providers_as_failed() {
    let tracker = DeliveryTracker::new(FakeClock::new());
    let id = DeliveryId::new();
    tracker.track(id.clone(), msg(), vec!["a".to_string(), "b".to_string()]);
    tracker.update(&id, "a", true, None, 5).unwrap();

    tracker.cancel_outstanding(&id).unwrap();

    let result = tracker.get(&id).unwrap();
    assert_eq!(result.status, DispatchStatus::Partial);
    assert_eq!(result.results["b"].error_message.as_deref(), Some("cancelled"));
    assert!(result.completed_at.is_some());
}
