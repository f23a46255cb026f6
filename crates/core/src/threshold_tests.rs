// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn set(values: &[u32]) -> BTreeSet<u32> {
    values.iter().copied().collect()
}

#[test]
fn returns_lowest_unfired_threshold() {
    let thresholds = set(&[25, 50, 75]);
    let notified = set(&[25]);
    assert_eq!(evaluate(60.0, &thresholds, &notified), Some(50));
}

#[test]
fn returns_none_when_no_threshold_crossed() {
    let thresholds = set(&[50]);
    let notified = set(&[]);
    assert_eq!(evaluate(10.0, &thresholds, &notified), None);
}

#[test]
fn returns_none_when_all_crossed_thresholds_already_notified() {
    let thresholds = set(&[25, 50]);
    let notified = set(&[25, 50]);
    assert_eq!(evaluate(90.0, &thresholds, &notified), None);
}

#[test]
fn does_not_retrigger_on_later_samples_s2() {
    // Mirrors spec scenario S2: thresholds {25, 50}, baseline 100.
    let thresholds = set(&[25, 50]);
    let mut notified = BTreeSet::new();

    // t=1, percent=30 -> crosses 25.
    let hit = evaluate(30.0, &thresholds, &notified);
    assert_eq!(hit, Some(25));
    notified.insert(hit.unwrap());

    // t=2, percent=50 -> crosses 50.
    let hit = evaluate(50.0, &thresholds, &notified);
    assert_eq!(hit, Some(50));
    notified.insert(hit.unwrap());

    // t=3,4 percent=55,70 -> no further notification.
    assert_eq!(evaluate(55.0, &thresholds, &notified), None);
    assert_eq!(evaluate(70.0, &thresholds, &notified), None);
}

#[test]
fn exact_boundary_value_counts_as_crossed() {
    let thresholds = set(&[50]);
    let notified = set(&[]);
    assert_eq!(evaluate(50.0, &thresholds, &notified), Some(50));
}

#[test]
fn empty_threshold_set_never_fires() {
    let thresholds = BTreeSet::new();
    let notified = BTreeSet::new();
    assert_eq!(evaluate(100.0, &thresholds, &notified), None);
}
