// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Threshold tracker for progress notifications (spec.md §4.5).
//!
//! Pure function over caller-owned sets: this module holds no state of its
//! own. `already_notified` is owned by the orchestrator per cycle and reset
//! when a new `STARTED` begins.

use std::collections::BTreeSet;

/// Returns the single lowest configured threshold crossed by
/// `current_percent` that has not already fired, if any.
pub fn evaluate(
    current_percent: f64,
    configured_thresholds: &BTreeSet<u32>,
    already_notified: &BTreeSet<u32>,
) -> Option<u32> {
    configured_thresholds
        .iter()
        .find(|&&t| f64::from(t) <= current_percent && !already_notified.contains(&t))
        .copied()
}

#[cfg(test)]
#[path = "threshold_tests.rs"]
mod tests;
