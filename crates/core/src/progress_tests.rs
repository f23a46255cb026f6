// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::model::DiskSample;
use std::time::Duration;

fn sample(bytes_used: u64, at: Instant) -> DiskSample {
    DiskSample { bytes_used, path: "/tmp/dest".to_string(), observed_at: at }
}

#[test]
fn zero_window_is_rejected() {
    assert_eq!(SampleHistory::new(0).unwrap_err(), InvalidInput::ZeroWindow);
}

#[test]
fn reset_clamps_a_zero_window_instead_of_failing() {
    let history = SampleHistory::reset(0);
    assert_eq!(history.len(), 0);
}

#[test]
fn alpha_out_of_range_is_rejected() {
    let err = ProgressEngine::new(Smoothing::ExponentialSmoothing { alpha: 1.5 }).unwrap_err();
    assert!(matches!(err, InvalidInput::AlphaOutOfRange(_)));
}

#[test]
fn zero_baseline_reports_complete() {
    let mut engine = ProgressEngine::new(Smoothing::SimpleMovingAverage).unwrap();
    let mut history = SampleHistory::new(10).unwrap();
    let data = engine.compute(0, &sample(0, Instant::now()), &mut history);
    assert_eq!(data.percent, 100.0);
    assert_eq!(data.remaining_bytes, 0);
    assert_eq!(data.rate_bytes_per_second, 0.0);
    assert_eq!(data.etc, Some(Duration::ZERO));
}

#[test]
fn single_sample_reports_zero_rate_and_no_etc() {
    let mut engine = ProgressEngine::new(Smoothing::SimpleMovingAverage).unwrap();
    let mut history = SampleHistory::new(10).unwrap();
    let now = Instant::now();
    let data = engine.compute(1000, &sample(900, now), &mut history);
    assert_eq!(data.moved_bytes, 100);
    assert_eq!(data.rate_bytes_per_second, 0.0);
    assert_eq!(data.etc, None);
}

#[test]
fn simple_moving_average_uses_oldest_and_newest_sample() {
    let mut engine = ProgressEngine::new(Smoothing::SimpleMovingAverage).unwrap();
    let mut history = SampleHistory::new(10).unwrap();
    let t0 = Instant::now();

    engine.compute(1000, &sample(1000, t0), &mut history);
    engine.compute(1000, &sample(900, t0 + Duration::from_secs(1)), &mut history);
    let data = engine.compute(1000, &sample(800, t0 + Duration::from_secs(2)), &mut history);

    // (1000 - 800) bytes over 2 seconds = 100 bytes/sec.
    assert!((data.rate_bytes_per_second - 100.0).abs() < 1e-6);
    assert_eq!(data.moved_bytes, 200);
    assert_eq!(data.remaining_bytes, 800);
    assert_eq!(data.etc, Some(Duration::from_secs(8)));
}

#[test]
fn completion_clamps_percent_and_clears_rate() {
    let mut engine = ProgressEngine::new(Smoothing::SimpleMovingAverage).unwrap();
    let mut history = SampleHistory::new(10).unwrap();
    let t0 = Instant::now();

    engine.compute(1000, &sample(1000, t0), &mut history);
    let data = engine.compute(1000, &sample(0, t0 + Duration::from_secs(1)), &mut history);

    assert_eq!(data.percent, 100.0);
    assert_eq!(data.moved_bytes, 1000);
    assert_eq!(data.remaining_bytes, 0);
    assert_eq!(data.rate_bytes_per_second, 0.0);
    assert_eq!(data.etc, Some(Duration::ZERO));
}

#[test]
fn source_growing_mid_move_clamps_moved_to_zero() {
    let mut engine = ProgressEngine::new(Smoothing::SimpleMovingAverage).unwrap();
    let mut history = SampleHistory::new(10).unwrap();
    let now = Instant::now();

    let data = engine.compute(1000, &sample(1200, now), &mut history);
    assert_eq!(data.moved_bytes, 0);
    assert_eq!(data.percent, 0.0);
}

#[test]
fn window_evicts_oldest_sample() {
    let mut history = SampleHistory::new(2).unwrap();
    let t0 = Instant::now();
    history.push(100, t0);
    history.push(90, t0 + Duration::from_secs(1));
    history.push(80, t0 + Duration::from_secs(2));
    assert_eq!(history.len(), 2);
}

#[test]
fn non_monotonic_timestamps_are_skipped() {
    let mut engine = ProgressEngine::new(Smoothing::SimpleMovingAverage).unwrap();
    let mut history = SampleHistory::new(10).unwrap();
    let t0 = Instant::now();

    engine.compute(1000, &sample(1000, t0), &mut history);
    // Out-of-order / duplicate timestamp sample should not skew the rate.
    engine.compute(1000, &sample(950, t0), &mut history);
    let data = engine.compute(1000, &sample(900, t0 + Duration::from_secs(1)), &mut history);

    assert!((data.rate_bytes_per_second - 100.0).abs() < 1e-6);
}

#[test]
fn exponential_smoothing_persists_across_calls() {
    let mut engine = ProgressEngine::new(Smoothing::ExponentialSmoothing { alpha: 0.5 }).unwrap();
    let mut history = SampleHistory::new(10).unwrap();
    let t0 = Instant::now();

    engine.compute(10_000, &sample(10_000, t0), &mut history);
    let first = engine.compute(10_000, &sample(9_900, t0 + Duration::from_secs(1)), &mut history);
    let second = engine.compute(10_000, &sample(9_700, t0 + Duration::from_secs(2)), &mut history);

    // Second reading blends the new windowed rate with the first smoothed value,
    // so it should land strictly between the two raw windowed rates.
    assert!(first.rate_bytes_per_second > 0.0);
    assert!(second.rate_bytes_per_second > 0.0);
}

#[test]
fn instantaneous_rate_uses_only_the_last_two_raw_samples() {
    let mut history = SampleHistory::new(10).unwrap();
    let t0 = Instant::now();
    history.push(1000, t0);
    history.push(900, t0 + Duration::from_secs(1));
    history.push(700, t0 + Duration::from_secs(2));

    assert!((history.instantaneous_rate() - 200.0).abs() < 1e-6);
}
