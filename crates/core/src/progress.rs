// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress engine: baseline + sample stream -> percent/rate/ETC
//! (spec.md §4.4).

use crate::error::InvalidInput;
use crate::model::{DiskSample, ProgressData};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How the rate series (not the byte series — spec.md §4.4) is smoothed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Smoothing {
    /// Slope between the oldest and newest usable sample in the window.
    SimpleMovingAverage,
    /// Pairwise rates between consecutive usable samples, weighted toward
    /// the most recent pair.
    WeightedMovingAverage,
    /// Exponentially-weighted running average of the windowed rate.
    ExponentialSmoothing { alpha: f64 },
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::SimpleMovingAverage
    }
}

/// Bounded, timestamp-ordered history of `(bytes_used, observed_at)` pairs
/// for one monitored cycle (spec.md §4.4 "bounded history").
pub struct SampleHistory {
    window_size: usize,
    samples: VecDeque<(u64, Instant)>,
}

impl SampleHistory {
    pub fn new(window_size: usize) -> Result<Self, InvalidInput> {
        if window_size == 0 {
            return Err(InvalidInput::ZeroWindow);
        }
        Ok(Self { window_size, samples: VecDeque::with_capacity(window_size) })
    }

    /// Like `new`, but clamps a zero `window_size` up to 1 instead of
    /// rejecting it. For callers that validated `window_size` once at
    /// construction time and need an infallible way to start a fresh
    /// history on every subsequent cycle (spec.md §4.10 COMPLETED handling
    /// clears `recent_samples`).
    pub fn reset(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self { window_size, samples: VecDeque::with_capacity(window_size) }
    }

    /// Record a sample, evicting the oldest once the window is full.
    pub fn push(&mut self, bytes_used: u64, observed_at: Instant) {
        if self.samples.len() == self.window_size {
            self.samples.pop_front();
        }
        self.samples.push_back((bytes_used, observed_at));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Rate between the last two raw samples, ignoring smoothing
    /// (SPEC_FULL.md §B.3 — diagnostic, not the canonical output).
    pub fn instantaneous_rate(&self) -> f64 {
        let len = self.samples.len();
        if len < 2 {
            return 0.0;
        }
        let (prev_bytes, prev_at) = self.samples[len - 2];
        let (last_bytes, last_at) = self.samples[len - 1];
        let dt = last_at.saturating_duration_since(prev_at).as_secs_f64();
        if dt <= 0.0 {
            return 0.0;
        }
        // bytes_used falls as the mover transfers data away, so the
        // transfer rate is the *decrease*, not the raw delta.
        (prev_bytes as f64 - last_bytes as f64) / dt
    }

    /// The monotonic-timestamp subsequence used for rate calculation:
    /// samples with an equal-or-decreasing timestamp relative to the last
    /// kept sample are skipped (spec.md §4.4).
    fn usable(&self) -> Vec<(u64, Instant)> {
        let mut out: Vec<(u64, Instant)> = Vec::with_capacity(self.samples.len());
        for &(bytes, at) in &self.samples {
            if out.last().is_none_or(|&(_, last_at)| at > last_at) {
                out.push((bytes, at));
            }
        }
        out
    }
}

/// Computes `ProgressData` from a baseline and sample stream, applying the
/// configured smoothing to the rate series across calls (spec.md §4.4).
pub struct ProgressEngine {
    smoothing: Smoothing,
    smoothed_rate: f64,
}

impl ProgressEngine {
    pub fn new(smoothing: Smoothing) -> Result<Self, InvalidInput> {
        if let Smoothing::ExponentialSmoothing { alpha } = smoothing {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(InvalidInput::AlphaOutOfRange(alpha.to_string()));
            }
        }
        Ok(Self { smoothing, smoothed_rate: 0.0 })
    }

    /// Compute progress for `current`, recording it into `history` first.
    pub fn compute(
        &mut self,
        baseline: u64,
        current: &DiskSample,
        history: &mut SampleHistory,
    ) -> ProgressData {
        history.push(current.bytes_used, current.observed_at);

        if baseline == 0 {
            self.smoothed_rate = 0.0;
            return ProgressData {
                percent: 100.0,
                moved_bytes: 0,
                remaining_bytes: 0,
                total_bytes: 0,
                rate_bytes_per_second: 0.0,
                etc: Some(Duration::ZERO),
            };
        }

        // max(0, baseline - bytes_used); also covers "source grew mid-move".
        let moved = baseline.saturating_sub(current.bytes_used);
        let percent = ((moved as f64 / baseline as f64) * 100.0).clamp(0.0, 100.0);

        if percent >= 100.0 {
            self.smoothed_rate = 0.0;
            return ProgressData {
                percent: 100.0,
                moved_bytes: baseline,
                remaining_bytes: 0,
                total_bytes: baseline,
                rate_bytes_per_second: 0.0,
                etc: Some(Duration::ZERO),
            };
        }

        let remaining = baseline.saturating_sub(moved);
        let rate = self.rate(history);
        let etc = if rate > 0.0 && remaining > 0 {
            Some(Duration::from_secs_f64(remaining as f64 / rate))
        } else {
            None
        };

        ProgressData {
            percent,
            moved_bytes: moved,
            remaining_bytes: remaining,
            total_bytes: baseline,
            rate_bytes_per_second: rate,
            etc,
        }
    }

    fn rate(&mut self, history: &SampleHistory) -> f64 {
        let usable = history.usable();
        if usable.len() < 2 {
            self.smoothed_rate = 0.0;
            return 0.0;
        }

        // Rate is never negative (spec.md §3 `rate_bytes_per_second >= 0`):
        // clamp the raw windowed figure once, before it can feed into the
        // exponential running average below.
        let windowed = match self.smoothing {
            Smoothing::SimpleMovingAverage | Smoothing::ExponentialSmoothing { .. } => {
                match (usable.first().copied(), usable.last().copied()) {
                    (Some(first), Some(last)) => Self::slope(first, last),
                    _ => 0.0,
                }
            }
            Smoothing::WeightedMovingAverage => Self::weighted_slope(&usable),
        }
        .max(0.0);

        match self.smoothing {
            Smoothing::ExponentialSmoothing { alpha } => {
                self.smoothed_rate = if self.smoothed_rate == 0.0 {
                    windowed
                } else {
                    alpha * windowed + (1.0 - alpha) * self.smoothed_rate
                };
                self.smoothed_rate
            }
            _ => windowed,
        }
    }

    fn slope(first: (u64, Instant), last: (u64, Instant)) -> f64 {
        let dt = last.1.saturating_duration_since(first.1).as_secs_f64();
        if dt <= 0.0 {
            return 0.0;
        }
        // `first`/`last` are (bytes_used, observed_at); bytes_used decreases
        // as the mover works, so the transfer rate is first-minus-last.
        ((first.0 as f64) - (last.0 as f64)) / dt
    }

    fn weighted_slope(usable: &[(u64, Instant)]) -> f64 {
        let mut total_weighted = 0.0;
        let mut total_weight = 0.0;
        for (i, pair) in usable.windows(2).enumerate() {
            let rate = Self::slope(pair[0], pair[1]);
            let weight = (i + 1) as f64;
            total_weighted += rate * weight;
            total_weight += weight;
        }
        if total_weight == 0.0 {
            0.0
        } else {
            (total_weighted / total_weight).max(0.0)
        }
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
