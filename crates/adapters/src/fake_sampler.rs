// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake sampler for other crates' tests (spec.md §6.5): a fixed baseline
//! plus a scripted queue of subsequent `sample_usage` results, so tests can
//! drive the progress engine's sample stream deterministically.

use async_trait::async_trait;
use moverd_core::{DiskSample, Sampler, SamplerError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

pub struct FakeSampler {
    baseline: DiskSample,
    queue: Mutex<VecDeque<Result<DiskSample, SamplerError>>>,
}

impl FakeSampler {
    pub fn new(baseline: DiskSample) -> Self {
        Self { baseline, queue: Mutex::new(VecDeque::new()) }
    }

    pub fn push_sample(&self, sample: DiskSample) {
        self.queue.lock().push_back(Ok(sample));
    }

    pub fn push_error(&self, err: SamplerError) {
        self.queue.lock().push_back(Err(err));
    }
}

#[async_trait]
impl Sampler for FakeSampler {
    async fn capture_baseline(&self, _paths: &[&Path], _exclusion_paths: &[&Path]) -> Result<DiskSample, SamplerError> {
        Ok(self.baseline.clone())
    }

    /// Pops the next scripted result. Once the queue runs dry, repeats the
    /// baseline rather than erroring, so a sampling loop that outlives the
    /// test's scripted samples doesn't spuriously fail.
    async fn sample_usage(
        &self,
        _paths: &[&Path],
        _exclusion_paths: &[&Path],
        _cache_duration: Duration,
    ) -> Result<DiskSample, SamplerError> {
        self.queue.lock().pop_front().unwrap_or_else(|| Ok(self.baseline.clone()))
    }
}

#[cfg(test)]
#[path = "fake_sampler_tests.rs"]
mod tests;
