// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sampler contract for measuring monitored-path disk usage (spec.md §6.5).

use crate::model::DiskSample;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SamplerError {
    #[error("path {0} could not be read")]
    Unreadable(String),

    #[error("sampling was cancelled")]
    Cancelled,
}

/// Disk-usage source (spec.md §6.5). Both methods are cancellable and may
/// take seconds; the orchestrator calls them from the separate sampling
/// task, never from the lifecycle loop.
#[async_trait]
pub trait Sampler: Send + Sync {
    /// Capture the `bytes_used` denominator at the start of a cycle.
    async fn capture_baseline(
        &self,
        paths: &[&Path],
        exclusion_paths: &[&Path],
    ) -> Result<DiskSample, SamplerError>;

    /// Measure current `bytes_used`, honouring an implementation-defined
    /// `cache_duration` to avoid re-scanning large trees every tick.
    async fn sample_usage(
        &self,
        paths: &[&Path],
        exclusion_paths: &[&Path],
        cache_duration: Duration,
    ) -> Result<DiskSample, SamplerError>;
}

#[cfg(test)]
#[path = "sampler_tests.rs"]
mod tests;
