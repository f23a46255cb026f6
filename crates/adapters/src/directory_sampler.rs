// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real disk-usage sampler (spec.md §6.5), adapting plain recursive
//! filesystem traversal to the core's `Sampler` trait.
//!
//! Exclusion-pattern parsing is explicitly out of scope (spec.md §1); this
//! sampler treats `exclusion_paths` as exact path prefixes to skip rather
//! than glob patterns, which is the one piece of "exclusion" semantics
//! expressible without a pattern-matching dependency the teacher does not
//! carry.

use async_trait::async_trait;
use moverd_core::{DiskSample, Sampler, SamplerError};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Recursive, blocking-pool directory-size sampler with a short result
/// cache (spec.md §6.5 `cache_duration`).
#[derive(Default)]
pub struct DirectorySampler {
    cache: Mutex<Option<(Instant, DiskSample)>>,
}

impl DirectorySampler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Sampler for DirectorySampler {
    async fn capture_baseline(&self, paths: &[&Path], exclusion_paths: &[&Path]) -> Result<DiskSample, SamplerError> {
        measure(paths, exclusion_paths).await
    }

    async fn sample_usage(
        &self,
        paths: &[&Path],
        exclusion_paths: &[&Path],
        cache_duration: Duration,
    ) -> Result<DiskSample, SamplerError> {
        if let Some((observed_at, sample)) = &*self.cache.lock() {
            if observed_at.elapsed() < cache_duration {
                return Ok(sample.clone());
            }
        }
        let sample = measure(paths, exclusion_paths).await?;
        *self.cache.lock() = Some((Instant::now(), sample.clone()));
        Ok(sample)
    }
}

async fn measure(paths: &[&Path], exclusion_paths: &[&Path]) -> Result<DiskSample, SamplerError> {
    let owned_paths: Vec<PathBuf> = paths.iter().map(|p| p.to_path_buf()).collect();
    let exclusions: Vec<PathBuf> = exclusion_paths.iter().map(|p| p.to_path_buf()).collect();
    let label = owned_paths.first().map(|p| p.display().to_string()).unwrap_or_default();

    let total = tokio::task::spawn_blocking(move || {
        let mut total = 0u64;
        for root in &owned_paths {
            total = total.saturating_add(dir_size(root, &exclusions)?);
        }
        Ok::<u64, SamplerError>(total)
    })
    .await
    .map_err(|err| SamplerError::Unreadable(err.to_string()))??;

    Ok(DiskSample::new(total, label, Instant::now()))
}

fn dir_size(path: &Path, exclusions: &[PathBuf]) -> Result<u64, SamplerError> {
    if exclusions.iter().any(|excluded| path == excluded) {
        return Ok(0);
    }
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(SamplerError::Unreadable(err.to_string())),
    };
    if metadata.is_dir() {
        let mut total = 0u64;
        let entries = std::fs::read_dir(path).map_err(|err| SamplerError::Unreadable(err.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|err| SamplerError::Unreadable(err.to_string()))?;
            total = total.saturating_add(dir_size(&entry.path(), exclusions)?);
        }
        Ok(total)
    } else if metadata.is_symlink() {
        Ok(0)
    } else {
        Ok(metadata.len())
    }
}

#[cfg(test)]
#[path = "directory_sampler_tests.rs"]
mod tests;
