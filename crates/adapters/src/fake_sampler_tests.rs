// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Instant;

#[tokio::test]
async fn capture_baseline_returns_configured_baseline() {
    let baseline = DiskSample::new(1000, "/mnt/source", Instant::now());
    let sampler = FakeSampler::new(baseline.clone());

    let observed = sampler.capture_baseline(&[], &[]).await.unwrap();
    assert_eq!(observed.bytes_used, baseline.bytes_used);
}

#[tokio::test]
async fn sample_usage_drains_the_scripted_queue_in_order() {
    let baseline = DiskSample::new(1000, "/mnt/source", Instant::now());
    let sampler = FakeSampler::new(baseline.clone());
    sampler.push_sample(DiskSample::new(900, "/mnt/source", Instant::now()));
    sampler.push_sample(DiskSample::new(500, "/mnt/source", Instant::now()));

    let first = sampler.sample_usage(&[], &[], Duration::from_secs(1)).await.unwrap();
    let second = sampler.sample_usage(&[], &[], Duration::from_secs(1)).await.unwrap();
    let third = sampler.sample_usage(&[], &[], Duration::from_secs(1)).await.unwrap();

    assert_eq!(first.bytes_used, 900);
    assert_eq!(second.bytes_used, 500);
    assert_eq!(third.bytes_used, baseline.bytes_used, "queue exhaustion falls back to baseline");
}

#[tokio::test]
async fn sample_usage_surfaces_scripted_errors() {
    let sampler = FakeSampler::new(DiskSample::new(1000, "/mnt/source", Instant::now()));
    sampler.push_error(SamplerError::Cancelled);

    let err = sampler.sample_usage(&[], &[], Duration::from_secs(1)).await.unwrap_err();
    assert_eq!(err, SamplerError::Cancelled);
}
