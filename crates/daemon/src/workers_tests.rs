// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering as AtOrd};
use std::time::Duration;

#[tokio::test]
async fn submitted_task_runs_and_resolves_handle() {
    let pool = WorkerPool::new(2, 8);
    pool.start();

    let handle = pool.submit(|| async { 21 + 21 }).await.unwrap();
    assert_eq!(handle.wait().await.unwrap(), 42);

    pool.stop().await;
}

#[tokio::test]
async fn multiple_workers_run_tasks_concurrently() {
    let pool = WorkerPool::new(4, 8);
    pool.start();

    let inflight = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let max_inflight = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let inflight = inflight.clone();
        let max_inflight = max_inflight.clone();
        let handle = pool
            .submit(move || async move {
                let now = inflight.fetch_add(1, AtOrd::SeqCst) + 1;
                max_inflight.fetch_max(now, AtOrd::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                inflight.fetch_sub(1, AtOrd::SeqCst);
            })
            .await
            .unwrap();
        handles.push(handle);
    }
    for handle in handles {
        handle.wait().await.unwrap();
    }

    assert!(max_inflight.load(AtOrd::SeqCst) > 1, "workers should overlap in time");
    pool.stop().await;
}

#[tokio::test]
async fn start_is_idempotent() {
    let pool = WorkerPool::new(2, 8);
    pool.start();
    pool.start();

    let handle = pool.submit(|| async { 1 }).await.unwrap();
    assert_eq!(handle.wait().await.unwrap(), 1);
    pool.stop().await;
}

#[tokio::test]
async fn stop_aborts_tasks_that_exceed_the_shutdown_grace() {
    let pool = WorkerPool::new(1, 8);
    pool.start();

    let _handle = pool.submit(|| async { tokio::time::sleep(Duration::from_secs(10)).await }).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let started = tokio::time::Instant::now();
    pool.stop().await;
    assert!(started.elapsed() < Duration::from_secs(2), "stop() must not wait on a hung task indefinitely");
}

#[tokio::test]
async fn submit_after_stop_fails() {
    let pool = WorkerPool::new(1, 8);
    pool.start();
    pool.stop().await;

    let err = pool.submit(|| async { 1 }).await.unwrap_err();
    assert_eq!(err, WorkerPoolError::Stopped);
}
