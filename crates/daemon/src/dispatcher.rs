// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Async dispatcher: public façade tying the queue, worker pool, delivery
//! tracker, and retry/circuit-breaker policy together (spec.md §4.9).
//!
//! Registered providers are guarded and mutated only outside a dispatch's
//! fan-out (spec.md §5). The per-provider fan-out itself is unordered; the
//! dispatcher never holds a lock across a provider call.

use crate::error::{DispatchError, QueueError};
use crate::queue::MessageQueue;
use crate::retry::{CircuitBreaker, CircuitDecision, RetryPolicy};
use crate::tracker::DeliveryTracker;
use crate::workers::WorkerPool;
use moverd_core::{Clock, DeliveryId, DispatchResult, NotificationData, Priority, Provider, ProviderError, QueuedMessage};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Default bound on how long `dispatch()` waits for a terminal status
/// before returning the current (possibly in-progress) result (spec.md §4.9
/// step 6).
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

struct Inner<C: Clock> {
    clock: C,
    providers: RwLock<HashMap<String, Arc<dyn Provider>>>,
    queue: MessageQueue,
    pool: WorkerPool,
    tracker: DeliveryTracker<C>,
    circuit_breaker: CircuitBreaker<C>,
    retry_policy: RetryPolicy,
    dry_run: bool,
    dispatch_timeout: Duration,
    completions: Mutex<HashMap<DeliveryId, Arc<Notify>>>,
    started: AtomicBool,
    drain_handle: Mutex<Option<JoinHandle<()>>>,
}

/// Public façade for outbound notification delivery (spec.md §4.9).
pub struct Dispatcher<C: Clock> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(clock: C, worker_count: usize, queue_capacity: usize, retry_policy: RetryPolicy, dry_run: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                circuit_breaker: CircuitBreaker::new(
                    clock.clone(),
                    retry_policy.failure_threshold,
                    retry_policy.recovery_timeout,
                ),
                tracker: DeliveryTracker::new(clock.clone()),
                queue: MessageQueue::new(queue_capacity),
                pool: WorkerPool::new(worker_count, queue_capacity),
                clock,
                providers: RwLock::new(HashMap::new()),
                retry_policy,
                dry_run,
                dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
                completions: Mutex::new(HashMap::new()),
                started: AtomicBool::new(false),
                drain_handle: Mutex::new(None),
            }),
        }
    }

    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        Arc::get_mut(&mut self.inner)
            .map(|inner| inner.dispatch_timeout = timeout)
            .unwrap_or_else(|| tracing::warn!("dispatch_timeout set after Dispatcher was cloned; ignored"));
        self
    }

    pub fn register_provider(&self, identifier: impl Into<String>, provider: Arc<dyn Provider>) {
        self.inner.providers.write().insert(identifier.into(), provider);
    }

    pub fn unregister_provider(&self, identifier: &str) {
        self.inner.providers.write().remove(identifier);
    }

    pub fn registered_providers(&self) -> Vec<String> {
        self.inner.providers.read().keys().cloned().collect()
    }

    /// Spawns the worker pool and the internal queue-drain loop. Idempotent.
    pub fn start(&self) {
        if self.inner.started.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.pool.start();

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            loop {
                match inner.queue.dequeue().await {
                    Ok(item) => {
                        let task_inner = inner.clone();
                        if let Err(err) = inner.pool.submit(move || fan_out(task_inner, item)).await {
                            tracing::warn!(?err, "failed to submit dispatch task to worker pool");
                        }
                    }
                    Err(QueueError::QueueClosed) => break,
                }
            }
        });
        *self.inner.drain_handle.lock() = Some(handle);
    }

    /// Signals shutdown: closes the queue (stopping the drain loop), stops
    /// the worker pool within its bound, and releases providers.
    pub async fn stop(&self) {
        self.inner.queue.shutdown();
        if let Some(handle) = self.inner.drain_handle.lock().take() {
            let _ = handle.await;
        }
        self.inner.pool.stop().await;
        self.inner.providers.write().clear();
        self.inner.started.store(false, Ordering::Release);
    }

    /// Enqueues `notification` for delivery to `providers` and awaits a
    /// terminal `DispatchResult`, bounded by the dispatch timeout.
    pub async fn dispatch(
        &self,
        notification: NotificationData,
        providers: &[String],
        priority: Priority,
    ) -> Result<DispatchResult, DispatchError> {
        let registered = self.inner.providers.read();
        for id in providers {
            if !registered.contains_key(id) {
                return Err(DispatchError::UnknownProvider(id.clone()));
            }
        }
        drop(registered);

        let delivery_id = DeliveryId::new();
        let message_snapshot = notification.message.clone();
        self.inner.tracker.track(delivery_id.clone(), message_snapshot.clone(), providers.to_vec());

        let notify = Arc::new(Notify::new());
        self.inner.completions.lock().insert(delivery_id.clone(), notify.clone());

        let item = QueuedMessage {
            notification,
            priority: priority.rank(),
            providers: providers.iter().cloned().collect::<BTreeSet<_>>(),
            delivery_id: delivery_id.clone(),
            created_at: self.inner.clock.now(),
        };

        // Register the waiter *before* enqueueing: a worker can drain the
        // queue and call `notify_waiters()` as soon as the item is visible,
        // so creating the `Notified` future only after `enqueue().await`
        // would risk missing a notification that fires in between (tokio's
        // "no missed wakeup" guarantee only covers notifications that occur
        // after the future itself is created).
        let notified = notify.notified();
        self.inner.queue.enqueue(item).await?;

        tokio::select! {
            _ = notified => {}
            _ = tokio::time::sleep(self.inner.dispatch_timeout) => {
                let _ = self.inner.tracker.cancel_outstanding(&delivery_id);
            }
        }
        self.inner.completions.lock().remove(&delivery_id);

        // `get` can only miss here if the tracker entry was never inserted,
        // which cannot happen on this path; fall back to a conservative
        // synthetic result rather than panicking (no unwrap/expect in
        // library code).
        Ok(self.inner.tracker.get(&delivery_id).unwrap_or_else(|| DispatchResult {
            delivery_id: delivery_id.clone(),
            status: moverd_core::DispatchStatus::Failed,
            message: message_snapshot,
            providers: providers.to_vec(),
            results: HashMap::new(),
            created_at: self.inner.clock.now(),
            completed_at: Some(self.inner.clock.now()),
        }))
    }
}

/// Runs on a worker-pool task: fans a `QueuedMessage` out to every targeted
/// provider concurrently, updating the Delivery Tracker per result, then
/// wakes the waiting `dispatch()` caller (spec.md §4.9 steps 4-5).
async fn fan_out<C: Clock>(inner: Arc<Inner<C>>, item: QueuedMessage) {
    let delivery_id = item.delivery_id.clone();
    let providers: Vec<String> = item.providers.iter().cloned().collect();

    let calls = providers.into_iter().map(|provider_id| {
        let inner = inner.clone();
        let notification = item.notification.clone();
        async move {
            let outcome = call_provider(&inner, &provider_id, &notification).await;
            match outcome {
                Ok(result) => {
                    let _ = inner.tracker.update(&delivery_id, &provider_id, true, None, result.delivery_time_ms);
                }
                Err(err) => {
                    let _ = inner.tracker.update(&delivery_id, &provider_id, false, Some(err.to_string()), 0);
                }
            }
        }
    });
    futures_util::future::join_all(calls).await;

    if let Some(notify) = inner.completions.lock().get(&delivery_id).cloned() {
        notify.notify_waiters();
    }
}

/// One provider call wrapped by the circuit breaker and retry policy
/// (spec.md §4.12). Honors `dry_run` (spec.md §6.3): records the outcome as
/// a synthetic success without invoking the provider.
async fn call_provider<C: Clock>(
    inner: &Arc<Inner<C>>,
    provider_id: &str,
    notification: &NotificationData,
) -> Result<moverd_core::ProviderResult, ProviderError> {
    if inner.dry_run {
        return Ok(moverd_core::ProviderResult {
            provider_identifier: provider_id.to_string(),
            success: true,
            error_message: None,
            delivery_time_ms: 0,
        });
    }

    let provider = match inner.providers.read().get(provider_id).cloned() {
        Some(provider) => provider,
        None => return Err(ProviderError::Permanent("provider no longer registered".to_string())),
    };

    let max_attempts = inner.retry_policy.max_attempts.max(1);
    let mut last_err = None;
    for attempt in 1..=max_attempts {
        if inner.circuit_breaker.guard(provider_id) == CircuitDecision::Reject {
            return Err(ProviderError::CircuitOpen);
        }

        let call = tokio::time::timeout(
            inner.retry_policy.timeout_per_attempt,
            provider.send_notification(notification),
        )
        .await;

        match call {
            Ok(Ok(result)) => {
                inner.circuit_breaker.record_success(provider_id);
                return Ok(result);
            }
            Ok(Err(err)) => {
                if !err.is_retryable() {
                    inner.circuit_breaker.record_failure(provider_id);
                    return Err(err);
                }
                inner.circuit_breaker.record_failure(provider_id);
                last_err = Some(err.clone());
                if attempt < max_attempts {
                    // Delay before the *upcoming* attempt (attempt + 1), per
                    // spec.md §4.12's 1-indexed "delay before attempt k".
                    let delay = err
                        .retry_after()
                        .unwrap_or_else(|| inner.retry_policy.backoff_for_attempt(attempt + 1));
                    tokio::time::sleep(delay).await;
                }
            }
            Err(_elapsed) => {
                inner.circuit_breaker.record_failure(provider_id);
                last_err = Some(ProviderError::Transient("timed out".to_string()));
                if attempt < max_attempts {
                    tokio::time::sleep(inner.retry_policy.backoff_for_attempt(attempt + 1)).await;
                }
            }
        }
    }

    Err(last_err.unwrap_or_else(|| ProviderError::Transient("exhausted retries".to_string())))
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
