// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator: wires the PID watcher, process validator, lifecycle state
//! machine, progress engine, threshold tracker, and dispatcher into one
//! cohesive per-cycle loop (spec.md §4.10).
//!
//! The lifecycle loop and the sampling loop run on separate tasks (spec.md
//! §6.5 "the orchestrator must not hold the lifecycle loop blocked on
//! [the sampler]"), joined by a bounded channel. Everything that mutates
//! per-cycle state (`baseline`, `recent_samples`, `notified_thresholds`,
//! `active_cycle_id`, `latest_progress`) is handled on the single lifecycle
//! task, so sample-append, progress-compute, and threshold-evaluate happen
//! as one atomic section per tick without needing to hold a lock across the
//! dispatcher's await (spec.md §5).

use crate::error::OrchestratorError;
use crate::pidwatch::PidFileWatcher;
use crate::procvalidate::ProcessValidator;
use moverd_core::{
    Clock, CycleId, DiskSample, LifecycleStateMachine, Message, MoverState, NotificationEventKind,
    PidFileEventKind, Priority, ProgressData, ProgressEngine, Provider, Sampler, SampleHistory,
    Smoothing,
};
use moverd_daemon::Dispatcher;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Upper bound on a provider's startup `health_check()` (spec.md §4.10 step 1
/// "a short timeout").
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// In-memory configuration the orchestrator consumes (spec.md §6.3 fields
/// relevant to this crate; CLI/file parsing stays out of scope).
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub pid_file: PathBuf,
    pub pid_check_interval: Duration,
    pub sampling_interval: Duration,
    pub process_timeout: Duration,
    pub thresholds: BTreeSet<u32>,
    pub completion_enabled: bool,
    pub window_size: usize,
    pub smoothing: Smoothing,
}

struct CycleState {
    progress_engine: ProgressEngine,
    recent_samples: SampleHistory,
    baseline: Option<DiskSample>,
    notified_thresholds: BTreeSet<u32>,
    active_cycle_id: Option<CycleId>,
    latest_progress: Option<ProgressData>,
}

impl CycleState {
    fn new(config: &OrchestratorConfig) -> Self {
        // `SimpleMovingAverage` never fails `ProgressEngine::new`'s validation,
        // so this is the only fallback a bad config's smoothing choice needs.
        let progress_engine = match ProgressEngine::new(config.smoothing) {
            Ok(engine) => engine,
            Err(err) => {
                tracing::warn!(error = %err, "invalid smoothing config; falling back to simple moving average");
                match ProgressEngine::new(Smoothing::SimpleMovingAverage) {
                    Ok(engine) => engine,
                    Err(_) => unreachable!("SimpleMovingAverage has no invalid-input case"),
                }
            }
        };
        Self {
            progress_engine,
            recent_samples: SampleHistory::reset(config.window_size),
            baseline: None,
            notified_thresholds: BTreeSet::new(),
            active_cycle_id: None,
            latest_progress: None,
        }
    }
}

struct Inner<C: Clock, S: Sampler> {
    clock: C,
    sampler: S,
    dispatcher: Dispatcher<C>,
    config: OrchestratorConfig,
    monitored_paths: Vec<PathBuf>,
    exclusion_paths: Vec<PathBuf>,
    candidate_providers: Vec<(String, Arc<dyn Provider>)>,
    lifecycle: Mutex<LifecycleStateMachine>,
    cycle: Mutex<CycleState>,
    sampling_task: Mutex<Option<(JoinHandle<()>, CancellationToken)>>,
    sample_tx: mpsc::Sender<DiskSample>,
    sample_rx: tokio::sync::Mutex<mpsc::Receiver<DiskSample>>,
    ready: Notify,
    shutdown: CancellationToken,
}

/// Ties spec.md components 1–10 together for one daemon instance. `start()`
/// runs to completion; callers await `ready_event()` from another task to
/// learn when providers are registered and the lifecycle loop is live.
pub struct Orchestrator<C: Clock, S: Sampler> {
    inner: Arc<Inner<C, S>>,
}

impl<C: Clock, S: Sampler> Clone for Orchestrator<C, S> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<C: Clock, S: Sampler + 'static> Orchestrator<C, S> {
    pub fn new(
        clock: C,
        sampler: S,
        dispatcher: Dispatcher<C>,
        config: OrchestratorConfig,
        monitored_paths: Vec<PathBuf>,
        exclusion_paths: Vec<PathBuf>,
        candidate_providers: Vec<(String, Arc<dyn Provider>)>,
    ) -> Self {
        let cycle = CycleState::new(&config);
        let (sample_tx, sample_rx) = mpsc::channel(32);
        Self {
            inner: Arc::new(Inner {
                clock,
                sampler,
                dispatcher,
                config,
                monitored_paths,
                exclusion_paths,
                candidate_providers,
                lifecycle: Mutex::new(LifecycleStateMachine::new()),
                cycle: Mutex::new(cycle),
                sampling_task: Mutex::new(None),
                sample_tx,
                sample_rx: tokio::sync::Mutex::new(sample_rx),
                ready: Notify::new(),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Signalled once providers are registered and the lifecycle loop is
    /// about to start consuming events (spec.md §4.10 step 4).
    pub async fn ready(&self) {
        self.inner.ready.notified().await;
    }

    pub fn lifecycle_state(&self) -> MoverState {
        self.inner.lifecycle.lock().state()
    }

    pub fn latest_progress(&self) -> Option<ProgressData> {
        self.inner.cycle.lock().latest_progress
    }

    pub fn active_cycle_id(&self) -> Option<CycleId> {
        self.inner.cycle.lock().active_cycle_id.clone()
    }

    /// Idempotent (spec.md §8 "`request_shutdown()` called twice has the
    /// same effect as calling it once" — `CancellationToken::cancel` already
    /// is).
    pub fn request_shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    /// Runs the full start sequence and lifecycle loop (spec.md §4.10).
    /// Returns once `request_shutdown()` has been called and cleanup has
    /// completed, or immediately with `AllProvidersFailed` if no candidate
    /// provider passes validation.
    pub async fn start(&self) -> Result<(), OrchestratorError> {
        let mut passing = Vec::new();
        for (id, provider) in &self.inner.candidate_providers {
            if !provider.validate_config() {
                tracing::warn!(provider = %id, "provider failed validate_config; not loaded");
                continue;
            }
            let health = provider.health_check(HEALTH_CHECK_TIMEOUT).await;
            if health == moverd_core::HealthStatus::Unreachable {
                tracing::warn!(provider = %id, "provider failed startup health check; not loaded");
                continue;
            }
            passing.push((id.clone(), provider.clone()));
        }
        if passing.is_empty() {
            return Err(OrchestratorError::AllProvidersFailed);
        }
        for (id, provider) in passing {
            self.inner.dispatcher.register_provider(id, provider);
        }
        self.inner.dispatcher.start();
        self.inner.ready.notify_waiters();

        let (pid_tx, mut pid_rx) = mpsc::channel(32);
        let watcher = PidFileWatcher::new(&self.inner.config.pid_file);
        let watcher_handle = tokio::spawn(watcher.watch(
            self.inner.clock.clone(),
            self.inner.config.pid_check_interval,
            pid_tx,
            self.inner.shutdown.clone(),
        ));

        // Only this loop ever touches the sample receiver; the mutex exists
        // solely so it can live behind the same `Arc<Inner>` as everything
        // else, not to arbitrate concurrent access.
        let mut sample_rx = self.inner.sample_rx.lock().await;
        loop {
            tokio::select! {
                _ = self.inner.shutdown.cancelled() => break,
                maybe_event = pid_rx.recv() => {
                    match maybe_event {
                        Some(event) => self.handle_pid_event(event).await,
                        None => break,
                    }
                }
                maybe_sample = sample_rx.recv() => {
                    if let Some(sample) = maybe_sample {
                        self.handle_sample(sample).await;
                    }
                }
            }
        }
        drop(sample_rx);

        self.cancel_sampling_task().await;
        let _ = watcher_handle.await;
        self.inner.dispatcher.stop().await;
        Ok(())
    }

    async fn handle_pid_event(&self, event: moverd_core::PidFileEvent) {
        let pid_running = match event.pid {
            Some(pid) => ProcessValidator::validate_with_timeout(pid, self.inner.config.process_timeout).await,
            None => false,
        };

        let transition = {
            let mut lifecycle = self.inner.lifecycle.lock();
            lifecycle.apply_pid_event(event.kind, event.pid, pid_running, self.inner.clock.now())
        };

        let Some(transition) = transition else { return };
        match transition.new_state {
            MoverState::Started => self.handle_started().await,
            MoverState::Completed => self.handle_completed().await,
            MoverState::Monitoring | MoverState::Waiting => {}
        }

        if event.kind == PidFileEventKind::Deleted {
            tracing::debug!("pid file deleted");
        }
    }

    async fn handle_started(&self) {
        let already_running = self.inner.cycle.lock().baseline.is_some();
        if already_running {
            return; // duplicate STARTED without an intervening COMPLETED (spec.md §8 S6)
        }

        let path_refs: Vec<&Path> = self.inner.monitored_paths.iter().map(PathBuf::as_path).collect();
        let exclusion_refs: Vec<&Path> = self.inner.exclusion_paths.iter().map(PathBuf::as_path).collect();
        let baseline = match self.inner.sampler.capture_baseline(&path_refs, &exclusion_refs).await {
            Ok(sample) => sample,
            Err(err) => {
                tracing::warn!(error = %err, "failed to capture baseline; remaining in STARTED");
                return;
            }
        };

        let cycle_id = CycleId::new();
        {
            let mut cycle = self.inner.cycle.lock();
            cycle.baseline = Some(baseline);
            cycle.notified_thresholds.clear();
            cycle.recent_samples = SampleHistory::reset(self.inner.config.window_size);
            cycle.active_cycle_id = Some(cycle_id.clone());
            cycle.latest_progress = None;
        }

        if let Err(err) = self.inner.lifecycle.lock().capture_baseline(self.inner.clock.now()) {
            tracing::error!(error = %err, "lifecycle transition STARTED -> MONITORING rejected");
        }

        self.spawn_sampling_task(cycle_id.clone());
        self.dispatch_notification(NotificationEventKind::Started, cycle_id, 0.0).await;
    }

    async fn handle_completed(&self) {
        let had_baseline = self.inner.cycle.lock().baseline.is_some();
        if !had_baseline {
            return;
        }

        self.cancel_sampling_task().await;

        let (cycle_id, terminal) = {
            let mut cycle = self.inner.cycle.lock();
            let cycle_id = cycle.active_cycle_id.clone();
            let terminal = cycle.latest_progress.unwrap_or_else(|| {
                terminal_progress(cycle.baseline.as_ref().map(|b| b.bytes_used).unwrap_or(0))
            });
            cycle.latest_progress = Some(terminal);
            (cycle_id, terminal)
        };

        if self.inner.config.completion_enabled {
            if let Some(cycle_id) = cycle_id.clone() {
                self.dispatch_notification(NotificationEventKind::Completed, cycle_id, terminal.percent).await;
            }
        }

        {
            let mut cycle = self.inner.cycle.lock();
            cycle.baseline = None;
            cycle.notified_thresholds.clear();
            cycle.recent_samples = SampleHistory::reset(self.inner.config.window_size);
            cycle.active_cycle_id = None;
            cycle.latest_progress = None;
        }

        if let Some(event) = self.inner.lifecycle.lock().advance_to_waiting(self.inner.clock.now()) {
            tracing::debug!(message = %event.message, "cycle reset to WAITING");
        }
    }

    async fn handle_sample(&self, sample: DiskSample) {
        let crossed = {
            let mut cycle = self.inner.cycle.lock();
            let Some(baseline) = cycle.baseline.clone() else { return };
            let CycleState { progress_engine, recent_samples, .. } = &mut *cycle;
            let progress = progress_engine.compute(baseline.bytes_used, &sample, recent_samples);
            cycle.latest_progress = Some(progress);

            let crossed = moverd_core::evaluate_threshold(
                progress.percent,
                &self.inner.config.thresholds,
                &cycle.notified_thresholds,
            );
            if let Some(t) = crossed {
                cycle.notified_thresholds.insert(t);
            }
            crossed.map(|t| (t, progress, cycle.active_cycle_id.clone()))
        };

        if let Some((threshold, progress, Some(cycle_id))) = crossed {
            tracing::info!(%threshold, percent = progress.percent, "threshold crossed");
            self.dispatch_notification(NotificationEventKind::Progress, cycle_id, progress.percent).await;
        }
    }

    async fn dispatch_notification(&self, kind: NotificationEventKind, cycle_id: CycleId, percent: f64) {
        let (title, content) = match kind {
            NotificationEventKind::Started => ("Mover started".to_string(), "mover cycle started".to_string()),
            NotificationEventKind::Progress => {
                ("Mover progress".to_string(), format!("{percent:.1}% complete"))
            }
            NotificationEventKind::Completed => ("Mover completed".to_string(), "mover cycle completed".to_string()),
            NotificationEventKind::Failed => ("Mover failed".to_string(), "mover cycle failed".to_string()),
        };
        let message = Message::new(title, content, Priority::Normal);
        let notification =
            moverd_core::NotificationData::new(message, kind, cycle_id.to_string());
        let providers = self.inner.dispatcher.registered_providers();
        if let Err(err) = self.inner.dispatcher.dispatch(notification, &providers, Priority::Normal).await {
            tracing::warn!(error = %err, ?kind, "failed to dispatch notification");
        }
    }

    fn spawn_sampling_task(&self, cycle_id: CycleId) {
        let cancel = self.inner.shutdown.child_token();
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(inner.config.sampling_interval) => {}
                }
                let path_refs: Vec<&Path> = inner.monitored_paths.iter().map(PathBuf::as_path).collect();
                let exclusion_refs: Vec<&Path> = inner.exclusion_paths.iter().map(PathBuf::as_path).collect();
                match inner.sampler.sample_usage(&path_refs, &exclusion_refs, inner.config.sampling_interval).await {
                    Ok(sample) => {
                        if inner.sample_tx.send(sample).await.is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, cycle_id = %cycle_id, "sample acquisition failed; continuing");
                    }
                }
            }
        });
        *self.inner.sampling_task.lock() = Some((handle, cancel));
    }

    async fn cancel_sampling_task(&self) {
        let existing = self.inner.sampling_task.lock().take();
        if let Some((handle, cancel)) = existing {
            cancel.cancel();
            let _ = handle.await;
        }
    }
}

fn terminal_progress(baseline_bytes: u64) -> ProgressData {
    ProgressData {
        percent: 100.0,
        moved_bytes: baseline_bytes,
        remaining_bytes: 0,
        total_bytes: baseline_bytes,
        rate_bytes_per_second: 0.0,
        etc: Some(Duration::ZERO),
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
