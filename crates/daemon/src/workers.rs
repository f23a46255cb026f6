// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-size worker pool draining a task channel (spec.md §4.7).
//!
//! Each worker is a long-lived tokio task pulling from a shared receiver;
//! `submit` hands back a handle resolved with the task's output. `stop`
//! closes the intake, lets in-flight tasks run to completion, and aborts
//! anything still running past the shutdown bound rather than waiting on a
//! hung provider call indefinitely (spec.md §4.7, §5 cancellation semantics).

use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

/// Upper bound on how long `stop()` waits for in-flight tasks before
/// aborting the worker loops (spec.md §4.7 "a few hundred ms").
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkerPoolError {
    #[error("worker pool is stopped")]
    Stopped,
}

type BoxedTask = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

struct Shared {
    sender: Mutex<Option<mpsc::Sender<BoxedTask>>>,
    started: AtomicBool,
}

/// `submit(task)` returns this; `.await` it to get the task's output.
pub struct TaskHandle<R>(oneshot::Receiver<R>);

impl<R> TaskHandle<R> {
    pub async fn wait(self) -> Result<R, WorkerPoolError> {
        self.0.await.map_err(|_| WorkerPoolError::Stopped)
    }
}

/// Fixed-size set of N workers draining a task channel (spec.md §4.7).
pub struct WorkerPool {
    size: usize,
    shared: Arc<Shared>,
    receiver: Arc<AsyncMutex<mpsc::Receiver<BoxedTask>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn new(size: usize, queue_depth: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_depth.max(1));
        Self {
            size: size.max(1),
            shared: Arc::new(Shared { sender: Mutex::new(Some(tx)), started: AtomicBool::new(false) }),
            receiver: Arc::new(AsyncMutex::new(rx)),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawns the N worker loops. Idempotent: a second call is a no-op.
    pub fn start(&self) {
        if self.shared.started.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut handles = self.handles.lock();
        for _ in 0..self.size {
            let receiver = self.receiver.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    let task = {
                        let mut guard = receiver.lock().await;
                        guard.recv().await
                    };
                    match task {
                        Some(task) => task().await,
                        None => break,
                    }
                }
            }));
        }
    }

    /// Submits a task for execution by the next free worker. Returns a
    /// handle resolved with the task's output once a worker runs it.
    pub async fn submit<F, Fut, R>(&self, f: F) -> Result<TaskHandle<R>, WorkerPoolError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let task: BoxedTask = Box::new(move || {
            Box::pin(async move {
                let result = f().await;
                let _ = tx.send(result);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });

        let sender = self.shared.sender.lock().clone().ok_or(WorkerPoolError::Stopped)?;
        sender.send(task).await.map_err(|_| WorkerPoolError::Stopped)?;
        Ok(TaskHandle(rx))
    }

    /// Signals shutdown and waits for in-flight tasks to complete or be
    /// cancelled, bounded by `SHUTDOWN_GRACE`. Tasks still running past the
    /// bound are aborted so no background task outlives `stop()`.
    pub async fn stop(&self) {
        self.shared.sender.lock().take();
        let handles = std::mem::take(&mut *self.handles.lock());
        let abort_handles: Vec<_> = handles.iter().map(JoinHandle::abort_handle).collect();
        let deadline = tokio::time::sleep(SHUTDOWN_GRACE);
        tokio::pin!(deadline);

        tokio::select! {
            _ = futures_join_all(handles) => {}
            _ = &mut deadline => {
                tracing::warn!("worker pool shutdown exceeded grace period; aborting in-flight tasks");
                for abort_handle in abort_handles {
                    abort_handle.abort();
                }
            }
        }
        self.shared.started.store(false, Ordering::Release);
    }
}

async fn futures_join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}

#[cfg(test)]
#[path = "workers_tests.rs"]
mod tests;
