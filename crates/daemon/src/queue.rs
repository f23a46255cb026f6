// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded priority queue of `QueuedMessage` (spec.md §4.6).
//!
//! Higher numeric priority dequeues first; within equal priority, earlier
//! `created_at` wins (FIFO tiebreak). Capacity is enforced with a
//! `tokio::sync::Semaphore` so `enqueue` suspends the caller rather than
//! failing when the queue is full, matching spec.md §5's suspension points.

use crate::error::QueueError;
use moverd_core::QueuedMessage;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};

struct Entry {
    priority: i32,
    created_at: std::time::Instant,
    seq: u64,
    item: QueuedMessage,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.created_at == other.created_at && self.seq == other.seq
    }
}
impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    /// `BinaryHeap::pop` returns the greatest element; we want the highest
    /// priority popped first, and within equal priority the earliest
    /// `created_at` (so earlier entries must compare as *greater*).
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.created_at.cmp(&self.created_at))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct State {
    heap: BinaryHeap<Entry>,
}

struct Inner {
    state: Mutex<State>,
    not_empty: Notify,
    capacity: Semaphore,
    closed: AtomicBool,
    seq: AtomicU64,
}

/// Priority + FIFO queue of `QueuedMessage` with bounded capacity (spec.md §4.6).
#[derive(Clone)]
pub struct MessageQueue {
    inner: Arc<Inner>,
}

impl MessageQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State { heap: BinaryHeap::new() }),
                not_empty: Notify::new(),
                capacity: Semaphore::new(capacity),
                closed: AtomicBool::new(false),
                seq: AtomicU64::new(0),
            }),
        }
    }

    /// Blocks until space is available or the queue is shut down.
    pub async fn enqueue(&self, item: QueuedMessage) -> Result<(), QueueError> {
        if self.inner.closed.load(AtomicOrdering::Acquire) {
            return Err(QueueError::QueueClosed);
        }
        let permit = self.inner.capacity.clone().acquire_owned().await.map_err(|_| QueueError::QueueClosed)?;
        if self.inner.closed.load(AtomicOrdering::Acquire) {
            return Err(QueueError::QueueClosed);
        }
        permit.forget();

        let seq = self.inner.seq.fetch_add(1, AtomicOrdering::Relaxed);
        let entry = Entry { priority: item.priority, created_at: item.created_at, seq, item };
        self.inner.state.lock().heap.push(entry);
        self.inner.not_empty.notify_one();
        Ok(())
    }

    /// Blocks until a message arrives or the queue is shut down.
    pub async fn dequeue(&self) -> Result<QueuedMessage, QueueError> {
        loop {
            {
                let mut state = self.inner.state.lock();
                if let Some(entry) = state.heap.pop() {
                    drop(state);
                    self.inner.capacity.add_permits(1);
                    return Ok(entry.item);
                }
                if self.inner.closed.load(AtomicOrdering::Acquire) {
                    return Err(QueueError::QueueClosed);
                }
            }
            self.inner.not_empty.notified().await;
        }
    }

    pub fn size(&self) -> usize {
        self.inner.state.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn is_full(&self) -> bool {
        self.inner.capacity.available_permits() == 0
    }

    /// Wakes every suspended `enqueue`/`dequeue` caller; subsequent calls
    /// fail with `QueueClosed` (enqueue immediately, dequeue once drained).
    pub fn shutdown(&self) {
        self.inner.closed.store(true, AtomicOrdering::Release);
        self.inner.capacity.close();
        self.inner.not_empty.notify_waiters();
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
