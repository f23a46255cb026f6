// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Internal topic-based pub/sub (spec.md §4.11).
//!
//! Auxiliary only: the orchestrator's data path is direct dispatch (spec.md
//! §4.10); this bus exists for decoupled cross-component signalling. This
//! crate has no async runtime dependency of its own, so delivery here is
//! synchronous from the caller's point of view — callers that want bus
//! delivery off the calling task run `publish` from a spawned task, which is
//! what "asynchronous" means operationally for this component.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// A topic pattern with at most one `*` wildcard segment (spec.md §4.11).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPattern(String);

impl TopicPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    fn matches(&self, topic: &str) -> bool {
        let pattern_segments: Vec<&str> = self.0.split('.').collect();
        let topic_segments: Vec<&str> = topic.split('.').collect();
        if pattern_segments.len() != topic_segments.len() {
            return false;
        }
        pattern_segments
            .iter()
            .zip(topic_segments.iter())
            .all(|(p, t)| *p == "*" || p == t)
    }
}

/// A failed handler invocation retained for diagnostics (spec.md §4.11).
#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub topic: String,
    pub payload: Value,
    pub reason: String,
}

type Handler = Box<dyn Fn(&str, &Value) + Send + Sync>;

/// Default dead-letter retention, per SPEC_FULL.md §B.1.
pub const DEFAULT_DEAD_LETTER_CAPACITY: usize = 100;

struct Subscription {
    pattern: TopicPattern,
    handler: Handler,
}

/// Topic-based pub/sub with wildcard subscriptions and a bounded
/// dead-letter sink. `Clone` is cheap: the inner state is `Arc`-shared.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

struct Inner {
    subscriptions: Mutex<Vec<Subscription>>,
    dead_letters: Mutex<VecDeque<DeadLetter>>,
    dead_letter_capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_DEAD_LETTER_CAPACITY)
    }
}

impl EventBus {
    pub fn new(dead_letter_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                subscriptions: Mutex::new(Vec::new()),
                dead_letters: Mutex::new(VecDeque::with_capacity(dead_letter_capacity.min(1024))),
                dead_letter_capacity,
            }),
        }
    }

    /// Register a handler for a topic pattern. Returns no handle: this bus
    /// does not support unsubscribing, matching spec.md's contract surface.
    pub fn subscribe(
        &self,
        topic_pattern: impl Into<String>,
        handler: impl Fn(&str, &Value) + Send + Sync + 'static,
    ) {
        self.inner.subscriptions.lock().push(Subscription {
            pattern: TopicPattern::new(topic_pattern),
            handler: Box::new(handler),
        });
    }

    /// Deliver `payload` to every subscription whose pattern matches `topic`.
    /// A handler that panics is caught, logged, and recorded as a dead
    /// letter; it never propagates to the publisher (spec.md §4.11).
    pub fn publish(&self, topic: &str, payload: Value) {
        let subscriptions = self.inner.subscriptions.lock();
        for sub in subscriptions.iter() {
            if !sub.pattern.matches(topic) {
                continue;
            }
            let result = catch_unwind(AssertUnwindSafe(|| (sub.handler)(topic, &payload)));
            if let Err(panic) = result {
                let reason = panic_message(&panic);
                tracing::warn!(topic, reason = %reason, "event bus handler panicked");
                self.record_dead_letter(DeadLetter { topic: topic.to_string(), payload: payload.clone(), reason });
            }
        }
    }

    fn record_dead_letter(&self, letter: DeadLetter) {
        let mut dead_letters = self.inner.dead_letters.lock();
        if dead_letters.len() == self.inner.dead_letter_capacity {
            dead_letters.pop_front();
        }
        dead_letters.push_back(letter);
    }

    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.inner.dead_letters.lock().iter().cloned().collect()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "eventbus_tests.rs"]
mod tests;
