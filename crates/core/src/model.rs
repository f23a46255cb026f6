// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core value types shared across the monitoring daemon (spec.md §3).
//!
//! These are plain, immutable values. Components that own mutable state
//! (the lifecycle state machine, the delivery tracker, the circuit breaker
//! table) live in their own modules and hand these values across their
//! public boundary.

use crate::provider::ProviderResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

crate::define_id! {
    /// Unique identifier for one dispatch, generated when the Async
    /// Dispatcher accepts a `dispatch()` call (spec.md §3
    /// `QueuedMessage.delivery_id`, §4.9 step 2).
    pub struct DeliveryId("dlv-");
}

crate::define_id! {
    /// Correlation id for one mover cycle (spec.md §4.10 "Correlation IDs"),
    /// assigned fresh on every `STARTED` and carried by every
    /// `NotificationData` dispatched during that cycle.
    pub struct CycleId("cyc-");
}

/// The three observable transitions of a watched PID file (spec.md §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PidFileEventKind {
    Created,
    Modified,
    Deleted,
}

crate::simple_display! {
    PidFileEventKind {
        Created => "created",
        Modified => "modified",
        Deleted => "deleted",
    }
}

/// An observed change to the watched PID file.
///
/// Invariant: `kind == Deleted` implies `pid.is_none()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PidFileEvent {
    pub kind: PidFileEventKind,
    pub pid: Option<i32>,
    pub observed_at: Instant,
}

impl PidFileEvent {
    pub fn new(kind: PidFileEventKind, pid: Option<i32>, observed_at: Instant) -> Self {
        debug_assert!(
            !(kind == PidFileEventKind::Deleted && pid.is_some()),
            "deleted PID-file event must not carry a pid"
        );
        Self { kind, pid, observed_at }
    }
}

/// A single filesystem-size observation for a set of monitored paths
/// (spec.md §3). Not assumed monotonic: the mover can shrink the source
/// path's `bytes_used` as it copies data away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskSample {
    pub bytes_used: u64,
    pub path: String,
    pub observed_at: Instant,
}

impl DiskSample {
    pub fn new(bytes_used: u64, path: impl Into<String>, observed_at: Instant) -> Self {
        Self { bytes_used, path: path.into(), observed_at }
    }
}

/// Units a smoothed transfer rate can be rendered in. Display-only: the
/// engine's canonical output stays in bytes/sec (spec.md §4.4); this is a
/// pure formatting helper (SPEC_FULL.md §B.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateUnit {
    BytesPerSecond,
    KilobytesPerSecond,
    MegabytesPerSecond,
    GigabytesPerSecond,
}

impl RateUnit {
    pub fn divisor(self) -> f64 {
        match self {
            RateUnit::BytesPerSecond => 1.0,
            RateUnit::KilobytesPerSecond => 1024.0,
            RateUnit::MegabytesPerSecond => 1024.0 * 1024.0,
            RateUnit::GigabytesPerSecond => 1024.0 * 1024.0 * 1024.0,
        }
    }
}

/// Computed progress for one sample (spec.md §3).
///
/// Invariant: `moved_bytes + remaining_bytes == total_bytes`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressData {
    pub percent: f64,
    pub moved_bytes: u64,
    pub remaining_bytes: u64,
    pub total_bytes: u64,
    pub rate_bytes_per_second: f64,
    pub etc: Option<Duration>,
}

impl ProgressData {
    /// Render the smoothed rate in an arbitrary display unit
    /// (SPEC_FULL.md §B.2 — presentation helper, not part of the invariant).
    pub fn rate_in(&self, unit: RateUnit) -> f64 {
        self.rate_bytes_per_second / unit.divisor()
    }
}

/// Notification priority (spec.md §3). Higher variants dequeue first in
/// the Message Queue (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Priority {
    /// Integer rank used as the queue's ordering key; higher dequeues first.
    pub fn rank(self) -> i32 {
        match self {
            Priority::Low => 0,
            Priority::Normal => 1,
            Priority::High => 2,
            Priority::Urgent => 3,
        }
    }
}

/// The payload carried into the dispatcher (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub metadata: HashMap<String, String>,
}

impl Message {
    pub fn new(title: impl Into<String>, content: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            priority,
            tags: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// What a notification is reporting on (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEventKind {
    Started,
    Progress,
    Completed,
    Failed,
}

crate::simple_display! {
    NotificationEventKind {
        Started => "started",
        Progress => "progress",
        Completed => "completed",
        Failed => "failed",
    }
}

/// The dispatcher's input type: a `Message` tagged with the cycle it
/// belongs to (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationData {
    pub message: Message,
    pub event_type: NotificationEventKind,
    pub correlation_id: String,
}

impl NotificationData {
    pub fn new(message: Message, event_type: NotificationEventKind, correlation_id: impl Into<String>) -> Self {
        Self { message, event_type, correlation_id: correlation_id.into() }
    }
}

/// Owned by the Message Queue from enqueue until a worker dequeues it
/// (spec.md §3). `delivery_id` is unique across the dispatcher's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedMessage {
    /// The provider-facing payload (spec.md §2 data flow: the orchestrator
    /// produces `NotificationData`, which is what `Provider::send_notification`
    /// actually consumes -- a bare `Message` carries no `correlation_id`).
    pub notification: NotificationData,
    pub priority: i32,
    pub providers: BTreeSet<String>,
    pub delivery_id: DeliveryId,
    pub created_at: Instant,
}

/// Aggregate dispatch status (spec.md §3 `DispatchResult`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Pending,
    InProgress,
    Success,
    Failed,
    Partial,
}

crate::simple_display! {
    DispatchStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Success => "success",
        Failed => "failed",
        Partial => "partial",
    }
}

impl DispatchStatus {
    /// Derive the aggregate status from the providers targeted and the
    /// results collected so far (spec.md §3 invariants). Pure: the
    /// Delivery Tracker is the only thing that calls this, but the rule
    /// itself has no state of its own.
    pub fn aggregate(providers: &[String], results: &HashMap<String, ProviderResult>) -> Self {
        if results.len() < providers.len() {
            return DispatchStatus::InProgress;
        }
        let (mut any_success, mut any_failure) = (false, false);
        for provider in providers {
            match results.get(provider).map(|r| r.success) {
                Some(true) => any_success = true,
                Some(false) => any_failure = true,
                None => return DispatchStatus::InProgress,
            }
        }
        match (any_success, any_failure) {
            (true, false) => DispatchStatus::Success,
            (false, true) => DispatchStatus::Failed,
            (true, true) => DispatchStatus::Partial,
            (false, false) => DispatchStatus::Pending,
        }
    }
}

/// Unified result of one `Async Dispatcher::dispatch` call (spec.md §3).
///
/// Invariants: `status == Success` iff every provider in `providers`
/// succeeded; `status == Failed` iff every provider failed; `status ==
/// Partial` iff mixed; `completed_at.is_some()` iff `status` is terminal
/// (`Success`/`Failed`/`Partial`).
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    pub delivery_id: DeliveryId,
    pub status: DispatchStatus,
    pub message: Message,
    pub providers: Vec<String>,
    pub results: HashMap<String, ProviderResult>,
    pub created_at: Instant,
    pub completed_at: Option<Instant>,
}

impl DispatchResult {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, DispatchStatus::Success | DispatchStatus::Failed | DispatchStatus::Partial)
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
