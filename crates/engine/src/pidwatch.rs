// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PID file watcher (spec.md §4.1, §6.1).
//!
//! `poll` is the pure, synchronously-testable tick; `watch` is the
//! cancellable loop that actually runs on the orchestrator's lifecycle task.
//! The initial observation of an already-existing file is the baseline, not
//! a `created` event (spec.md §4.1).

use moverd_core::{Clock, PidFileEvent, PidFileEventKind};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Polls a PID file on an interval and emits `{created, modified, deleted}`
/// events (spec.md §4.1).
pub struct PidFileWatcher {
    path: PathBuf,
    previously_existed: bool,
    previous_pid: Option<i32>,
}

impl PidFileWatcher {
    /// Establishes the baseline observation at construction time: a file
    /// that already exists when the watcher is created must not produce a
    /// `created` event on the first `poll` (spec.md §4.1).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (previously_existed, previous_pid) = read_pid_file(&path);
        Self { path, previously_existed, previous_pid }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One observation tick (spec.md §4.1 algorithm). Read errors other than
    /// "not found" are logged and treated as non-existence; they never fail
    /// the watcher.
    pub fn poll(&mut self, now: Instant) -> Option<PidFileEvent> {
        let (exists_now, pid_now) = read_pid_file(&self.path);

        let event = match (self.previously_existed, exists_now) {
            (false, true) => Some(PidFileEvent::new(PidFileEventKind::Created, pid_now, now)),
            (true, false) => Some(PidFileEvent::new(PidFileEventKind::Deleted, None, now)),
            (true, true) if pid_now != self.previous_pid => {
                Some(PidFileEvent::new(PidFileEventKind::Modified, pid_now, now))
            }
            _ => None,
        };

        self.previously_existed = exists_now;
        self.previous_pid = pid_now;
        event
    }

    /// Runs the poll loop until `cancel` fires, sending every observed event
    /// on `tx`. Cancellation is checked at the top of every interval, so the
    /// watcher stops within one interval (spec.md §4.1 "cancellation must
    /// stop within one interval").
    pub async fn watch<C: Clock>(
        mut self,
        clock: C,
        interval: Duration,
        tx: mpsc::Sender<PidFileEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(interval) => {}
            }
            if let Some(event) = self.poll(clock.now()) {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        }
    }
}

/// Reads and parses the PID file, returning `(exists, pid)` (spec.md §6.1).
fn read_pid_file(path: &Path) -> (bool, Option<i32>) {
    match std::fs::read_to_string(path) {
        Ok(content) => (true, parse_pid(&content)),
        Err(err) if err.kind() == ErrorKind::NotFound => (false, None),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "pid file read failed");
            (false, None)
        }
    }
}

/// Accepts `^[1-9][0-9]*$` after stripping ASCII leading/trailing whitespace;
/// interior newlines (multi-line content) are rejected (spec.md §6.1).
fn parse_pid(content: &str) -> Option<i32> {
    let trimmed = content.trim_matches(|c: char| c.is_ascii_whitespace());
    if trimmed.is_empty() || trimmed.contains(['\n', '\r']) {
        return None;
    }
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    if !first.is_ascii_digit() || first == '0' {
        return None;
    }
    if !chars.all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<i32>().ok()
}

#[cfg(test)]
#[path = "pidwatch_tests.rs"]
mod tests;
