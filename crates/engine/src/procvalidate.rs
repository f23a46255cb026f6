// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process liveness validation (spec.md §4.2, §6.2).
//!
//! Consults the OS process table, never sends a signal to probe liveness.
//! Errors and missing entries are `false`, never raised (spec.md §4.2).

use std::time::Duration;

/// Stateless process-table lookup.
pub struct ProcessValidator;

impl ProcessValidator {
    /// `/proc/{pid}` existence on Unix; never true for a non-positive PID.
    pub fn is_running(pid: i32) -> bool {
        if pid <= 0 {
            return false;
        }
        is_running_platform(pid)
    }

    /// Wraps `is_running` in a cancellable timeout; an expired timeout
    /// returns `false` (spec.md §4.2).
    pub async fn validate_with_timeout(pid: i32, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async move { Self::is_running(pid) }).await.unwrap_or(false)
    }
}

#[cfg(unix)]
fn is_running_platform(pid: i32) -> bool {
    std::path::Path::new(&format!("/proc/{pid}")).is_dir()
}

#[cfg(not(unix))]
fn is_running_platform(_pid: i32) -> bool {
    tracing::warn!("process liveness check is unimplemented on this platform");
    false
}

#[cfg(test)]
#[path = "procvalidate_tests.rs"]
mod tests;
