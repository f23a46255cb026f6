// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn non_positive_pid_returns_false_without_a_syscall() {
    assert!(!ProcessValidator::is_running(0));
    assert!(!ProcessValidator::is_running(-1));
}

#[test]
fn pid_1_is_running_on_any_live_unix_system() {
    assert!(ProcessValidator::is_running(1));
}

#[test]
fn an_implausibly_large_pid_is_not_running() {
    assert!(!ProcessValidator::is_running(i32::MAX));
}

#[tokio::test]
async fn validate_with_timeout_returns_false_when_the_timeout_is_zero() {
    assert!(!ProcessValidator::validate_with_timeout(1, Duration::from_nanos(0)).await);
}

#[tokio::test]
async fn validate_with_timeout_mirrors_is_running_given_headroom() {
    assert!(ProcessValidator::validate_with_timeout(1, Duration::from_secs(1)).await);
    assert!(!ProcessValidator::validate_with_timeout(-5, Duration::from_secs(1)).await);
}
