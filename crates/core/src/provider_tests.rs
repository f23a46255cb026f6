// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn permanent_errors_are_not_retryable() {
    let err = ProviderError::Permanent("bad credentials".to_string());
    assert!(!err.is_retryable());
}

#[test]
fn transient_and_rate_limited_errors_are_retryable() {
    assert!(ProviderError::Transient("timeout".to_string()).is_retryable());
    assert!(ProviderError::RateLimited { retry_after: None }.is_retryable());
}

#[test]
fn rate_limited_surfaces_retry_after_hint() {
    let err = ProviderError::RateLimited { retry_after: Some(Duration::from_secs(30)) };
    assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
}

#[test]
fn non_rate_limited_errors_have_no_retry_after_hint() {
    let err = ProviderError::Transient("x".to_string());
    assert_eq!(err.retry_after(), None);
}
