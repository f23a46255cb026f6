// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop-notification provider (spec.md §6.4), adapting `notify-rust` to
//! the core's `Provider` trait. Chat-service/webhook providers are fixtures
//! the plugin loader constructs and hands to the core; this crate only
//! ships the one provider that needs no wire protocol of its own.

use async_trait::async_trait;
use moverd_core::{HealthStatus, NotificationData, Provider, ProviderError, ProviderResult};
use std::time::{Duration, Instant};

/// Sends mover-status notifications to the local desktop notification
/// center.
#[derive(Clone, Debug)]
pub struct DesktopProvider {
    identifier: String,
}

impl DesktopProvider {
    pub fn new(identifier: impl Into<String>) -> Self {
        #[cfg(target_os = "macos")]
        {
            // Pre-set the application bundle identifier so mac-notification-sys
            // skips its NSAppleScript lookup, which blocks forever in daemon
            // processes that lack Automation permissions.
            let _ = mac_notification_sys::set_application("com.apple.Terminal");
        }
        Self { identifier: identifier.into() }
    }
}

#[async_trait]
impl Provider for DesktopProvider {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn send_notification(&self, data: &NotificationData) -> Result<ProviderResult, ProviderError> {
        let title = data.message.title.clone();
        let body = data.message.content.clone();
        let provider_identifier = self.identifier.clone();
        let start = Instant::now();

        // notify_rust::Notification::show() is synchronous on most
        // backends; run it on tokio's blocking pool so it never stalls the
        // dispatcher's worker task.
        let outcome = tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new().summary(&title).body(&body).show().map(|_| ())
        })
        .await;

        let delivery_time_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(Ok(())) => {
                Ok(ProviderResult { provider_identifier, success: true, error_message: None, delivery_time_ms })
            }
            Ok(Err(err)) => {
                tracing::warn!(provider = %self.identifier, error = %err, "desktop notification failed");
                Err(ProviderError::Transient(err.to_string()))
            }
            Err(join_err) => Err(ProviderError::Transient(join_err.to_string())),
        }
    }

    fn validate_config(&self) -> bool {
        true
    }

    async fn health_check(&self, _timeout: Duration) -> HealthStatus {
        HealthStatus::Healthy
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
