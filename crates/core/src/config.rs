// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core-facing configuration value (spec.md §6.3).
//!
//! This is the already-validated value the external loader hands to the
//! core; parsing a config file or environment is the loader's job, not
//! this crate's (spec.md §9 "the configuration layer ... is responsible
//! for producing a strongly-typed, fully-populated ... configuration").
//! `Config::new` still enforces the load-time invariants spec.md calls out
//! explicitly (threshold dedup/range) so a caller cannot hand the core a
//! value that violates them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("threshold {0} is outside the valid range [0, 100]")]
    ThresholdOutOfRange(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringConfig {
    pub pid_file: PathBuf,
    pub pid_check_interval: Duration,
    pub sampling_interval: Duration,
    pub process_timeout: Duration,
    pub exclusion_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationsConfig {
    /// Deduplicated, range-checked progress thresholds (spec.md §6.3).
    thresholds: BTreeSet<u32>,
    pub completion_enabled: bool,
    pub retry_attempts: u32,
}

impl NotificationsConfig {
    pub fn new(
        thresholds: impl IntoIterator<Item = u32>,
        completion_enabled: bool,
        retry_attempts: u32,
    ) -> Result<Self, ConfigError> {
        let mut set = BTreeSet::new();
        for t in thresholds {
            if t > 100 {
                return Err(ConfigError::ThresholdOutOfRange(t));
            }
            set.insert(t);
        }
        Ok(Self { thresholds: set, completion_enabled, retry_attempts })
    }

    pub fn thresholds(&self) -> &BTreeSet<u32> {
        &self.thresholds
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvidersConfig {
    /// Provider identifier -> enabled flag (spec.md §6.3 "one flag per provider").
    pub enabled: HashMap<String, bool>,
}

impl ProvidersConfig {
    pub fn enabled_providers(&self) -> impl Iterator<Item = &str> {
        self.enabled.iter().filter(|(_, &on)| on).map(|(id, _)| id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationConfig {
    pub log_level: LogLevel,
    pub dry_run: bool,
    /// Hint to ops tooling; the core ignores this (spec.md §6.3).
    pub version_check: bool,
    pub syslog_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub monitoring: MonitoringConfig,
    pub notifications: NotificationsConfig,
    pub providers: ProvidersConfig,
    pub application: ApplicationConfig,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
