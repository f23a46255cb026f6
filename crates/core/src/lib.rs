// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! moverd-core: pure domain types and state machines for the mover
//! monitoring daemon. No I/O, no async runtime dependency.

pub mod macros;

pub mod clock;
pub mod config;
pub mod error;
pub mod eventbus;
pub mod lifecycle;
pub mod model;
pub mod progress;
pub mod provider;
pub mod sampler;
pub mod threshold;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{
    ApplicationConfig, Config, ConfigError, LogLevel, MonitoringConfig, NotificationsConfig,
    ProvidersConfig,
};
pub use error::{InvalidInput, InvalidTransition};
pub use eventbus::{DeadLetter, EventBus, TopicPattern};
pub use lifecycle::{LifecycleStateMachine, MoverLifecycleEvent, MoverState};
pub use model::{
    CycleId, DeliveryId, DiskSample, DispatchResult, DispatchStatus, Message, NotificationData,
    NotificationEventKind, PidFileEvent, PidFileEventKind, Priority, ProgressData, QueuedMessage,
    RateUnit,
};
pub use progress::{ProgressEngine, SampleHistory, Smoothing};
pub use provider::{HealthStatus, Provider, ProviderError, ProviderResult};
pub use sampler::{Sampler, SamplerError};
pub use threshold::evaluate as evaluate_threshold;
