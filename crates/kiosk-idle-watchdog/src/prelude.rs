//! Prelude for kiosk-idle-watchdog.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use kiosk_idle_watchdog::prelude::*;
//! use std::sync::Arc;
//!
//! let mut watchdog = ActivityWatchdog::new(
//!     WatchdogConfig::default(),
//!     Arc::new(SharedSettings::default()),
//!     ManualScheduler::new(),
//!     RecordingActivitySource::new(),
//!     |_| {},
//! )?;
//! watchdog.attach();
//! watchdog.on_activity(ActivityKind::Click);
//! # Ok::<(), WatchdogError>(())
//! ```

pub use crate::activity::{ActivityKind, ActivitySource, SubscriptionId};
pub use crate::config::{WatchdogConfig, WatchdogConfigBuilder};
pub use crate::error::{WatchdogError, WatchdogResult};
pub use crate::scheduler::{Scheduler, TimerHandle, TimerPhase};
pub use crate::settings::{SettingsProvider, SharedSettings};
pub use crate::state::{
    DisarmReason, EscalationCause, WatchdogMetrics, WatchdogSnapshot, WatchdogStatus,
};
pub use crate::virtual_host::{ActivityMonitor, ManualScheduler, RecordingActivitySource};
pub use crate::watchdog::{ActivityWatchdog, TimeoutCallback};
