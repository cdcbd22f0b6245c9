//! Prelude for kiosk-idle-runtime.
//!
//! Re-exports the service types together with the watchdog types needed
//! to configure and observe it.

pub use crate::activity::ActivityFeed;
pub use crate::error::{RuntimeError, RuntimeResult};
pub use crate::event::Command;
pub use crate::service::{WatchdogHandle, WatchdogService};

pub use kiosk_idle_watchdog::{
    ActivityKind, DisarmReason, EscalationCause, SharedSettings, WatchdogConfig, WatchdogMetrics,
    WatchdogSnapshot, WatchdogStatus,
};
