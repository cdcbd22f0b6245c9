//! # kiosk-idle-runtime
//!
//! Tokio host for [`kiosk_idle_watchdog`].
//!
//! [`WatchdogService::spawn`] moves an [`ActivityWatchdog`] onto its own task
//! and wires it to real timers ([`TokioScheduler`]) and a channel-backed
//! activity source. Hosts drive it through a cloneable [`WatchdogHandle`]
//! and observe it through a `watch` channel of [`WatchdogSnapshot`]s.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kiosk_idle_runtime::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), RuntimeError> {
//! let settings = Arc::new(SharedSettings::default());
//! let service = WatchdogService::spawn(WatchdogConfig::default(), settings, |cause| {
//!     println!("navigating home ({cause})");
//! })?;
//!
//! let handle = service.handle();
//! handle.record_activity(ActivityKind::TouchStart)?;
//!
//! let mut state = handle.subscribe_state();
//! if state.wait_for(|s| s.warning_visible).await.is_ok() {
//!     handle.stay()?;
//! }
//!
//! let last = service.shutdown().await?;
//! println!("{} warnings shown", last.metrics.warnings_shown);
//! # Ok(())
//! # }
//! ```
//!
//! [`ActivityWatchdog`]: kiosk_idle_watchdog::ActivityWatchdog
//! [`WatchdogSnapshot`]: kiosk_idle_watchdog::WatchdogSnapshot

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]

pub mod activity;
pub mod error;
pub mod event;
pub mod prelude;
pub mod scheduler;
pub mod service;

pub use activity::{ActivityFeed, ChannelActivitySource};
pub use error::{RuntimeError, RuntimeResult};
pub use event::Command;
pub use scheduler::TokioScheduler;
pub use service::{WatchdogHandle, WatchdogService};
