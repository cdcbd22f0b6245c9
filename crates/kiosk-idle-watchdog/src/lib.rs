//! # kiosk-idle-watchdog
//!
//! Inactivity watchdog for kiosk front ends.
//!
//! After a period without user activity the watchdog shows a warning; if the
//! warning is not answered within a grace period it escalates to a
//! caller-supplied action such as navigating back to the home screen.
//!
//! The crate has no runtime of its own. Timers, activity events and the
//! enabled flag are injected through three capabilities:
//!
//! - [`Scheduler`] - schedule/cancel single-shot timers
//! - [`ActivitySource`] - subscribe/unsubscribe to input activity
//! - [`SettingsProvider`] - live `enabled` flag
//!
//! [`virtual_host`] provides a virtual-clock scheduler and a recording
//! activity source for tests and simulations.
//!
//! ## State Machine
//!
//! ```text
//! Disarmed ──attach()/enable──► Idle ──primary fires──► Warning
//!    ▲                           ▲ │                      │ │
//!    │                 activity  └─┘    stay()/dismiss()  │ │
//!    │                           ▲────────────────────────┘ │
//!    └──────── grace fires / go_home() / disable / detach ──┘
//! ```
//!
//! ## Guarantees
//!
//! - At most one timer is outstanding; the warning is visible iff it is the
//!   grace timer.
//! - Every transition cancels the timer it supersedes before arming a new
//!   one; late fires of superseded timers are ignored.
//! - The timeout callback runs at most once per cycle.
//! - Disable and detach are idempotent and leave no timers or subscriptions.
//!
//! ## Example
//!
//! ```rust
//! use kiosk_idle_watchdog::prelude::*;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::time::Duration;
//!
//! let went_home = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&went_home);
//!
//! let mut watchdog = ActivityWatchdog::new(
//!     WatchdogConfig::default(),
//!     Arc::new(SharedSettings::default()),
//!     ManualScheduler::new(),
//!     RecordingActivitySource::new(),
//!     move |_cause| flag.store(true, Ordering::SeqCst),
//! )?;
//! watchdog.attach();
//!
//! // 8s of silence shows the warning, 10s more escalates.
//! watchdog.advance(Duration::from_millis(18_000));
//! assert!(went_home.load(Ordering::SeqCst));
//! assert_eq!(watchdog.status(), WatchdogStatus::Disarmed);
//! # Ok::<(), WatchdogError>(())
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod activity;
pub mod config;
pub mod error;
pub mod prelude;
pub mod scheduler;
pub mod settings;
pub mod state;
pub mod virtual_host;
pub mod watchdog;

pub use activity::{ActivityKind, ActivitySource, SubscriptionId};
pub use config::{WatchdogConfig, WatchdogConfigBuilder};
pub use error::{WatchdogError, WatchdogResult};
pub use scheduler::{Scheduler, TimerHandle, TimerPhase};
pub use settings::{SettingsProvider, SharedSettings};
pub use state::{DisarmReason, EscalationCause, WatchdogMetrics, WatchdogSnapshot, WatchdogStatus};
pub use virtual_host::{ActivityMonitor, ManualScheduler, RecordingActivitySource};
pub use watchdog::{ActivityWatchdog, TimeoutCallback};
