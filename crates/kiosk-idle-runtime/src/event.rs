//! Events processed by the service loop.

use kiosk_idle_watchdog::{ActivityKind, TimerHandle};

/// User or host command for the watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Acknowledge the warning and keep the session.
    Stay,
    /// Leave immediately.
    GoHome,
    /// Warning closed without a choice.
    Dismiss,
    /// Host mounted (or remounted after an escalation).
    Attach,
    /// Host torn down.
    Detach,
    /// The settings flag may have changed.
    SyncSettings,
    /// Stop the event loop.
    Shutdown,
}

/// Everything that reaches the loop goes through one channel, so it is
/// applied to the watchdog in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HostEvent {
    Activity(ActivityKind),
    TimerFired(TimerHandle),
    Command(Command),
}
