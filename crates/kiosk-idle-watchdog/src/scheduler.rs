//! Deferred single-shot timer capability.

use std::time::Duration;

/// Which watchdog phase a timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPhase {
    /// Inactivity window before the warning.
    Primary,
    /// Grace window while the warning is visible.
    Grace,
}

impl TimerPhase {
    /// Get the phase as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Grace => "grace",
        }
    }
}

impl core::fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to a scheduled timer.
///
/// Handles are unique per scheduler for its lifetime, so a handle from a
/// superseded phase never compares equal to the outstanding one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: u64,
    phase: TimerPhase,
}

impl TimerHandle {
    /// Create a handle. Only schedulers should need this.
    #[must_use]
    pub fn new(id: u64, phase: TimerPhase) -> Self {
        Self { id, phase }
    }

    /// Scheduler-assigned id.
    #[must_use]
    pub fn id(self) -> u64 {
        self.id
    }

    /// Phase the timer was armed for.
    #[must_use]
    pub fn phase(self) -> TimerPhase {
        self.phase
    }
}

/// Host capability for scheduling and cancelling single-shot timers.
///
/// When a timer expires the host calls
/// [`ActivityWatchdog::on_timer_fired`](crate::ActivityWatchdog::on_timer_fired)
/// with its handle. `cancel` must be synchronous from the watchdog's point
/// of view: a cancelled timer that still reaches the watchdog is rejected
/// as stale, but implementations should avoid delivering it at all.
pub trait Scheduler {
    /// Arrange for `handle` to fire after `delay`.
    fn schedule(&mut self, delay: Duration, phase: TimerPhase) -> TimerHandle;

    /// Cancel a pending timer. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

impl<T: Scheduler + ?Sized> Scheduler for Box<T> {
    fn schedule(&mut self, delay: Duration, phase: TimerPhase) -> TimerHandle {
        (**self).schedule(delay, phase)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        (**self).cancel(handle);
    }
}
