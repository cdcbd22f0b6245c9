//! Tokio-backed timer scheduler.

use std::collections::HashMap;
use std::time::Duration;

use kiosk_idle_watchdog::{Scheduler, TimerHandle, TimerPhase};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::trace;

use crate::event::HostEvent;

/// Schedules watchdog timers as sleeping tokio tasks.
///
/// An expired timer posts [`HostEvent::TimerFired`] into the service
/// channel instead of touching the watchdog, so expirations are serialized
/// with activity and commands. Cancelling aborts the sleeping task; a fire
/// that was already queued is dropped by the watchdog as stale.
///
/// Must be used from inside a tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    events: mpsc::UnboundedSender<HostEvent>,
    next_id: u64,
    timers: HashMap<u64, AbortHandle>,
}

impl TokioScheduler {
    pub(crate) fn new(events: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self {
            events,
            next_id: 0,
            timers: HashMap::new(),
        }
    }

    /// Number of timer tasks that have not yet fired or been cancelled.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.timers.values().filter(|t| !t.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, phase: TimerPhase) -> TimerHandle {
        self.timers.retain(|_, task| !task.is_finished());

        self.next_id = self.next_id.wrapping_add(1);
        let handle = TimerHandle::new(self.next_id, phase);
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if events.send(HostEvent::TimerFired(handle)).is_err() {
                trace!(timer_id = handle.id(), "Service stopped before timer fired");
            }
        });
        self.timers.insert(handle.id(), task.abort_handle());
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.timers.remove(&handle.id()) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.timers.drain() {
            task.abort();
        }
    }
}
