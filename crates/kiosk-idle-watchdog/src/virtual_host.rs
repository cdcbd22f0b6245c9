//! Virtual-time host for driving a watchdog without a runtime.
//!
//! `ManualScheduler` keeps timers on a virtual clock that only moves when
//! told to; `RecordingActivitySource` records subscriptions instead of
//! touching a real input surface. Together with
//! [`ActivityWatchdog::advance`] they make timing behaviour reproducible in
//! tests and in scripted simulations.

use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use crate::activity::{ActivityKind, ActivitySource, SubscriptionId};
use crate::scheduler::{Scheduler, TimerHandle, TimerPhase};
use crate::watchdog::ActivityWatchdog;

/// Scheduler backed by a virtual clock.
///
/// Timers due at the same instant fire in the order they were scheduled.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, u64), TimerHandle>,
    deadlines: HashMap<u64, Duration>,
    scheduled: u64,
    cancelled: u64,
}

impl ManualScheduler {
    /// Create a scheduler with the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers armed and not yet fired or cancelled.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Deadline of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Total timers ever scheduled.
    #[must_use]
    pub fn scheduled_count(&self) -> u64 {
        self.scheduled
    }

    /// Total pending timers cancelled.
    #[must_use]
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }

    /// Remove the earliest timer due at or before `until`, moving the clock
    /// to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerHandle> {
        let (&(deadline, id), _) = self.pending.first_key_value()?;
        if deadline > until {
            return None;
        }
        let handle = self.pending.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        self.now = self.now.max(deadline);
        Some(handle)
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, phase: TimerPhase) -> TimerHandle {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        let deadline = self.now.saturating_add(delay);
        let handle = TimerHandle::new(id, phase);
        self.pending.insert((deadline, id), handle);
        self.deadlines.insert(id, deadline);
        self.scheduled = self.scheduled.saturating_add(1);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(deadline) = self.deadlines.remove(&handle.id()) {
            self.pending.remove(&(deadline, handle.id()));
            self.cancelled = self.cancelled.saturating_add(1);
        }
    }
}

impl<A: ActivitySource> ActivityWatchdog<ManualScheduler, A> {
    /// Advance virtual time by `by`, firing every timer that comes due.
    pub fn advance(&mut self, by: Duration) {
        let target = self.scheduler.now().saturating_add(by);
        self.advance_to(target);
    }

    /// Advance virtual time to the absolute instant `target`.
    ///
    /// Timers armed while advancing fire too if they come due before
    /// `target`. Targets in the past only fire already-overdue timers.
    pub fn advance_to(&mut self, target: Duration) {
        while let Some(handle) = self.scheduler.pop_due(target) {
            self.on_timer_fired(handle);
        }
        self.scheduler.set_now(target);
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }
}

#[derive(Debug, Default)]
struct SubscriptionLog {
    next_id: u64,
    active: BTreeMap<SubscriptionId, Vec<ActivityKind>>,
    subscribe_calls: u64,
    unsubscribe_calls: u64,
}

/// Activity source that records subscriptions.
///
/// Clone a [`monitor`](Self::monitor) before handing the source to a watchdog
/// to keep observing it afterwards.
#[derive(Debug, Default)]
pub struct RecordingActivitySource {
    log: Arc<Mutex<SubscriptionLog>>,
}

impl RecordingActivitySource {
    /// Create a source with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A read handle that shares this source's log.
    #[must_use]
    pub fn monitor(&self) -> ActivityMonitor {
        ActivityMonitor {
            log: Arc::clone(&self.log),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.monitor().active_subscriptions()
    }

    /// Total `subscribe` calls.
    #[must_use]
    pub fn subscribe_calls(&self) -> u64 {
        self.monitor().subscribe_calls()
    }

    /// Whether some live subscription covers `kind`.
    #[must_use]
    pub fn is_listening(&self, kind: ActivityKind) -> bool {
        self.monitor().is_listening(kind)
    }
}

impl ActivitySource for RecordingActivitySource {
    fn subscribe(&mut self, kinds: &[ActivityKind]) -> SubscriptionId {
        let mut log = self.log.lock();
        let id = SubscriptionId(log.next_id);
        log.next_id = log.next_id.saturating_add(1);
        log.active.insert(id, kinds.to_vec());
        log.subscribe_calls = log.subscribe_calls.saturating_add(1);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        let mut log = self.log.lock();
        if log.active.remove(&id).is_some() {
            log.unsubscribe_calls = log.unsubscribe_calls.saturating_add(1);
        }
    }
}

/// Shared read view of a [`RecordingActivitySource`].
#[derive(Debug, Clone)]
pub struct ActivityMonitor {
    log: Arc<Mutex<SubscriptionLog>>,
}

impl ActivityMonitor {
    /// Number of live subscriptions.
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.log.lock().active.len()
    }

    /// Total `subscribe` calls.
    #[must_use]
    pub fn subscribe_calls(&self) -> u64 {
        self.log.lock().subscribe_calls
    }

    /// Total effective `unsubscribe` calls.
    #[must_use]
    pub fn unsubscribe_calls(&self) -> u64 {
        self.log.lock().unsubscribe_calls
    }

    /// Whether some live subscription covers `kind`.
    #[must_use]
    pub fn is_listening(&self, kind: ActivityKind) -> bool {
        self.log
            .lock()
            .active
            .values()
            .any(|kinds| kinds.contains(&kind))
    }

    /// Union of kinds covered by live subscriptions.
    #[must_use]
    pub fn listening_kinds(&self) -> BTreeSet<ActivityKind> {
        self.log
            .lock()
            .active
            .values()
            .flatten()
            .copied()
            .collect()
    }
}
