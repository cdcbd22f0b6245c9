//! The watchdog service: one tokio task owning the state machine.
//!
//! Timer expirations, input events and user commands all travel through a
//! single unbounded channel into the loop, which applies them to the
//! [`ActivityWatchdog`] one at a time and republishes a
//! [`WatchdogSnapshot`] on a `watch` channel whenever it changes.

use std::sync::Arc;

use kiosk_idle_watchdog::{
    ActivityKind, ActivityWatchdog, EscalationCause, SharedSettings, WatchdogConfig,
    WatchdogSnapshot,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::activity::{ActivityFeed, ChannelActivitySource};
use crate::error::{RuntimeError, RuntimeResult};
use crate::event::{Command, HostEvent};
use crate::scheduler::TokioScheduler;

type HostedWatchdog = ActivityWatchdog<TokioScheduler, ChannelActivitySource>;

/// Running watchdog service.
///
/// Dropping the service asks the loop to stop; use
/// [`shutdown`](Self::shutdown) to wait for it and collect the final snapshot.
#[derive(Debug)]
pub struct WatchdogService {
    handle: WatchdogHandle,
    task: Option<JoinHandle<WatchdogSnapshot>>,
}

impl WatchdogService {
    /// Validate `config`, spawn the event loop and attach the watchdog.
    ///
    /// `on_timeout` runs on the loop task, once per escalation. Must be
    /// called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Watchdog`] if the configuration is invalid.
    pub fn spawn<F>(
        config: WatchdogConfig,
        settings: Arc<SharedSettings>,
        on_timeout: F,
    ) -> RuntimeResult<Self>
    where
        F: FnMut(EscalationCause) + Send + 'static,
    {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let source = ChannelActivitySource::new();
        let feed = source.feed(events_tx.clone());
        let scheduler = TokioScheduler::new(events_tx.clone());

        let watchdog = ActivityWatchdog::new(
            config,
            settings.clone(),
            scheduler,
            source,
            on_timeout,
        )?;
        let (state_tx, state_rx) = watch::channel(watchdog.snapshot());

        info!(
            primary_timeout_ms = watchdog.config().primary_timeout_ms,
            grace_timeout_ms = watchdog.config().grace_timeout_ms,
            "Starting idle watchdog service"
        );
        let task = tokio::spawn(run_loop(watchdog, events_rx, state_tx));

        Ok(Self {
            handle: WatchdogHandle {
                events: events_tx,
                settings,
                state: state_rx,
                feed,
            },
            task: Some(task),
        })
    }

    /// A cloneable control handle.
    #[must_use]
    pub fn handle(&self) -> WatchdogHandle {
        self.handle.clone()
    }

    /// Stop the loop, detach the watchdog and return its final snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Join`] if the loop task panicked.
    pub async fn shutdown(mut self) -> RuntimeResult<WatchdogSnapshot> {
        let task = self.task.take();
        if self.handle.send(Command::Shutdown).is_err() {
            debug!("Service loop already stopped");
        }
        match task {
            Some(task) => Ok(task.await?),
            None => Ok(self.handle.snapshot()),
        }
    }
}

impl Drop for WatchdogService {
    fn drop(&mut self) {
        if self.task.is_some() && self.handle.send(Command::Shutdown).is_err() {
            debug!("Service loop already stopped");
        }
    }
}

/// Cloneable handle for driving a running [`WatchdogService`].
#[derive(Debug, Clone)]
pub struct WatchdogHandle {
    events: mpsc::UnboundedSender<HostEvent>,
    settings: Arc<SharedSettings>,
    state: watch::Receiver<WatchdogSnapshot>,
    feed: ActivityFeed,
}

impl WatchdogHandle {
    /// Acknowledge the warning and keep the session.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ServiceStopped`] if the loop has exited.
    pub fn stay(&self) -> RuntimeResult<()> {
        self.send(Command::Stay)
    }

    /// Leave now instead of waiting out the grace period.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ServiceStopped`] if the loop has exited.
    pub fn go_home(&self) -> RuntimeResult<()> {
        self.send(Command::GoHome)
    }

    /// The warning was closed without a choice.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ServiceStopped`] if the loop has exited.
    pub fn dismiss(&self) -> RuntimeResult<()> {
        self.send(Command::Dismiss)
    }

    /// Start a new monitoring cycle, e.g. after the host remounted.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ServiceStopped`] if the loop has exited.
    pub fn attach(&self) -> RuntimeResult<()> {
        self.send(Command::Attach)
    }

    /// Tear the watchdog down without stopping the service.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ServiceStopped`] if the loop has exited.
    pub fn detach(&self) -> RuntimeResult<()> {
        self.send(Command::Detach)
    }

    /// Flip the settings flag and have the loop pick up the change.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ServiceStopped`] if the loop has exited.
    pub fn set_enabled(&self, enabled: bool) -> RuntimeResult<()> {
        let previous = self.settings.set_enabled(enabled);
        if previous != enabled {
            info!(enabled, "Idle timeout setting changed");
        }
        self.send(Command::SyncSettings)
    }

    /// Publish one input event. See [`ActivityFeed::publish`].
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ServiceStopped`] if the loop has exited.
    pub fn record_activity(&self, kind: ActivityKind) -> RuntimeResult<bool> {
        self.feed.publish(kind)
    }

    /// Publisher to hand to input adapters.
    #[must_use]
    pub fn activity_feed(&self) -> ActivityFeed {
        self.feed.clone()
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> WatchdogSnapshot {
        *self.state.borrow()
    }

    /// Receiver that observes every published snapshot.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<WatchdogSnapshot> {
        self.state.clone()
    }

    fn send(&self, command: Command) -> RuntimeResult<()> {
        if self.events.send(HostEvent::Command(command)).is_err() {
            return Err(RuntimeError::ServiceStopped);
        }
        Ok(())
    }
}

async fn run_loop(
    mut watchdog: HostedWatchdog,
    mut events: mpsc::UnboundedReceiver<HostEvent>,
    state: watch::Sender<WatchdogSnapshot>,
) -> WatchdogSnapshot {
    watchdog.attach();
    publish(&state, &watchdog);

    while let Some(event) = events.recv().await {
        if !dispatch(&mut watchdog, event) {
            break;
        }
        publish(&state, &watchdog);
    }

    watchdog.detach();
    let last = watchdog.snapshot();
    state.send_replace(last);
    info!(
        escalations = last.metrics.escalations(),
        warnings = last.metrics.warnings_shown,
        "Idle watchdog service stopped"
    );
    last
}

/// Apply one event. Returns `false` once the loop should stop.
fn dispatch(watchdog: &mut HostedWatchdog, event: HostEvent) -> bool {
    match event {
        HostEvent::Activity(kind) => watchdog.on_activity(kind),
        HostEvent::TimerFired(handle) => watchdog.on_timer_fired(handle),
        HostEvent::Command(Command::Shutdown) => return false,
        HostEvent::Command(command) => apply(watchdog, command),
    }
    true
}

fn apply(watchdog: &mut HostedWatchdog, command: Command) {
    debug!(?command, status = %watchdog.status(), "Applying command");
    match command {
        Command::Stay => watchdog.stay(),
        Command::GoHome => watchdog.go_home(),
        Command::Dismiss => watchdog.dismiss(),
        Command::Attach => watchdog.attach(),
        Command::Detach => watchdog.detach(),
        Command::SyncSettings => {
            watchdog.sync_settings();
        }
        Command::Shutdown => {}
    }
}

fn publish(state: &watch::Sender<WatchdogSnapshot>, watchdog: &HostedWatchdog) {
    let next = watchdog.snapshot();
    state.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_idle_watchdog::WatchdogStatus;
    use std::time::Duration;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn hosted(
        events: mpsc::UnboundedSender<HostEvent>,
    ) -> RuntimeResult<(HostedWatchdog, ActivityFeed)> {
        let source = ChannelActivitySource::new();
        let feed = source.feed(events.clone());
        let watchdog = ActivityWatchdog::new(
            WatchdogConfig::default(),
            Arc::new(SharedSettings::default()),
            TokioScheduler::new(events),
            source,
            |_| {},
        )?;
        Ok((watchdog, feed))
    }

    fn drain(watchdog: &mut HostedWatchdog, events: &mut mpsc::UnboundedReceiver<HostEvent>) {
        while let Ok(event) = events.try_recv() {
            dispatch(watchdog, event);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_queued_behind_activity_is_stale() -> TestResult {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let (mut watchdog, feed) = hosted(events_tx.clone())?;
        watchdog.attach();

        // The primary sleep finishes and posts its fire while the loop is busy.
        tokio::time::sleep(Duration::from_millis(8_001)).await;
        let fired = events_rx.try_recv()?;
        assert!(matches!(fired, HostEvent::TimerFired(_)));
        assert_eq!(watchdog.status(), WatchdogStatus::Idle);

        // A touch from the same instant is ahead of the fire in the queue.
        assert!(feed.publish(ActivityKind::TouchStart)?);
        events_tx.send(fired)?;
        drain(&mut watchdog, &mut events_rx);

        let metrics = watchdog.metrics();
        assert_eq!(metrics.activity_resets, 1);
        assert_eq!(metrics.stale_timer_fires, 1);
        assert_eq!(metrics.warnings_shown, 0);
        assert!(!watchdog.warning_visible());
        assert_eq!(watchdog.status(), WatchdogStatus::Idle);

        // The restarted window runs its full length from the touch.
        tokio::time::sleep(Duration::from_millis(7_999)).await;
        drain(&mut watchdog, &mut events_rx);
        assert!(!watchdog.warning_visible());

        tokio::time::sleep(Duration::from_millis(1)).await;
        drain(&mut watchdog, &mut events_rx);
        assert!(watchdog.warning_visible());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_event_stops_dispatch() -> TestResult {
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let (mut watchdog, _feed) = hosted(events_tx)?;

        assert!(dispatch(&mut watchdog, HostEvent::Command(Command::Attach)));
        assert!(!dispatch(&mut watchdog, HostEvent::Command(Command::Shutdown)));
        assert_eq!(watchdog.status(), WatchdogStatus::Idle);
        Ok(())
    }
}
