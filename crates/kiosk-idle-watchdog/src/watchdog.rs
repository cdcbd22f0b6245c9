//! The inactivity watchdog state machine.
//!
//! `ActivityWatchdog` owns its timers and its activity subscription. All
//! transitions take `&mut self`, so timer fires, activity events and user
//! commands are applied one at a time in the order the host delivers them.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::activity::{ActivityKind, ActivitySource, SubscriptionId};
use crate::config::WatchdogConfig;
use crate::error::WatchdogResult;
use crate::scheduler::{Scheduler, TimerHandle, TimerPhase};
use crate::settings::SettingsProvider;
use crate::state::{
    DisarmReason, EscalationCause, WatchdogMetrics, WatchdogSnapshot, WatchdogStatus,
};

/// Callback invoked once per escalation, e.g. to navigate home.
pub type TimeoutCallback = Box<dyn FnMut(EscalationCause) + Send>;

/// Internal phase. Each armed variant owns exactly one timer handle, which
/// keeps "one primary, one grace, warning iff grace" true by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Disarmed(DisarmReason),
    Idle { primary: TimerHandle },
    Warning { grace: TimerHandle },
}

/// How the user left the warning without escalating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Acknowledgment {
    Stay,
    Dismiss,
}

/// Inactivity watchdog with a warning phase and an escalation callback.
///
/// The watchdog is host-agnostic: timers come from a [`Scheduler`],
/// activity from an [`ActivitySource`], and the enabled flag from a
/// [`SettingsProvider`]. The host feeds expirations back through
/// [`on_timer_fired`](Self::on_timer_fired) and events through
/// [`on_activity`](Self::on_activity).
///
/// Dropping the watchdog cancels its timer and subscription.
///
/// # Example
///
/// ```rust
/// use kiosk_idle_watchdog::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let settings = Arc::new(SharedSettings::new(true));
/// let mut watchdog = ActivityWatchdog::new(
///     WatchdogConfig::default(),
///     settings,
///     ManualScheduler::new(),
///     RecordingActivitySource::new(),
///     |cause| println!("escalated: {cause}"),
/// )?;
///
/// watchdog.attach();
/// watchdog.advance(Duration::from_millis(8_000));
/// assert!(watchdog.warning_visible());
///
/// watchdog.stay();
/// assert_eq!(watchdog.status(), WatchdogStatus::Idle);
/// # Ok::<(), WatchdogError>(())
/// ```
pub struct ActivityWatchdog<S: Scheduler, A: ActivitySource> {
    config: WatchdogConfig,
    settings: Arc<dyn SettingsProvider>,
    pub(crate) scheduler: S,
    activity: A,
    on_timeout: TimeoutCallback,
    phase: Phase,
    subscription: Option<SubscriptionId>,
    metrics: WatchdogMetrics,
}

impl<S: Scheduler, A: ActivitySource> ActivityWatchdog<S, A> {
    /// Create a detached watchdog. Call [`attach`](Self::attach) to start it.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::InvalidConfiguration`](crate::WatchdogError::InvalidConfiguration)
    /// if `config` fails [`WatchdogConfig::validate`].
    pub fn new<F>(
        config: WatchdogConfig,
        settings: Arc<dyn SettingsProvider>,
        scheduler: S,
        activity: A,
        on_timeout: F,
    ) -> WatchdogResult<Self>
    where
        F: FnMut(EscalationCause) + Send + 'static,
    {
        config.validate()?;
        Ok(Self {
            config,
            settings,
            scheduler,
            activity,
            on_timeout: Box::new(on_timeout),
            phase: Phase::Disarmed(DisarmReason::Detached),
            subscription: None,
            metrics: WatchdogMetrics::new(),
        })
    }

    /// Host mount: start a monitoring cycle.
    ///
    /// Arms the primary timer if monitoring is enabled, otherwise waits in
    /// `Disarmed(Disabled)` until the settings flip. Also starts a fresh
    /// cycle after an escalation. No-op while armed.
    pub fn attach(&mut self) {
        match self.phase {
            Phase::Disarmed(reason) => {
                if self.settings.enabled() {
                    debug!(previous = %reason, "Attaching idle watchdog");
                    self.arm();
                } else {
                    debug!("Attached while disabled; staying passive");
                    self.phase = Phase::Disarmed(DisarmReason::Disabled);
                }
            }
            Phase::Idle { .. } | Phase::Warning { .. } => {
                debug!(status = %self.status(), "Watchdog already attached");
            }
        }
    }

    /// Host teardown: cancel all timers and remove the subscription.
    ///
    /// Safe to call any number of times.
    pub fn detach(&mut self) {
        if self.status().is_armed() {
            debug!(status = %self.status(), "Detaching idle watchdog");
        }
        self.disarm(DisarmReason::Detached);
    }

    /// Re-derive armed/disarmed status from the settings provider.
    ///
    /// Runs implicitly at the start of every other entry point; hosts call
    /// it directly when they learn the flag changed. Disabling after an
    /// escalation parks the watchdog as `Disarmed(Disabled)`, so a later
    /// enable starts a fresh cycle just like [`attach`](Self::attach).
    pub fn sync_settings(&mut self) -> WatchdogStatus {
        let enabled = self.settings.enabled();
        match self.phase {
            Phase::Idle { .. } | Phase::Warning { .. } if !enabled => {
                info!(status = %self.status(), "Idle watchdog disabled");
                self.disarm(DisarmReason::Disabled);
            }
            Phase::Disarmed(DisarmReason::Escalated) if !enabled => {
                debug!("Idle watchdog disabled after escalation");
                self.phase = Phase::Disarmed(DisarmReason::Disabled);
            }
            Phase::Disarmed(DisarmReason::Disabled) if enabled => {
                info!("Idle watchdog re-enabled");
                self.arm();
            }
            _ => {}
        }
        self.status()
    }

    /// Deliver a user activity event.
    ///
    /// Restarts the inactivity window while `Idle`. Ignored while the
    /// warning is visible, because the warning needs an explicit answer.
    pub fn on_activity(&mut self, kind: ActivityKind) {
        self.sync_settings();
        match self.phase {
            Phase::Idle { .. } if self.config.tracks(kind) => {
                self.restart_window();
                self.metrics.record_activity_reset();
                debug!(kind = %kind, "Activity reset inactivity window");
            }
            _ => {
                self.metrics.record_ignored_activity();
                debug!(kind = %kind, status = %self.status(), "Ignoring activity");
            }
        }
    }

    /// Deliver a timer expiry.
    ///
    /// Only the currently outstanding handle has any effect; anything else
    /// belongs to a superseded phase and is dropped.
    pub fn on_timer_fired(&mut self, handle: TimerHandle) {
        self.sync_settings();
        match self.phase {
            Phase::Idle { primary } if primary == handle => {
                let grace = self
                    .scheduler
                    .schedule(self.config.grace_timeout(), TimerPhase::Grace);
                self.phase = Phase::Warning { grace };
                self.metrics.record_warning();
                info!(
                    grace_timeout_ms = self.config.grace_timeout_ms,
                    "Inactivity warning shown"
                );
            }
            Phase::Warning { grace } if grace == handle => {
                self.escalate(EscalationCause::GraceExpired);
            }
            _ => {
                self.metrics.record_stale_fire();
                debug!(
                    timer_id = handle.id(),
                    phase = %handle.phase(),
                    status = %self.status(),
                    "Ignoring stale timer fire"
                );
            }
        }
    }

    /// User chose to keep the session: hide the warning and restart the
    /// inactivity window.
    pub fn stay(&mut self) {
        self.acknowledge(Acknowledgment::Stay);
    }

    /// Warning closed without an explicit choice. Treated like [`stay`](Self::stay).
    pub fn dismiss(&mut self) {
        self.acknowledge(Acknowledgment::Dismiss);
    }

    /// User chose to leave: escalate now instead of waiting out the grace period.
    pub fn go_home(&mut self) {
        self.sync_settings();
        if matches!(self.phase, Phase::Warning { .. }) {
            self.escalate(EscalationCause::UserRequested);
        } else {
            self.metrics.record_ignored_command();
            debug!(command = "go_home", status = %self.status(), "Ignoring command outside warning");
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> WatchdogStatus {
        match self.phase {
            Phase::Disarmed(_) => WatchdogStatus::Disarmed,
            Phase::Idle { .. } => WatchdogStatus::Idle,
            Phase::Warning { .. } => WatchdogStatus::Warning,
        }
    }

    /// Whether the host should render the warning.
    #[must_use]
    pub fn warning_visible(&self) -> bool {
        matches!(self.phase, Phase::Warning { .. })
    }

    /// Why the watchdog is disarmed, or `None` while armed.
    #[must_use]
    pub fn disarm_reason(&self) -> Option<DisarmReason> {
        match self.phase {
            Phase::Disarmed(reason) => Some(reason),
            Phase::Idle { .. } | Phase::Warning { .. } => None,
        }
    }

    /// The single outstanding timer, if any.
    #[must_use]
    pub fn pending_timer(&self) -> Option<TimerHandle> {
        match self.phase {
            Phase::Disarmed(_) => None,
            Phase::Idle { primary } => Some(primary),
            Phase::Warning { grace } => Some(grace),
        }
    }

    /// Whether an activity subscription is currently held.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Counters accumulated since creation.
    #[must_use]
    pub fn metrics(&self) -> WatchdogMetrics {
        self.metrics
    }

    /// Point-in-time view for publishing to a UI.
    #[must_use]
    pub fn snapshot(&self) -> WatchdogSnapshot {
        WatchdogSnapshot {
            status: self.status(),
            disarm_reason: self.disarm_reason(),
            warning_visible: self.warning_visible(),
            metrics: self.metrics,
        }
    }

    /// The configuration this watchdog was built with.
    #[must_use]
    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    /// The settings provider consulted on every entry point.
    #[must_use]
    pub fn settings(&self) -> &Arc<dyn SettingsProvider> {
        &self.settings
    }

    /// The injected scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// The injected activity source.
    #[must_use]
    pub fn activity_source(&self) -> &A {
        &self.activity
    }

    fn acknowledge(&mut self, how: Acknowledgment) {
        self.sync_settings();
        if !matches!(self.phase, Phase::Warning { .. }) {
            self.metrics.record_ignored_command();
            debug!(command = ?how, status = %self.status(), "Ignoring command outside warning");
            return;
        }

        self.restart_window();
        match how {
            Acknowledgment::Stay => {
                self.metrics.record_acknowledgment();
                info!("Warning acknowledged; inactivity window restarted");
            }
            Acknowledgment::Dismiss => {
                self.metrics.record_dismissal();
                info!("Warning dismissed without a choice; inactivity window restarted");
            }
        }
    }

    /// Disarmed -> Idle: subscribe and arm the primary timer.
    fn arm(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(self.activity.subscribe(&self.config.activity_kinds));
        }
        let primary = self
            .scheduler
            .schedule(self.config.primary_timeout(), TimerPhase::Primary);
        self.phase = Phase::Idle { primary };
        self.metrics.record_arm();
        debug!(
            primary_timeout_ms = self.config.primary_timeout_ms,
            "Idle watchdog armed"
        );
    }

    /// Idle|Warning -> Idle with a fresh primary timer.
    fn restart_window(&mut self) {
        match self.phase {
            Phase::Idle { primary } => self.scheduler.cancel(primary),
            Phase::Warning { grace } => self.scheduler.cancel(grace),
            Phase::Disarmed(_) => return,
        }
        let primary = self
            .scheduler
            .schedule(self.config.primary_timeout(), TimerPhase::Primary);
        self.phase = Phase::Idle { primary };
    }

    fn escalate(&mut self, cause: EscalationCause) {
        self.disarm(DisarmReason::Escalated);
        self.metrics.record_escalation(cause);
        warn!(cause = %cause, "Inactivity escalation");
        (self.on_timeout)(cause);
    }

    fn disarm(&mut self, reason: DisarmReason) {
        self.release();
        self.phase = Phase::Disarmed(reason);
    }

    /// Cancel the outstanding timer and drop the subscription.
    fn release(&mut self) {
        if let Some(handle) = self.pending_timer() {
            self.scheduler.cancel(handle);
        }
        if let Some(id) = self.subscription.take() {
            self.activity.unsubscribe(id);
        }
    }
}

impl<S: Scheduler, A: ActivitySource> Drop for ActivityWatchdog<S, A> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<S: Scheduler, A: ActivitySource> std::fmt::Debug for ActivityWatchdog<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityWatchdog")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("subscription", &self.subscription)
            .field("enabled", &self.settings.enabled())
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
