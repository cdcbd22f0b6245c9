//! Watchdog status, transition causes and metrics.

use serde::{Deserialize, Serialize};

/// Observable state of the watchdog.
///
/// ```text
///            attach()/enable
/// Disarmed ─────────────────► Idle ◄──── activity (re-arm primary)
///    ▲  ▲                      │  ▲
///    │  │        primary fires │  │ stay() / dismiss()
///    │  │                      ▼  │
///    │  └──── go_home() ──── Warning
///    │        grace fires      │
///    └── detach()/disable ─────┘ (from any state)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchdogStatus {
    /// No timers, no subscriptions.
    #[default]
    Disarmed,
    /// Primary timer running, warning hidden.
    Idle,
    /// Warning visible, grace timer running.
    Warning,
}

impl WatchdogStatus {
    /// Get the status as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disarmed => "Disarmed",
            Self::Idle => "Idle",
            Self::Warning => "Warning",
        }
    }

    /// Check if the watchdog holds timers and a subscription.
    #[must_use]
    pub fn is_armed(self) -> bool {
        matches!(self, Self::Idle | Self::Warning)
    }
}

impl core::fmt::Display for WatchdogStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the watchdog is disarmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisarmReason {
    /// Never attached, or torn down by the host.
    Detached,
    /// The settings provider reports `enabled = false`.
    Disabled,
    /// The cycle ended in an escalation. The host re-attaches to start over.
    Escalated,
}

impl DisarmReason {
    /// Get the reason as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Detached => "detached",
            Self::Disabled => "disabled",
            Self::Escalated => "escalated",
        }
    }
}

impl core::fmt::Display for DisarmReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What triggered an escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationCause {
    /// The grace timer expired without acknowledgment.
    GraceExpired,
    /// The user chose "go home" from the warning.
    UserRequested,
}

impl EscalationCause {
    /// Get the cause as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GraceExpired => "grace_expired",
            Self::UserRequested => "user_requested",
        }
    }
}

impl core::fmt::Display for EscalationCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters describing what the watchdog has done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WatchdogMetrics {
    /// Transitions from `Disarmed` into `Idle`.
    pub arm_count: u64,
    /// Activity events that restarted the inactivity window.
    pub activity_resets: u64,
    /// Activity events ignored because of the current state or kind.
    pub ignored_activity: u64,
    /// Times the warning was shown.
    pub warnings_shown: u64,
    /// Explicit "stay" acknowledgments.
    pub acknowledgments: u64,
    /// Warning dismissals without an explicit choice.
    pub dismissals: u64,
    /// Escalations because the grace timer expired.
    pub grace_escalations: u64,
    /// Escalations requested by the user.
    pub user_escalations: u64,
    /// Timer fires rejected because their phase had been superseded.
    pub stale_timer_fires: u64,
    /// User commands received outside the `Warning` state.
    pub ignored_commands: u64,
}

impl WatchdogMetrics {
    /// Create a new metrics instance with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total escalations regardless of cause.
    #[must_use]
    pub fn escalations(&self) -> u64 {
        self.grace_escalations.saturating_add(self.user_escalations)
    }

    pub(crate) fn record_arm(&mut self) {
        self.arm_count = self.arm_count.saturating_add(1);
    }

    pub(crate) fn record_activity_reset(&mut self) {
        self.activity_resets = self.activity_resets.saturating_add(1);
    }

    pub(crate) fn record_ignored_activity(&mut self) {
        self.ignored_activity = self.ignored_activity.saturating_add(1);
    }

    pub(crate) fn record_warning(&mut self) {
        self.warnings_shown = self.warnings_shown.saturating_add(1);
    }

    pub(crate) fn record_acknowledgment(&mut self) {
        self.acknowledgments = self.acknowledgments.saturating_add(1);
    }

    pub(crate) fn record_dismissal(&mut self) {
        self.dismissals = self.dismissals.saturating_add(1);
    }

    pub(crate) fn record_escalation(&mut self, cause: EscalationCause) {
        match cause {
            EscalationCause::GraceExpired => {
                self.grace_escalations = self.grace_escalations.saturating_add(1);
            }
            EscalationCause::UserRequested => {
                self.user_escalations = self.user_escalations.saturating_add(1);
            }
        }
    }

    pub(crate) fn record_stale_fire(&mut self) {
        self.stale_timer_fires = self.stale_timer_fires.saturating_add(1);
    }

    pub(crate) fn record_ignored_command(&mut self) {
        self.ignored_commands = self.ignored_commands.saturating_add(1);
    }
}

/// Point-in-time view of a watchdog, suitable for publishing to a UI.
///
/// The default is the view of a freshly created, detached watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogSnapshot {
    /// Current status.
    pub status: WatchdogStatus,
    /// Why the watchdog is disarmed, if it is.
    pub disarm_reason: Option<DisarmReason>,
    /// Whether the host should render the warning.
    pub warning_visible: bool,
    /// Counters at the time of the snapshot.
    pub metrics: WatchdogMetrics,
}

impl Default for WatchdogSnapshot {
    fn default() -> Self {
        Self {
            status: WatchdogStatus::Disarmed,
            disarm_reason: Some(DisarmReason::Detached),
            warning_visible: false,
            metrics: WatchdogMetrics::new(),
        }
    }
}
