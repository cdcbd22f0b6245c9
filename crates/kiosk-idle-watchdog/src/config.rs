//! Configuration types for the idle watchdog.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::activity::ActivityKind;
use crate::error::{WatchdogError, WatchdogResult};

/// Default inactivity period before the warning appears.
pub const DEFAULT_PRIMARY_TIMEOUT_MS: u64 = 8_000;

/// Default period between the warning appearing and escalation.
pub const DEFAULT_GRACE_TIMEOUT_MS: u64 = 10_000;

/// Upper bound for either timeout (one day).
pub const MAX_TIMEOUT_MS: u64 = 86_400_000;

/// Idle watchdog configuration.
///
/// The `enabled` flag is not part of it: it lives in the host's
/// [`SettingsProvider`](crate::SettingsProvider) and may change at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchdogConfig {
    /// Inactivity period before the warning appears, in milliseconds.
    ///
    /// Default: 8000ms.
    pub primary_timeout_ms: u64,

    /// Period after the warning appears before escalation, in milliseconds.
    ///
    /// Default: 10000ms.
    pub grace_timeout_ms: u64,

    /// Activity kinds that reset the inactivity window.
    ///
    /// Default: all kinds.
    pub activity_kinds: Vec<ActivityKind>,
}

impl WatchdogConfig {
    /// Create a configuration with the given timeouts and all activity kinds.
    ///
    /// # Errors
    ///
    /// Returns an error if either timeout is outside `1..=MAX_TIMEOUT_MS`.
    pub fn new(primary_timeout_ms: u64, grace_timeout_ms: u64) -> WatchdogResult<Self> {
        let config = Self {
            primary_timeout_ms,
            grace_timeout_ms,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> WatchdogConfigBuilder {
        WatchdogConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> WatchdogResult<()> {
        if !(1..=MAX_TIMEOUT_MS).contains(&self.primary_timeout_ms) {
            return Err(WatchdogError::invalid_configuration(format!(
                "primary_timeout_ms must be between 1 and {MAX_TIMEOUT_MS}"
            )));
        }
        if !(1..=MAX_TIMEOUT_MS).contains(&self.grace_timeout_ms) {
            return Err(WatchdogError::invalid_configuration(format!(
                "grace_timeout_ms must be between 1 and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.activity_kinds.is_empty() {
            return Err(WatchdogError::invalid_configuration(
                "activity_kinds must not be empty",
            ));
        }
        Ok(())
    }

    /// Inactivity period as a `Duration`.
    #[must_use]
    pub fn primary_timeout(&self) -> Duration {
        Duration::from_millis(self.primary_timeout_ms)
    }

    /// Grace period as a `Duration`.
    #[must_use]
    pub fn grace_timeout(&self) -> Duration {
        Duration::from_millis(self.grace_timeout_ms)
    }

    /// Whether `kind` resets the inactivity window.
    #[must_use]
    pub fn tracks(&self, kind: ActivityKind) -> bool {
        self.activity_kinds.contains(&kind)
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            primary_timeout_ms: DEFAULT_PRIMARY_TIMEOUT_MS,
            grace_timeout_ms: DEFAULT_GRACE_TIMEOUT_MS,
            activity_kinds: ActivityKind::ALL.to_vec(),
        }
    }
}

/// Builder for `WatchdogConfig`.
#[derive(Debug, Default)]
pub struct WatchdogConfigBuilder {
    config: WatchdogConfig,
}

impl WatchdogConfigBuilder {
    /// Set the inactivity period in milliseconds.
    #[must_use]
    pub fn primary_timeout_ms(mut self, ms: u64) -> Self {
        self.config.primary_timeout_ms = ms;
        self
    }

    /// Set the grace period in milliseconds.
    #[must_use]
    pub fn grace_timeout_ms(mut self, ms: u64) -> Self {
        self.config.grace_timeout_ms = ms;
        self
    }

    /// Replace the tracked activity kinds.
    #[must_use]
    pub fn activity_kinds(mut self, kinds: impl IntoIterator<Item = ActivityKind>) -> Self {
        let mut kinds: Vec<ActivityKind> = kinds.into_iter().collect();
        kinds.sort_unstable();
        kinds.dedup();
        self.config.activity_kinds = kinds;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> WatchdogResult<WatchdogConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
