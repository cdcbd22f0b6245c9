//! Settings provider for the watchdog's `enabled` flag.

use parking_lot::RwLock;

/// Live source of the watchdog's enabled flag.
///
/// The flag is owned by the host and may change at any time; the watchdog
/// re-reads it on every entry point instead of caching it.
pub trait SettingsProvider: Send + Sync {
    /// Whether inactivity monitoring is currently enabled.
    fn enabled(&self) -> bool;
}

/// Thread-safe settings holder shared between a host and its watchdog.
#[derive(Debug)]
pub struct SharedSettings {
    enabled: RwLock<bool>,
}

impl SharedSettings {
    /// Create settings with the given initial flag.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: RwLock::new(enabled),
        }
    }

    /// Update the flag. Returns the previous value.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        let mut flag = self.enabled.write();
        std::mem::replace(&mut *flag, enabled)
    }
}

impl Default for SharedSettings {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SettingsProvider for SharedSettings {
    fn enabled(&self) -> bool {
        *self.enabled.read()
    }
}
