//! Activity events and the host capability that delivers them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::WatchdogError;

/// Kind of user interaction reported by the host input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// Pointer button pressed.
    #[serde(rename = "mousedown", alias = "pointerdown")]
    PointerDown,
    /// Keyboard key pressed.
    #[serde(rename = "keydown")]
    KeyDown,
    /// Scroll of any scrollable surface.
    Scroll,
    /// Touch contact started.
    #[serde(rename = "touchstart")]
    TouchStart,
    /// Click completed.
    Click,
}

impl ActivityKind {
    /// Every activity kind, in host subscription order.
    pub const ALL: [Self; 5] = [
        Self::PointerDown,
        Self::KeyDown,
        Self::Scroll,
        Self::TouchStart,
        Self::Click,
    ];

    /// Host event name for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PointerDown => "mousedown",
            Self::KeyDown => "keydown",
            Self::Scroll => "scroll",
            Self::TouchStart => "touchstart",
            Self::Click => "click",
        }
    }
}

impl core::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = WatchdogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mousedown" | "pointerdown" => Ok(Self::PointerDown),
            "keydown" => Ok(Self::KeyDown),
            "scroll" => Ok(Self::Scroll),
            "touchstart" => Ok(Self::TouchStart),
            "click" => Ok(Self::Click),
            _ => Err(WatchdogError::invalid_activity_kind(s)),
        }
    }
}

/// Identifier of an active subscription on an [`ActivitySource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(
    /// Source-assigned raw id.
    pub u64,
);

/// Host capability for subscribing to user activity.
///
/// The watchdog holds at most one subscription at a time. Delivery of the
/// subscribed events back into the watchdog is the host's job: it calls
/// [`ActivityWatchdog::on_activity`](crate::ActivityWatchdog::on_activity)
/// for each event. Implementations must not deliver events for a
/// subscription after `unsubscribe` returns.
pub trait ActivitySource {
    /// Start listening for the given activity kinds.
    fn subscribe(&mut self, kinds: &[ActivityKind]) -> SubscriptionId;

    /// Stop listening. Unknown ids are ignored.
    fn unsubscribe(&mut self, id: SubscriptionId);
}

impl<T: ActivitySource + ?Sized> ActivitySource for Box<T> {
    fn subscribe(&mut self, kinds: &[ActivityKind]) -> SubscriptionId {
        (**self).subscribe(kinds)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        (**self).unsubscribe(id);
    }
}
