//! Channel-backed activity source and the publisher side handed to hosts.

use std::collections::HashMap;
use std::sync::Arc;

use kiosk_idle_watchdog::{ActivityKind, ActivitySource, SubscriptionId};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::{RuntimeError, RuntimeResult};
use crate::event::HostEvent;

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    active: HashMap<SubscriptionId, Vec<ActivityKind>>,
}

impl Registry {
    fn listens_for(&self, kind: ActivityKind) -> bool {
        self.active.values().any(|kinds| kinds.contains(&kind))
    }
}

/// [`ActivitySource`] owned by the watchdog inside the service loop.
///
/// Subscriptions are recorded in a registry shared with every
/// [`ActivityFeed`]; the feed only forwards kinds someone subscribed to.
#[derive(Debug)]
pub struct ChannelActivitySource {
    registry: Arc<RwLock<Registry>>,
}

impl ChannelActivitySource {
    pub(crate) fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
        }
    }

    pub(crate) fn feed(&self, events: mpsc::UnboundedSender<HostEvent>) -> ActivityFeed {
        ActivityFeed {
            registry: Arc::clone(&self.registry),
            events,
        }
    }
}

impl ActivitySource for ChannelActivitySource {
    fn subscribe(&mut self, kinds: &[ActivityKind]) -> SubscriptionId {
        let mut registry = self.registry.write();
        registry.next_id = registry.next_id.wrapping_add(1);
        let id = SubscriptionId(registry.next_id);
        registry.active.insert(id, kinds.to_vec());
        trace!(subscription = id.0, kinds = kinds.len(), "Activity subscription added");
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        if self.registry.write().active.remove(&id).is_some() {
            trace!(subscription = id.0, "Activity subscription removed");
        }
    }
}

/// Publisher for raw input events.
///
/// Cheap to clone; give one to each input adapter. Events are dropped at
/// the source while nothing is subscribed to their kind, so a disabled or
/// torn-down watchdog never sees them.
#[derive(Debug, Clone)]
pub struct ActivityFeed {
    registry: Arc<RwLock<Registry>>,
    events: mpsc::UnboundedSender<HostEvent>,
}

impl ActivityFeed {
    /// Whether an event of `kind` would currently be delivered.
    #[must_use]
    pub fn is_listening(&self, kind: ActivityKind) -> bool {
        self.registry.read().listens_for(kind)
    }

    /// Publish one input event.
    ///
    /// Returns `Ok(false)` when the event was dropped because nothing is
    /// subscribed to `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ServiceStopped`] if the service loop has exited.
    pub fn publish(&self, kind: ActivityKind) -> RuntimeResult<bool> {
        if !self.is_listening(kind) {
            trace!(kind = %kind, "No listener for activity; dropped");
            return Ok(false);
        }
        if self.events.send(HostEvent::Activity(kind)).is_err() {
            return Err(RuntimeError::ServiceStopped);
        }
        Ok(true)
    }
}
