//! Command bus - synchronous publish/subscribe for command events
//!
//! Fan-out order is subscription order. `publish` invokes handlers from a
//! snapshot taken before the first call and never holds the registry lock
//! while a handler runs, so handlers may subscribe or unsubscribe freely.
//! Such changes take effect from the next publish.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use voxkart_core::CommandEvent;

/// Handler invoked for every published command event
pub type CommandHandler = Arc<dyn Fn(&CommandEvent) + Send + Sync>;

/// Handle returned by [`CommandBus::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(SubscriptionId, CommandHandler)>,
}

/// Command bus
///
/// Cheap to clone; clones share the same subscriber registry.
#[derive(Clone, Default)]
pub struct CommandBus {
    registry: Arc<Mutex<Registry>>,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. It runs after every handler subscribed before it.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&CommandEvent) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.handlers.push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.lock();
        let before = registry.handlers.len();
        registry.handlers.retain(|(sid, _)| *sid != id);
        registry.handlers.len() != before
    }

    /// Deliver an event to every current subscriber.
    /// Returns the number of handlers invoked.
    pub fn publish(&self, event: CommandEvent) -> usize {
        let snapshot: Vec<CommandHandler> = self
            .registry
            .lock()
            .handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in &snapshot {
            handler(&event);
        }
        snapshot.len()
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.registry.lock().handlers.iter().any(|(sid, _)| *sid == id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().handlers.len()
    }
}

impl fmt::Debug for CommandBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
