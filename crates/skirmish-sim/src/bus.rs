//! Observer registry for combat events.
//!
//! The engine publishes every event of a tick, in order, to each registered
//! observer. Observers are keyed by opaque handles so they can be removed.

use std::collections::BTreeMap;
use std::fmt;

use skirmish_core::events::CombatEvent;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&CombatEvent) + Send + 'static>;

#[derive(Default)]
pub struct EventBus {
    next_key: u64,
    // Ordered so observers run in subscription order.
    observers: BTreeMap<SubscriptionId, Observer>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("next_key", &self.next_key)
            .field("observer_count", &self.observers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&CombatEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_key);
        self.next_key += 1;
        self.observers.insert(id, Box::new(observer));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(&id).is_some()
    }

    pub fn publish(&mut self, events: &[CombatEvent]) {
        if self.observers.is_empty() {
            return;
        }
        for event in events {
            for observer in self.observers.values_mut() {
                observer(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
