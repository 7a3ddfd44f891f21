//! Observer registration for [`StackEvent`]s.
//!
//! Observers are notified synchronously, in subscription order, from inside
//! the call that produced the event.

use crate::types::StackEvent;

/// Receiver of core notifications.
pub trait StackObserver {
    fn notify(&mut self, event: &StackEvent);
}

impl<F> StackObserver for F
where
    F: FnMut(&StackEvent),
{
    fn notify(&mut self, event: &StackEvent) {
        self(event)
    }
}

/// Token returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct EventBus {
    observers: Vec<(SubscriptionId, Box<dyn StackObserver>)>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn StackObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Remove an observer and hand it back to the caller.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Option<Box<dyn StackObserver>> {
        let index = self.observers.iter().position(|(sid, _)| *sid == id)?;
        Some(self.observers.remove(index).1)
    }

    pub fn emit(&mut self, event: StackEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer.notify(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
