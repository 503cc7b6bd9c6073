//! Typed publish/subscribe channel used at the adapter boundary.
//!
//! The world broadcasts facts through plain `Vec<Event>` batches; this
//! channel lets an adapter fan those batches out to interested collaborators
//! (displays, sound cues, scene transitions) without ambient global
//! emitters. Every subscription is identified by a handle so a collaborator
//! torn down mid-session can dispose its subscription explicitly instead of
//! leaking a callback into a dead scene.

use std::fmt;

/// Handle identifying a single subscription on an [`EventChannel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u32);

impl SubscriptionId {
    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Dispatcher that forwards published values to registered handlers.
pub struct EventChannel<E> {
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&E)>)>,
    next_id: u32,
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E> EventChannel<E> {
    /// Creates an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler and returns the handle required to remove it.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Removes the handler behind the provided handle.
    ///
    /// Returns `true` when a subscription was removed, `false` when the
    /// handle was already disposed. Disposing twice is a harmless no-op.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(handle, _)| *handle != id);
        self.subscribers.len() != before
    }

    /// Forwards a single value to every registered handler in order.
    pub fn publish(&mut self, event: &E) {
        for (_, handler) in &mut self.subscribers {
            handler(event);
        }
    }

    /// Forwards every value in the batch to every registered handler.
    pub fn publish_all(&mut self, events: &[E]) {
        for event in events {
            self.publish(event);
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::EventChannel;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn publish_reaches_every_subscriber_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut channel: EventChannel<u32> = EventChannel::new();

        let first = Rc::clone(&seen);
        let _ = channel.subscribe(move |value| first.borrow_mut().push(("first", *value)));
        let second = Rc::clone(&seen);
        let _ = channel.subscribe(move |value| second.borrow_mut().push(("second", *value)));

        channel.publish_all(&[7, 9]);

        assert_eq!(
            *seen.borrow(),
            vec![("first", 7), ("second", 7), ("first", 9), ("second", 9)]
        );
    }

    #[test]
    fn unsubscribed_handler_stops_receiving() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut channel: EventChannel<u32> = EventChannel::new();

        let sink = Rc::clone(&seen);
        let id = channel.subscribe(move |value| sink.borrow_mut().push(*value));
        channel.publish(&1);

        assert!(channel.unsubscribe(id));
        assert!(!channel.unsubscribe(id), "double disposal is a no-op");
        channel.publish(&2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(channel.subscriber_count(), 0);
    }
}
