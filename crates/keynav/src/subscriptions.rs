//! Event Subscriptions
//!
//! Scoped ownership of document listeners. Each subscription pairs a
//! listener id with the handler tag its owner dispatches on.

use keynav_dom::{Document, EventTarget, EventType, ListenerId};

/// Listeners acquired by one owner
#[derive(Debug)]
pub struct EventSubscriptionManager<H> {
    added: Vec<(ListenerId, H)>,
}

impl<H> Default for EventSubscriptionManager<H> {
    fn default() -> Self {
        Self { added: Vec::new() }
    }
}

impl<H: Copy> EventSubscriptionManager<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to `event_type` on `target`; the returned id
    /// is the unsubscribe handle
    pub fn add_event(
        &mut self,
        document: &mut Document,
        target: EventTarget,
        event_type: EventType,
        handler: H,
    ) -> ListenerId {
        let id = document.add_listener(target, event_type);
        self.added.push((id, handler));
        id
    }

    /// Release a single subscription; false if it is not ours or already gone
    pub fn remove_event(&mut self, document: &mut Document, id: ListenerId) -> bool {
        match self.added.iter().position(|&(added, _)| added == id) {
            Some(index) => {
                self.added.remove(index);
                document.remove_listener(id)
            }
            None => false,
        }
    }

    /// Handler tag for a listener id this manager acquired
    pub fn handler(&self, id: ListenerId) -> Option<H> {
        self.added
            .iter()
            .find(|&&(added, _)| added == id)
            .map(|&(_, handler)| handler)
    }

    /// Release every subscription acquired so far, each exactly once.
    /// The manager stays usable for fresh subscriptions.
    pub fn remove_added_events(&mut self, document: &mut Document) -> usize {
        let released = self
            .added
            .drain(..)
            .filter(|&(id, _)| document.remove_listener(id))
            .count();
        if released > 0 {
            tracing::debug!("Released {} event subscriptions", released);
        }
        released
    }

    pub fn len(&self) -> usize {
        self.added.len()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }
}
