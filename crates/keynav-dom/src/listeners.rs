//! Listener Registry
//!
//! Listeners are addressed by id; the owner of an id decides what runs
//! when the document routes an event to it.

use crate::{DomEvent, DomTree, EventTarget, EventType};

/// Listener handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone)]
struct Listener {
    id: ListenerId,
    target: EventTarget,
    event_type: EventType,
}

/// Registered listeners in registration order
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: Vec<Listener>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and return its handle
    pub fn add(&mut self, target: EventTarget, event_type: EventType) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener { id, target, event_type });
        id
    }

    /// Remove a listener; false if it was already gone
    pub fn remove(&mut self, id: ListenerId) -> bool {
        match self.listeners.iter().position(|l| l.id == id) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Listener ids an event reaches, in propagation order:
    /// the target, then ancestors and the document for bubbling types.
    pub fn route(&self, tree: &DomTree, event: &DomEvent) -> Vec<ListenerId> {
        let mut path = Vec::new();
        match event.target {
            EventTarget::Node(node) => {
                path.push(EventTarget::Node(node));
                if event.event_type.bubbles() {
                    path.extend(tree.ancestors(node).map(EventTarget::Node));
                    path.push(EventTarget::Document);
                }
            }
            EventTarget::Document => path.push(EventTarget::Document),
        }

        path.iter()
            .flat_map(|hop| {
                self.listeners
                    .iter()
                    .filter(move |l| l.target == *hop && l.event_type == event.event_type)
                    .map(|l| l.id)
            })
            .collect()
    }
}
