//! Input Events
//!
//! Keyboard, focus and pointer events delivered to document listeners.

use crate::NodeId;

/// Event types the document delivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    KeyDown,
    Focus,
    PointerDown,
    PointerUp,
    PointerEnter,
    PointerLeave,
}

impl EventType {
    /// Check if this event type bubbles to ancestors and the document
    pub fn bubbles(&self) -> bool {
        !matches!(
            self,
            EventType::Focus | EventType::PointerEnter | EventType::PointerLeave
        )
    }
}

/// Where a listener is attached, or where an event is aimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Document,
    Node(NodeId),
}

impl From<NodeId> for EventTarget {
    fn from(id: NodeId) -> Self {
        EventTarget::Node(id)
    }
}

/// Key value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Character(char),

    // Navigation
    ArrowUp, ArrowDown, ArrowLeft, ArrowRight,
    Home, End, PageUp, PageDown,

    // Editing
    Backspace, Delete,
    Enter, Tab, Escape,

    Space,

    Unidentified(String),
}

impl Key {
    /// Parse from key string
    pub fn parse(s: &str) -> Self {
        match s {
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Escape" | "Esc" => Self::Escape,
            " " | "Space" => Self::Space,
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Character(c),
                    _ => Self::Unidentified(s.to_string()),
                }
            }
        }
    }
}

/// Key modifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    /// Shift only
    pub fn shift() -> Self {
        Self { shift: true, ..Default::default() }
    }

    /// Check if any modifier is pressed
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Dispatched event
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub event_type: EventType,
    pub target: EventTarget,
    /// Previously focused node for focus events
    pub related_target: Option<NodeId>,
    /// Key for KeyDown events
    pub key: Option<Key>,
    pub modifiers: KeyModifiers,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    fn new(event_type: EventType, target: EventTarget) -> Self {
        Self {
            event_type,
            target,
            related_target: None,
            key: None,
            modifiers: KeyModifiers::default(),
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Create a key down event
    pub fn key_down(target: EventTarget, key: Key, modifiers: KeyModifiers) -> Self {
        Self {
            key: Some(key),
            modifiers,
            ..Self::new(EventType::KeyDown, target)
        }
    }

    /// Create a focus event; `related` is the node that lost focus
    pub fn focus(target: NodeId, related: Option<NodeId>) -> Self {
        Self {
            related_target: related,
            ..Self::new(EventType::Focus, EventTarget::Node(target))
        }
    }

    /// Create a pointer event
    pub fn pointer(event_type: EventType, target: EventTarget) -> Self {
        Self::new(event_type, target)
    }

    /// Target node, if aimed at one
    pub fn target_node(&self) -> Option<NodeId> {
        match self.target {
            EventTarget::Node(id) => Some(id),
            EventTarget::Document => None,
        }
    }

    /// Check the key of a KeyDown event
    pub fn is_key(&self, key: &Key) -> bool {
        self.key.as_ref() == Some(key)
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Stop propagation to further listeners
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse() {
        assert_eq!(Key::parse("ArrowUp"), Key::ArrowUp);
        assert_eq!(Key::parse("a"), Key::Character('a'));
        assert_eq!(Key::parse("Esc"), Key::Escape);
        assert_eq!(Key::parse(" "), Key::Space);
        assert_eq!(Key::parse("F13"), Key::Unidentified("F13".to_string()));
    }

    #[test]
    fn test_bubbling() {
        assert!(EventType::KeyDown.bubbles());
        assert!(EventType::PointerUp.bubbles());
        assert!(!EventType::Focus.bubbles());
        assert!(!EventType::PointerEnter.bubbles());
    }

    #[test]
    fn test_key_down_event() {
        let mut event = DomEvent::key_down(EventTarget::Document, Key::Tab, KeyModifiers::shift());
        assert!(event.is_key(&Key::Tab));
        assert!(event.modifiers.any());
        assert_eq!(event.target_node(), None);

        event.prevent_default();
        assert!(event.is_default_prevented());
        assert!(!event.is_propagation_stopped());
    }
}
