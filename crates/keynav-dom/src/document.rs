//! Document - host surface for widgets
//!
//! Owns the tree, native focus, pointer hover, the focus indicator and
//! the queue of events waiting to be delivered.

use std::collections::VecDeque;

use crate::focus::{is_hidden, tab_order};
use crate::{
    DomError, DomEvent, DomTree, EventTarget, EventType, Key, ListenerId, ListenerRegistry,
    NodeId, TabIndex,
};

/// Document with a single `<body>`
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    body: NodeId,
    focused: Option<NodeId>,
    hovered: Option<NodeId>,
    focus_indicator: Option<NodeId>,
    listeners: ListenerRegistry,
    pending: VecDeque<DomEvent>,
}

impl Document {
    /// Create a document with an empty body
    pub fn new() -> Self {
        let mut tree = DomTree::new();
        let body = tree.create_element("body");
        // Root is always valid and body is freshly created
        let _ = tree.append_child(tree.root(), body);

        Self {
            tree,
            body,
            focused: None,
            hovered: None,
            focus_indicator: None,
            listeners: ListenerRegistry::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create an element and append it to `parent`
    pub fn create_child(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, DomError> {
        let id = self.tree.create_element(tag);
        self.tree.append_child(parent, id)?;
        Ok(id)
    }

    /// Detach a node, dropping focus, hover and indicator inside it
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        self.tree.detach(node)?;
        let tree = &self.tree;
        let inside = |slot: Option<NodeId>| slot.is_some_and(|id| tree.contains(node, id));
        if inside(self.focused) {
            tracing::trace!("Focused node detached, focus returns to the document");
            self.focused = None;
        }
        if inside(self.hovered) {
            self.hovered = None;
        }
        if inside(self.focus_indicator) {
            self.focus_indicator = None;
        }
        Ok(())
    }

    // === Attributes ===

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.get(node)?.attributes.get_attribute(name)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let element = self.tree.get_mut(node).ok_or(DomError::UnknownNode(node))?;
        element.attributes.set_attribute(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let element = self.tree.get_mut(node).ok_or(DomError::UnknownNode(node))?;
        Ok(element.attributes.remove_attribute(name))
    }

    /// Parsed `tabindex`; None when absent or malformed
    pub fn tab_index(&self, node: NodeId) -> Option<TabIndex> {
        self.attribute(node, "tabindex")
            .and_then(|value| TabIndex::parse(value).ok())
    }

    pub fn set_tab_index(&mut self, node: NodeId, value: i32) -> Result<(), DomError> {
        self.set_attribute(node, "tabindex", &value.to_string())
    }

    /// Check if a node is rendered (attached and not hidden)
    pub fn is_rendered(&self, node: NodeId) -> bool {
        self.tree.is_attached(node) && !is_hidden(&self.tree, node)
    }

    // === Focus ===

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Check if a node can take focus at all
    pub fn is_focusable(&self, node: NodeId) -> bool {
        node != self.tree.root() && self.is_rendered(node) && self.tab_index(node).is_some()
    }

    /// Move native focus and queue a Focus event.
    ///
    /// Returns false when the node cannot take focus or already has it;
    /// no event is queued in that case.
    pub fn focus(&mut self, node: NodeId) -> bool {
        if !self.is_focusable(node) {
            tracing::trace!("Ignoring focus on non-focusable {:?}", node);
            return false;
        }
        if self.focused == Some(node) {
            return false;
        }

        let previous = self.focused.replace(node);
        self.pending.push_back(DomEvent::focus(node, previous));
        tracing::trace!("Focus {:?} -> {:?}", previous, node);
        true
    }

    /// Drop focus back to the document
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Check for a queued Focus event aimed at `node`
    pub fn focus_pending(&self, node: NodeId) -> bool {
        self.pending
            .iter()
            .any(|e| e.event_type == EventType::Focus && e.target == EventTarget::Node(node))
    }

    /// Next stop in sequential order from `from`; None past either end
    pub fn next_tab_stop(&self, from: Option<NodeId>, backward: bool) -> Option<NodeId> {
        let order = tab_order(&self.tree);
        let Some(from) = from else {
            return if backward { order.last().copied() } else { order.first().copied() };
        };

        if let Some(position) = order.iter().position(|&id| id == from) {
            return if backward {
                position.checked_sub(1).map(|p| order[p])
            } else {
                order.get(position + 1).copied()
            };
        }

        // `from` is not a tab stop itself: continue from its tree position
        let positions = self.tree.descendants(self.tree.root());
        let rank = |id: NodeId| positions.iter().position(|&p| p == id);
        let from_rank = rank(from)?;
        if backward {
            order.iter().rev().copied().find(|&id| rank(id).is_some_and(|r| r < from_rank))
        } else {
            order.iter().copied().find(|&id| rank(id).is_some_and(|r| r > from_rank))
        }
    }

    /// Native Tab / Shift+Tab: move to the next stop or leave the document
    pub fn sequential_focus(&mut self, backward: bool) -> Option<NodeId> {
        match self.next_tab_stop(self.focused, backward) {
            Some(next) => {
                self.focus(next);
                Some(next)
            }
            None => {
                tracing::trace!("Sequential focus left the document");
                self.blur();
                None
            }
        }
    }

    // === Pointer ===

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Move the pointer over `target`, queueing leave events for the
    /// chain that was left (innermost first) and enter events for the
    /// chain that was entered (outermost first).
    pub fn pointer_move(&mut self, target: Option<NodeId>) {
        let chain = |node: Option<NodeId>| -> Vec<NodeId> {
            match node {
                Some(id) => std::iter::once(id).chain(self.tree.ancestors(id)).collect(),
                None => Vec::new(),
            }
        };
        let old = chain(self.hovered);
        let new = chain(target);

        for &id in old.iter().filter(|id| !new.contains(id)) {
            self.pending.push_back(DomEvent::pointer(EventType::PointerLeave, EventTarget::Node(id)));
        }
        for &id in new.iter().rev().filter(|id| !old.contains(id)) {
            self.pending.push_back(DomEvent::pointer(EventType::PointerEnter, EventTarget::Node(id)));
        }
        self.hovered = target;
    }

    // === Focus indicator ===

    pub fn focus_indicator(&self) -> Option<NodeId> {
        self.focus_indicator
    }

    pub fn show_focus_indicator(&mut self, node: NodeId) {
        self.focus_indicator = Some(node);
    }

    /// Clear the indicator, returning where it was shown
    pub fn clear_focus_indicator(&mut self) -> Option<NodeId> {
        self.focus_indicator.take()
    }

    // === Listeners and dispatch ===

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn add_listener(&mut self, target: EventTarget, event_type: EventType) -> ListenerId {
        self.listeners.add(target, event_type)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.contains(id)
    }

    /// Listener ids an event reaches, in propagation order
    pub fn route(&self, event: &DomEvent) -> Vec<ListenerId> {
        self.listeners.route(&self.tree, event)
    }

    /// Queue an event for delivery
    pub fn queue(&mut self, event: DomEvent) {
        self.pending.push_back(event);
    }

    /// Take the next queued event
    pub fn next_event(&mut self) -> Option<DomEvent> {
        self.pending.pop_front()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Run the platform default for a delivered event
    pub fn run_default_action(&mut self, event: &DomEvent) {
        if event.is_default_prevented() {
            return;
        }
        match event.event_type {
            EventType::KeyDown if event.is_key(&Key::Tab) => {
                self.sequential_focus(event.modifiers.shift);
            }
            EventType::PointerDown => {
                let target = event.target_node().and_then(|node| {
                    std::iter::once(node)
                        .chain(self.tree.ancestors(node))
                        .find(|&id| self.is_focusable(id))
                });
                match target {
                    Some(node) => {
                        self.focus(node);
                    }
                    None => self.blur(),
                }
            }
            _ => {}
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
