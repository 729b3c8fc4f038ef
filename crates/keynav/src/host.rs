//! Navigation Host
//!
//! Owns the document and the widget registry. Input is delivered one
//! event at a time and each runs to completion, including the events
//! its handlers and default actions queue, before the call returns.

use keynav_dom::{Document, DomError, DomEvent, EventTarget, EventType, Key, KeyModifiers, NodeId};

use crate::{
    DismissFn, FocusNavigationCoordinator, KeyboardNavigationConfig, ModuleFactories, NavError,
    WidgetId, WidgetRegistry,
};

/// Document plus every navigable widget on it
#[derive(Debug)]
pub struct NavigationHost {
    document: Document,
    registry: WidgetRegistry,
}

impl NavigationHost {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            registry: WidgetRegistry::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct document access; queued events are delivered with the next input
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    // === Widgets ===

    /// Make `widget` navigable. A configuration that cannot be built is
    /// logged and leaves the widget a plain tab stop; only an unknown
    /// node is an error.
    pub fn mount(
        &mut self,
        widget: NodeId,
        config: KeyboardNavigationConfig,
        factories: ModuleFactories,
    ) -> Result<WidgetId, NavError> {
        if self.document.tree().get(widget).is_none() {
            return Err(DomError::UnknownNode(widget).into());
        }

        let order = config.order.clone();
        let mut coordinator = FocusNavigationCoordinator::initialize(&mut self.document, widget, config, factories);
        if let Err(err) = coordinator.rebuild(&mut self.document, order) {
            tracing::warn!("Widget {:?} stays a plain tab stop: {}", widget, err);
        }
        let id = self.registry.register(&mut self.document, coordinator);
        tracing::info!("Mounted keyboard navigation on {:?} as {:?}", widget, id);
        Ok(id)
    }

    pub fn coordinator(&self, id: WidgetId) -> Option<&FocusNavigationCoordinator> {
        self.registry.get(id)
    }

    /// Replace the feature order of a mounted widget
    pub fn rebuild(&mut self, id: WidgetId, order: Vec<String>) -> Result<usize, NavError> {
        let coordinator = self.registry.get_mut(id).ok_or(NavError::UnknownWidget(id))?;
        coordinator.rebuild(&mut self.document, order)
    }

    /// Rebuild with the widget's current order, e.g. after its parent appeared
    pub fn refresh(&mut self, id: WidgetId) -> Result<usize, NavError> {
        let coordinator = self.registry.get_mut(id).ok_or(NavError::UnknownWidget(id))?;
        coordinator.refresh(&mut self.document)
    }

    /// Change a widget's tab stop value, mirrored onto its exit anchor
    pub fn set_tabindex(&mut self, id: WidgetId, tabindex: i32) -> Result<(), NavError> {
        let coordinator = self.registry.get_mut(id).ok_or(NavError::UnknownWidget(id))?;
        coordinator.set_tabindex(&mut self.document, tabindex)
    }

    /// Unmount a widget and release everything it holds
    pub fn teardown(&mut self, id: WidgetId) -> Result<(), NavError> {
        self.registry.unregister(&mut self.document, id)?;
        tracing::info!("Unmounted keyboard navigation {:?}", id);
        Ok(())
    }

    pub fn on_dismiss(&mut self, id: WidgetId, callback: DismissFn) -> Result<(), NavError> {
        let coordinator = self.registry.get_mut(id).ok_or(NavError::UnknownWidget(id))?;
        coordinator.on_dismiss(callback);
        Ok(())
    }

    // === Input ===

    /// Key press on the focused element, or the document when nothing
    /// has focus. Returns the event as delivered.
    pub fn key_down(&mut self, key: Key, modifiers: KeyModifiers) -> DomEvent {
        let target = self.document.focused().map_or(EventTarget::Document, EventTarget::Node);
        self.dispatch(DomEvent::key_down(target, key, modifiers))
    }

    /// Key press without modifiers
    pub fn press(&mut self, key: Key) -> DomEvent {
        self.key_down(key, KeyModifiers::default())
    }

    pub fn pointer_down(&mut self, target: Option<NodeId>) -> DomEvent {
        let target = target.map_or(EventTarget::Document, EventTarget::Node);
        self.dispatch(DomEvent::pointer(EventType::PointerDown, target))
    }

    pub fn pointer_up(&mut self, target: Option<NodeId>) -> DomEvent {
        let target = target.map_or(EventTarget::Document, EventTarget::Node);
        self.dispatch(DomEvent::pointer(EventType::PointerUp, target))
    }

    /// Press and release over the same target
    pub fn click(&mut self, target: Option<NodeId>) {
        self.pointer_down(target);
        self.pointer_up(target);
    }

    /// Move the pointer; None is off the page
    pub fn pointer_move(&mut self, target: Option<NodeId>) {
        self.document.pointer_move(target);
        self.run_pending();
    }

    /// Script focus, like `element.focus()`
    pub fn focus(&mut self, node: NodeId) -> bool {
        let moved = self.document.focus(node);
        self.run_pending();
        moved
    }

    // === Dispatch ===

    /// Deliver an event, then everything it queued
    pub fn dispatch(&mut self, mut event: DomEvent) -> DomEvent {
        self.deliver(&mut event);
        self.run_pending();
        event
    }

    fn run_pending(&mut self) {
        while let Some(mut event) = self.document.next_event() {
            self.deliver(&mut event);
        }
    }

    fn deliver(&mut self, event: &mut DomEvent) {
        tracing::trace!("Delivering {:?} to {:?}", event.event_type, event.target);
        for listener in self.document.route(event) {
            // Removed by an earlier handler for this same event
            if !self.document.has_listener(listener) {
                continue;
            }
            if !self.registry.dispatch(&mut self.document, listener, event) {
                tracing::trace!("No owner for listener {:?}", listener);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        self.document.run_default_action(event);
    }
}
