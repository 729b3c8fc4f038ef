//! Widget Registry
//!
//! Every live coordinator on a page, plus the one document-level Escape
//! subscription they share. The subscription exists exactly while at
//! least one widget is registered.

use keynav_dom::{Document, DomEvent, EventTarget, EventType, Key, ListenerId};

use crate::{EventSubscriptionManager, FocusNavigationCoordinator, NavError};

/// Registered widget handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegistryHandler {
    Escape,
}

/// Live widgets in registration order
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    widgets: Vec<(WidgetId, FocusNavigationCoordinator)>,
    next_id: u32,
    escape: EventSubscriptionManager<RegistryHandler>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a coordinator
    pub fn register(&mut self, document: &mut Document, coordinator: FocusNavigationCoordinator) -> WidgetId {
        if self.escape.is_empty() {
            self.escape.add_event(
                document,
                EventTarget::Document,
                EventType::KeyDown,
                RegistryHandler::Escape,
            );
            tracing::debug!("Subscribed document Escape handling");
        }

        let id = WidgetId(self.next_id);
        self.next_id += 1;
        self.widgets.push((id, coordinator));
        id
    }

    /// Tear down and remove a widget. The last one out releases the
    /// Escape subscription.
    pub fn unregister(&mut self, document: &mut Document, id: WidgetId) -> Result<FocusNavigationCoordinator, NavError> {
        let index = self
            .widgets
            .iter()
            .position(|(widget, _)| *widget == id)
            .ok_or(NavError::UnknownWidget(id))?;
        let (_, mut coordinator) = self.widgets.remove(index);
        coordinator.teardown(document);

        if self.widgets.is_empty() && self.escape.remove_added_events(document) > 0 {
            tracing::debug!("Released document Escape handling");
        }
        Ok(coordinator)
    }

    pub fn get(&self, id: WidgetId) -> Option<&FocusNavigationCoordinator> {
        self.widgets
            .iter()
            .find(|(widget, _)| *widget == id)
            .map(|(_, coordinator)| coordinator)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut FocusNavigationCoordinator> {
        self.widgets
            .iter_mut()
            .find(|(widget, _)| *widget == id)
            .map(|(_, coordinator)| coordinator)
    }

    pub fn ids(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.widgets.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Check if the shared Escape listener is subscribed
    pub fn has_escape_listener(&self) -> bool {
        !self.escape.is_empty()
    }

    /// Hand a delivered event to whichever owner holds `listener`
    pub fn dispatch(&mut self, document: &mut Document, listener: ListenerId, event: &mut DomEvent) -> bool {
        if self.escape.handler(listener).is_some() {
            if event.is_key(&Key::Escape) && self.broadcast_dismiss(document) {
                event.prevent_default();
            }
            return true;
        }
        self.widgets
            .iter_mut()
            .any(|(_, coordinator)| coordinator.handle_event(document, listener, event))
    }

    /// Ask every widget to dismiss its overlays; true if any did
    pub fn broadcast_dismiss(&mut self, document: &mut Document) -> bool {
        let dismissed = self
            .widgets
            .iter_mut()
            .fold(false, |dismissed, (_, coordinator)| coordinator.dismiss(document) | dismissed);
        tracing::debug!("Escape broadcast to {} widgets, dismissed: {}", self.widgets.len(), dismissed);
        dismissed
    }
}
