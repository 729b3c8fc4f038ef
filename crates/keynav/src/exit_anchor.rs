//! Exit Anchor
//!
//! Empty focusable sentinel placed right after the widget. Native tab
//! order reaches it after the widget and returns from it to the widget,
//! so one element covers both the forward-exit and the
//! backward-reentry role.

use keynav_dom::{Document, ListenerId, NodeId};

use crate::{CauseState, NavError};

/// Attribute marking exit anchors
pub const ANCHOR_ATTRIBUTE: &str = "data-keynav-exit-anchor";

/// What a focus landing on the anchor means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorRole {
    /// Focus is passing out of the widget; native order continues from here
    ForwardExit,
    /// Native backward tabbing arrived from after the widget
    BackwardReentry,
}

impl AnchorRole {
    /// Our own programmatic placement, or focus coming straight out of the
    /// widget, is an exit. Anything else is a user tabbing back in.
    pub fn classify(cause: CauseState, from_widget: bool) -> Self {
        if cause == CauseState::ProgrammaticExit || from_widget {
            Self::ForwardExit
        } else {
            Self::BackwardReentry
        }
    }
}

/// Mounted sentinel element
#[derive(Debug)]
pub struct ExitAnchor {
    node: NodeId,
    subscription: Option<ListenerId>,
}

impl ExitAnchor {
    /// Insert a sentinel directly after `widget`, with the widget's tab
    /// stop value. Fails when the widget has no parent to hold it.
    pub fn mount(document: &mut Document, widget: NodeId, tabindex: i32) -> Result<Self, NavError> {
        if !document.tree().is_attached(widget) || document.tree().parent(widget).is_none() {
            return Err(NavError::MountUnavailable(widget));
        }

        let node = document.tree_mut().create_element("div");
        document.set_attribute(node, ANCHOR_ATTRIBUTE, "")?;
        document.set_attribute(node, "aria-hidden", "false")?;
        document.set_tab_index(node, tabindex)?;
        document.tree_mut().insert_after(widget, node)?;

        tracing::debug!("Mounted exit anchor {:?} after {:?}", node, widget);
        Ok(Self {
            node,
            subscription: None,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Listener id of the anchor's focus subscription
    pub fn subscription(&self) -> Option<ListenerId> {
        self.subscription
    }

    pub(crate) fn set_subscription(&mut self, id: ListenerId) {
        self.subscription = Some(id);
    }

    /// Mirror the widget's tab stop value
    pub fn set_tabindex(&self, document: &mut Document, tabindex: i32) -> Result<(), NavError> {
        Ok(document.set_tab_index(self.node, tabindex)?)
    }

    /// Take the sentinel out of the document
    pub fn remove(self, document: &mut Document) {
        if let Err(err) = document.detach(self.node) {
            tracing::warn!("Exit anchor removal failed: {}", err);
            return;
        }
        tracing::debug!("Removed exit anchor {:?}", self.node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_after_widget() {
        let mut doc = Document::new();
        let body = doc.body();
        let widget = doc.create_child(body, "div").unwrap();
        let after = doc.create_child(body, "button").unwrap();

        let anchor = ExitAnchor::mount(&mut doc, widget, 0).unwrap();
        let children: Vec<_> = doc.tree().children(body).collect();
        assert_eq!(children, vec![widget, anchor.node(), after]);
        assert!(doc.has_attribute(anchor.node(), ANCHOR_ATTRIBUTE));
        assert_eq!(doc.attribute(anchor.node(), "tabindex"), Some("0"));
    }

    #[test]
    fn test_mount_without_parent() {
        let mut doc = Document::new();
        let detached = doc.tree_mut().create_element("div");
        let err = ExitAnchor::mount(&mut doc, detached, 0).unwrap_err();
        assert!(matches!(err, NavError::MountUnavailable(id) if id == detached));
    }

    #[test]
    fn test_remove_and_mirror_tabindex() {
        let mut doc = Document::new();
        let body = doc.body();
        let widget = doc.create_child(body, "div").unwrap();
        let anchor = ExitAnchor::mount(&mut doc, widget, 0).unwrap();
        anchor.set_tabindex(&mut doc, 3).unwrap();
        assert_eq!(doc.attribute(anchor.node(), "tabindex"), Some("3"));

        let node = anchor.node();
        anchor.remove(&mut doc);
        assert!(!doc.tree().is_attached(node));
    }

    #[test]
    fn test_classify() {
        assert_eq!(AnchorRole::classify(CauseState::ProgrammaticExit, false), AnchorRole::ForwardExit);
        assert_eq!(AnchorRole::classify(CauseState::Idle, true), AnchorRole::ForwardExit);
        assert_eq!(AnchorRole::classify(CauseState::Idle, false), AnchorRole::BackwardReentry);
        assert_eq!(AnchorRole::classify(CauseState::PointerReset, false), AnchorRole::BackwardReentry);
    }
}
