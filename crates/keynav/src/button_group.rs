//! Button Group Module
//!
//! Roving cursor over a fixed set of widget descendants, e.g. zoom
//! buttons or legend items. Members are found by their
//! `data-nav-group` attribute.

use keynav_dom::{Document, DomEvent, Key, NodeId};

use crate::{Direction, NavContext, NavigationModule, ResponseCode};

/// Attribute naming the group a widget descendant belongs to
pub const GROUP_ATTRIBUTE: &str = "data-nav-group";

type ActivateFn = Box<dyn FnMut(&mut NavContext<'_>, NodeId)>;

/// Arrow-key cursor over a list of members
pub struct ButtonGroup {
    members: Vec<NodeId>,
    cursor: Option<usize>,
    on_activate: Option<ActivateFn>,
}

impl ButtonGroup {
    pub fn new(members: Vec<NodeId>) -> Self {
        Self {
            members,
            cursor: None,
            on_activate: None,
        }
    }

    /// Collect the widget descendants tagged with `group`, in tree order
    pub fn collect(document: &Document, widget: NodeId, group: &str) -> Self {
        let members = document
            .tree()
            .descendants(widget)
            .into_iter()
            .filter(|&id| document.attribute(id, GROUP_ATTRIBUTE) == Some(group))
            .collect();
        Self::new(members)
    }

    /// Called for Enter / Space on the member under the cursor
    pub fn on_activate<F>(mut self, activate: F) -> Self
    where
        F: FnMut(&mut NavContext<'_>, NodeId) + 'static,
    {
        self.on_activate = Some(Box::new(activate));
        self
    }

    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    /// Member under the cursor while active
    pub fn cursor(&self) -> Option<NodeId> {
        self.cursor.map(|i| self.members[i])
    }

    fn is_available(document: &Document, node: NodeId) -> bool {
        document.is_rendered(node)
    }

    /// First available member at or past `from` in `direction`
    fn seek(&self, document: &Document, from: Option<usize>, direction: Direction) -> Option<usize> {
        let mut index = from;
        while let Some(i) = index.filter(|&i| i < self.members.len()) {
            if Self::is_available(document, self.members[i]) {
                return Some(i);
            }
            index = direction.step(i);
        }
        None
    }

    fn place(&mut self, ctx: &mut NavContext<'_>, index: usize) {
        self.cursor = Some(index);
        ctx.show_focus_indicator(self.members[index]);
    }

    fn step(&mut self, ctx: &mut NavContext<'_>, direction: Direction) -> ResponseCode {
        let from = self.cursor.and_then(|i| direction.step(i));
        match self.seek(ctx.document(), from, direction) {
            Some(index) => {
                self.place(ctx, index);
                ResponseCode::Success
            }
            None => ResponseCode::toward(direction),
        }
    }
}

impl NavigationModule for ButtonGroup {
    fn validate(&self, ctx: &NavContext<'_>) -> bool {
        self.members
            .iter()
            .any(|&id| Self::is_available(ctx.document(), id))
    }

    fn init(&mut self, ctx: &mut NavContext<'_>, direction: Direction) {
        let start = match direction {
            Direction::Forward => Some(0),
            Direction::Backward => self.members.len().checked_sub(1),
        };
        match self.seek(ctx.document(), start, direction) {
            Some(index) => self.place(ctx, index),
            None => self.cursor = None,
        }
    }

    fn run(&mut self, ctx: &mut NavContext<'_>, event: &DomEvent) -> ResponseCode {
        match event.key.as_ref() {
            Some(Key::ArrowRight | Key::ArrowDown) => self.step(ctx, Direction::Forward),
            Some(Key::ArrowLeft | Key::ArrowUp) => self.step(ctx, Direction::Backward),
            Some(Key::Enter | Key::Space) => {
                if let (Some(node), Some(activate)) = (self.cursor(), self.on_activate.as_mut()) {
                    activate(ctx, node);
                }
                ResponseCode::Success
            }
            Some(Key::Tab) => ResponseCode::toward(Direction::from_shift(event.modifiers.shift)),
            _ => ResponseCode::NoResponse,
        }
    }

    fn terminate(&mut self, _ctx: &mut NavContext<'_>, _direction: Option<Direction>) {
        self.cursor = None;
    }
}
