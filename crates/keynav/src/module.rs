//! Navigation Modules
//!
//! The capability every internally navigable feature implements, and the
//! ordered sequence the coordinator walks.

use keynav_dom::{Document, DomEvent, NodeId};

use crate::{Direction, ResponseCode};

/// What a module hook may touch: the document and its widget
pub struct NavContext<'a> {
    document: &'a mut Document,
    widget: NodeId,
}

impl<'a> NavContext<'a> {
    pub fn new(document: &'a mut Document, widget: NodeId) -> Self {
        Self { document, widget }
    }

    pub fn document(&self) -> &Document {
        &*self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut *self.document
    }

    /// The widget's own tab stop
    pub fn widget(&self) -> NodeId {
        self.widget
    }

    pub fn show_focus_indicator(&mut self, node: NodeId) {
        self.document.show_focus_indicator(node);
    }

    pub fn clear_focus_indicator(&mut self) -> Option<NodeId> {
        self.document.clear_focus_indicator()
    }
}

/// One internally navigable feature of a widget.
///
/// Every hook is optional. The defaults make a module always valid,
/// give `init`/`terminate` no effect and leave every key unhandled.
/// Hooks must not panic; the coordinator does not catch them.
pub trait NavigationModule {
    /// Whether the module currently has anything to navigate.
    /// Must be pure: the coordinator may call it repeatedly while skipping.
    fn validate(&self, _ctx: &NavContext<'_>) -> bool {
        true
    }

    /// The module became active, entered while travelling in `direction`
    fn init(&mut self, _ctx: &mut NavContext<'_>, _direction: Direction) {}

    /// Consume exactly one key input, finishing any side effect before returning
    fn run(&mut self, _ctx: &mut NavContext<'_>, _event: &DomEvent) -> ResponseCode {
        ResponseCode::NoResponse
    }

    /// The module stops being active; `direction` is None for resets
    fn terminate(&mut self, _ctx: &mut NavContext<'_>, _direction: Option<Direction>) {}
}

struct ModuleSlot {
    name: String,
    module: Box<dyn NavigationModule>,
}

/// Ordered modules of one widget
#[derive(Default)]
pub struct ModuleSequence {
    slots: Vec<ModuleSlot>,
}

impl ModuleSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, module: Box<dyn NavigationModule>) {
        self.slots.push(ModuleSlot {
            name: name.into(),
            module,
        });
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Feature name at `index`
    pub fn name(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(|s| s.name.as_str())
    }

    /// Feature names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    pub fn get(&self, index: usize) -> Option<&dyn NavigationModule> {
        self.slots.get(index).map(|s| s.module.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn NavigationModule + 'static)> {
        self.slots.get_mut(index).map(|s| s.module.as_mut())
    }
}

impl std::fmt::Debug for ModuleSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
