//! Focus Navigation Coordinator
//!
//! State machine bridging two focus models: the page's native tab order,
//! where the whole widget is one stop, and the widget's own ordered
//! sequence of navigation modules. The coordinator is the only writer of
//! the module cursor; modules steer it through response codes alone.

use keynav_dom::{Document, DomEvent, EventTarget, EventType, ListenerId, NodeId};

use crate::{
    AnchorRole, Direction, EventSubscriptionManager, ExitAnchor, FactoryContext,
    KeyboardNavigationConfig, ModuleFactories, ModuleSequence, NavContext, NavError,
    ResponseCode,
};

/// Marks an `input` inside the widget whose keys belong to navigation
pub const PROXY_ATTRIBUTE: &str = "data-nav-proxy";

/// Why the current focus transition is happening.
///
/// - `ProgrammaticExit`: entered when `move_by` runs off either end and
///   places native focus on a boundary. Left by the focus event that
///   placement produces, or at once when the boundary already had focus.
/// - `ReenteringBackward`: entered when the exit anchor redirects a native
///   backward tab to the widget. Left by the widget's focus event.
/// - `PointerReset`: entered when the pointer is released outside the
///   widget. Left by the next focus entry or key input.
///
/// Every key input on the widget starts from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CauseState {
    #[default]
    Idle,
    ProgrammaticExit,
    PointerReset,
    ReenteringBackward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Index 0 with nothing initialised
    Rest,
    /// Module received `init` and no `terminate` yet
    Active(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavHandler {
    KeyDown,
    WidgetFocus,
    PointerDown,
    PointerUp,
    PointerEnter,
    PointerLeave,
    AnchorFocus,
}

/// Observed pointer input, kept apart from the cause state
#[derive(Debug, Clone, Copy, Default)]
struct PointerState {
    over: bool,
    pressed: bool,
}

/// Host callback dismissing transient overlays; true if anything closed
pub type DismissFn = Box<dyn FnMut(&mut NavContext<'_>) -> bool>;

/// Keyboard navigation for one widget
pub struct FocusNavigationCoordinator {
    widget: NodeId,
    config: KeyboardNavigationConfig,
    factories: ModuleFactories,
    modules: ModuleSequence,
    cursor: Cursor,
    cause: CauseState,
    pointer: PointerState,
    anchor: Option<ExitAnchor>,
    events: EventSubscriptionManager<NavHandler>,
    dismiss: Vec<DismissFn>,
    /// Widget tabindex before we touched it
    original_tabindex: Option<String>,
    live: bool,
}

impl FocusNavigationCoordinator {
    /// Subscribe to the widget's input and set its tab stop. The module
    /// sequence stays empty until [`rebuild`](Self::rebuild).
    pub fn initialize(
        document: &mut Document,
        widget: NodeId,
        config: KeyboardNavigationConfig,
        factories: ModuleFactories,
    ) -> Self {
        let mut events = EventSubscriptionManager::new();
        let target = EventTarget::Node(widget);
        events.add_event(document, target, EventType::KeyDown, NavHandler::KeyDown);
        events.add_event(document, target, EventType::Focus, NavHandler::WidgetFocus);
        events.add_event(document, target, EventType::PointerDown, NavHandler::PointerDown);
        events.add_event(document, EventTarget::Document, EventType::PointerUp, NavHandler::PointerUp);
        events.add_event(document, target, EventType::PointerEnter, NavHandler::PointerEnter);
        events.add_event(document, target, EventType::PointerLeave, NavHandler::PointerLeave);

        let original_tabindex = document.attribute(widget, "tabindex").map(str::to_string);
        let navigable = config.is_active();
        let coordinator = Self {
            widget,
            config,
            factories,
            modules: ModuleSequence::new(),
            cursor: Cursor::Rest,
            cause: CauseState::Idle,
            pointer: PointerState::default(),
            anchor: None,
            events,
            dismiss: Vec::new(),
            original_tabindex,
            live: true,
        };
        coordinator.set_widget_tab_stop(document, navigable);
        tracing::debug!("Keyboard navigation initialized for {:?}", widget);
        coordinator
    }

    // === State ===

    pub fn widget(&self) -> NodeId {
        self.widget
    }

    pub fn config(&self) -> &KeyboardNavigationConfig {
        &self.config
    }

    pub fn modules(&self) -> &ModuleSequence {
        &self.modules
    }

    /// Cursor position; 0 while nothing is active
    pub fn current_index(&self) -> usize {
        match self.cursor {
            Cursor::Rest => 0,
            Cursor::Active(index) => index,
        }
    }

    /// Index of the module between `init` and `terminate`
    pub fn active_index(&self) -> Option<usize> {
        match self.cursor {
            Cursor::Rest => None,
            Cursor::Active(index) => Some(index),
        }
    }

    /// Feature name of the active module
    pub fn active_feature(&self) -> Option<&str> {
        self.active_index().and_then(|index| self.modules.name(index))
    }

    pub fn cause(&self) -> CauseState {
        self.cause
    }

    /// Exit anchor node while mounted
    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor.as_ref().map(ExitAnchor::node)
    }

    /// Subscriptions currently held
    pub fn subscriptions(&self) -> usize {
        self.events.len()
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn owns(&self, listener: ListenerId) -> bool {
        self.events.handler(listener).is_some()
    }

    // === Configuration ===

    /// Rebuild the module sequence from `order`. The cursor always
    /// returns to 0. An empty or disabled configuration leaves the widget
    /// a plain native tab stop without anchors.
    ///
    /// Errors report a degraded widget; its state is consistent either
    /// way and the order is kept for a later [`refresh`](Self::refresh).
    pub fn rebuild(&mut self, document: &mut Document, order: Vec<String>) -> Result<usize, NavError> {
        if !self.live {
            tracing::debug!("Ignoring rebuild of torn down widget {:?}", self.widget);
            return Ok(0);
        }

        if self.release_active(document, None).is_some() {
            self.clear_own_indicator(document);
        }
        self.modules.clear();
        self.cursor = Cursor::Rest;
        self.cause = CauseState::Idle;
        self.config.order = order;
        self.remove_anchor(document);

        if !self.config.is_active() {
            tracing::debug!("Keyboard navigation off for {:?}", self.widget);
            self.set_widget_tab_stop(document, false);
            return Ok(0);
        }

        let ctx = FactoryContext {
            document: &*document,
            widget: self.widget,
        };
        let mut unknown = Vec::new();
        for name in &self.config.order {
            match self.factories.build(name, &ctx) {
                Some(module) => self.modules.push(name.clone(), module),
                None => {
                    tracing::warn!("{}", NavError::UnknownFeature(name.clone()));
                    unknown.push(name.clone());
                }
            }
        }

        if self.modules.is_empty() {
            self.set_widget_tab_stop(document, false);
            return Err(NavError::Configuration(format!(
                "none of the features {unknown:?} are known"
            )));
        }

        match ExitAnchor::mount(document, self.widget, self.config.tabindex) {
            Ok(mut anchor) => {
                let id = self.events.add_event(
                    document,
                    EventTarget::Node(anchor.node()),
                    EventType::Focus,
                    NavHandler::AnchorFocus,
                );
                anchor.set_subscription(id);
                self.anchor = Some(anchor);
            }
            Err(err) => {
                tracing::warn!("{}; keyboard navigation off until the next rebuild", err);
                self.modules.clear();
                self.set_widget_tab_stop(document, false);
                return Err(err);
            }
        }

        self.set_widget_tab_stop(document, true);
        tracing::debug!("Navigation for {:?} rebuilt: {:?}", self.widget, self.modules);
        Ok(self.modules.len())
    }

    /// Change the widget's tab stop value; the exit anchor follows it
    pub fn set_tabindex(&mut self, document: &mut Document, tabindex: i32) -> Result<(), NavError> {
        self.config.tabindex = tabindex;
        if let Some(anchor) = &self.anchor {
            anchor.set_tabindex(document, tabindex)?;
            document.set_tab_index(self.widget, tabindex)?;
        }
        Ok(())
    }

    /// Rebuild with the order already configured
    pub fn refresh(&mut self, document: &mut Document) -> Result<usize, NavError> {
        let order = self.config.order.clone();
        self.rebuild(document, order)
    }

    /// Release everything: anchors, subscriptions and the tab stop we
    /// set. Safe to call repeatedly.
    pub fn teardown(&mut self, document: &mut Document) {
        if !self.live {
            return;
        }

        self.release_active(document, None);
        self.clear_own_indicator(document);
        self.remove_anchor(document);
        self.modules.clear();
        self.cursor = Cursor::Rest;
        self.cause = CauseState::Idle;
        self.pointer = PointerState::default();
        self.dismiss.clear();
        self.events.remove_added_events(document);

        let restored = match self.original_tabindex.as_deref() {
            Some(value) => document.set_attribute(self.widget, "tabindex", value),
            None => document.remove_attribute(self.widget, "tabindex").map(|_| ()),
        };
        if let Err(err) = restored {
            tracing::warn!("Cannot restore tab stop of {:?}: {}", self.widget, err);
        }

        self.live = false;
        tracing::debug!("Keyboard navigation torn down for {:?}", self.widget);
    }

    /// Register a callback for the document-wide Escape broadcast
    pub fn on_dismiss(&mut self, callback: DismissFn) {
        self.dismiss.push(callback);
    }

    /// Run every dismiss callback; true if any closed something
    pub fn dismiss(&mut self, document: &mut Document) -> bool {
        if !self.live {
            return false;
        }
        let mut ctx = NavContext::new(document, self.widget);
        self.dismiss
            .iter_mut()
            .fold(false, |dismissed, callback| callback(&mut ctx) | dismissed)
    }

    // === Event entry points ===

    /// Route a delivered event; false if the listener is not ours
    pub fn handle_event(&mut self, document: &mut Document, listener: ListenerId, event: &mut DomEvent) -> bool {
        let Some(handler) = self.events.handler(listener) else {
            return false;
        };
        match handler {
            NavHandler::KeyDown => self.on_key_down(document, event),
            NavHandler::WidgetFocus => self.on_focus_enter(document, event),
            NavHandler::PointerDown => self.pointer.pressed = true,
            NavHandler::PointerUp => self.on_pointer_up(document),
            NavHandler::PointerEnter => self.pointer.over = true,
            NavHandler::PointerLeave => self.pointer.over = false,
            NavHandler::AnchorFocus => self.on_anchor_focus(document, event),
        }
        true
    }

    /// Focus reached the widget's tab stop. Entering from outside starts
    /// module 0 without consulting its `validate` unless
    /// `skip_first_invalid` is configured.
    pub fn on_focus_enter(&mut self, document: &mut Document, event: &DomEvent) {
        let from_inside = self.is_inside(document, event.related_target);
        let entering = !matches!(
            self.cause,
            CauseState::ProgrammaticExit | CauseState::ReenteringBackward
        ) && !self.pointer.pressed
            && !from_inside
            && !self.modules.is_empty();
        self.cause = CauseState::Idle;

        if !entering {
            tracing::trace!("Focus on {:?} does not start navigation", self.widget);
            return;
        }
        if self.release_active(document, None).is_some() {
            self.clear_own_indicator(document);
        }
        self.start(document);
    }

    /// Hand a key to the active module and act on its response
    pub fn on_key_down(&mut self, document: &mut Document, event: &mut DomEvent) {
        if self.is_text_entry(document, event) {
            return;
        }
        self.cause = CauseState::Idle;

        // A click focuses the widget without starting a module
        if self.cursor == Cursor::Rest {
            if self.modules.is_empty() || !self.is_inside(document, event.target_node()) {
                return;
            }
            tracing::debug!("Key input on resting {:?}, starting navigation", self.widget);
            self.start(document);
        }
        let Cursor::Active(index) = self.cursor else {
            return;
        };
        let Some(module) = self.modules.get_mut(index) else {
            return;
        };
        let response = {
            let mut ctx = NavContext::new(document, self.widget);
            module.run(&mut ctx, event)
        };
        tracing::trace!("Module {:?} answered {:?}", self.modules.name(index), response);

        let handled = match response {
            ResponseCode::Success => true,
            ResponseCode::MovePrev => self.move_by(document, Direction::Backward),
            ResponseCode::MoveNext => self.move_by(document, Direction::Forward),
            ResponseCode::NoResponse => false,
        };
        if handled {
            event.prevent_default();
            event.stop_propagation();
        }
    }

    /// Leave the active module and go to the next valid one in
    /// `direction`, skipping modules whose `validate` fails. Past either
    /// end, native focus goes to the exit anchor (forward) or the widget
    /// (backward) and false is returned.
    pub fn move_by(&mut self, document: &mut Document, direction: Direction) -> bool {
        let from = self.release_active(document, Some(direction)).unwrap_or(0);
        self.clear_own_indicator(document);
        self.advance(document, direction.step(from), direction)
    }

    /// Pointer released somewhere in the document
    pub fn on_pointer_up(&mut self, document: &mut Document) {
        self.pointer.pressed = false;
        if self.pointer.over || self.cause == CauseState::PointerReset {
            return;
        }
        self.release_active(document, None);
        self.clear_own_indicator(document);
        self.cursor = Cursor::Rest;
        self.cause = CauseState::PointerReset;
        tracing::debug!("Pointer released outside {:?}, keyboard state reset", self.widget);
    }

    /// Focus landed on the exit anchor
    pub fn on_anchor_focus(&mut self, document: &mut Document, event: &DomEvent) {
        let from_widget = self.is_inside(document, event.related_target);
        match AnchorRole::classify(self.cause, from_widget) {
            AnchorRole::ForwardExit => {
                tracing::trace!("Focus passing out of {:?}", self.widget);
                // Native Tab left while a module was still active
                if self.release_active(document, Some(Direction::Forward)).is_some() {
                    self.clear_own_indicator(document);
                }
                self.cause = CauseState::Idle;
            }
            AnchorRole::BackwardReentry => self.reenter_backward(document),
        }
    }

    // === Transitions ===

    /// Enter at module 0; validated only with `skip_first_invalid`
    fn start(&mut self, document: &mut Document) {
        if self.config.skip_first_invalid {
            self.advance(document, Some(0), Direction::Forward);
        } else {
            self.activate(document, 0, Direction::Forward);
        }
    }

    fn reenter_backward(&mut self, document: &mut Document) {
        tracing::debug!("Backward tab into {:?}", self.widget);
        self.cause = CauseState::ReenteringBackward;
        if self.release_active(document, None).is_some() {
            self.clear_own_indicator(document);
        }
        document.focus(self.widget);

        if let Some(last) = self.modules.len().checked_sub(1) {
            if self.is_valid(document, last) {
                self.activate(document, last, Direction::Backward);
            } else {
                self.advance(document, Direction::Backward.step(last), Direction::Backward);
            }
        }

        if self.cause == CauseState::ReenteringBackward && !document.focus_pending(self.widget) {
            self.cause = CauseState::Idle;
        }
    }

    /// Walk from `start` in `direction` to the first valid module. Each
    /// step moves strictly toward an end, so at most `len` checks run.
    fn advance(&mut self, document: &mut Document, start: Option<usize>, direction: Direction) -> bool {
        let mut index = start;
        while let Some(i) = index.filter(|&i| i < self.modules.len()) {
            if self.is_valid(document, i) {
                self.activate(document, i, direction);
                return true;
            }
            tracing::trace!("Skipping invalid module {:?}", self.modules.name(i));
            index = direction.step(i);
        }
        self.exit(document, direction);
        false
    }

    fn exit(&mut self, document: &mut Document, direction: Direction) {
        self.cursor = Cursor::Rest;
        self.cause = CauseState::ProgrammaticExit;
        let target = match direction {
            Direction::Forward => self.anchor().unwrap_or(self.widget),
            Direction::Backward => self.widget,
        };
        document.focus(target);
        if !document.focus_pending(target) {
            self.cause = CauseState::Idle;
        }
        tracing::debug!("Navigation left {:?} {:?} via {:?}", self.widget, direction, target);
    }

    fn activate(&mut self, document: &mut Document, index: usize, direction: Direction) {
        let Some(module) = self.modules.get_mut(index) else {
            return;
        };
        self.cursor = Cursor::Active(index);
        let mut ctx = NavContext::new(document, self.widget);
        module.init(&mut ctx, direction);
        tracing::debug!("Entered module {:?} going {:?}", self.modules.name(index), direction);
    }

    /// Terminate the active module, returning its index
    fn release_active(&mut self, document: &mut Document, direction: Option<Direction>) -> Option<usize> {
        let Cursor::Active(index) = self.cursor else {
            return None;
        };
        self.cursor = Cursor::Rest;
        if let Some(module) = self.modules.get_mut(index) {
            let mut ctx = NavContext::new(document, self.widget);
            module.terminate(&mut ctx, direction);
        }
        Some(index)
    }

    fn is_valid(&self, document: &mut Document, index: usize) -> bool {
        let ctx = NavContext::new(document, self.widget);
        self.modules.get(index).is_some_and(|module| module.validate(&ctx))
    }

    fn remove_anchor(&mut self, document: &mut Document) {
        if let Some(anchor) = self.anchor.take() {
            if let Some(id) = anchor.subscription() {
                self.events.remove_event(document, id);
            }
            anchor.remove(document);
        }
    }

    /// Clear the focus indicator if it is drawn inside this widget
    fn clear_own_indicator(&self, document: &mut Document) {
        let indicator = document.focus_indicator();
        if self.is_inside(document, indicator) {
            document.clear_focus_indicator();
        }
    }

    fn is_inside(&self, document: &Document, node: Option<NodeId>) -> bool {
        node.is_some_and(|id| document.tree().contains(self.widget, id))
    }

    /// Keys typed into a real text field inside the widget
    fn is_text_entry(&self, document: &Document, event: &DomEvent) -> bool {
        event
            .target_node()
            .filter(|&target| target != self.widget)
            .is_some_and(|target| {
                document.tree().get(target).is_some_and(|node| node.is_tag("input"))
                    && !document.has_attribute(target, PROXY_ATTRIBUTE)
            })
    }

    fn set_widget_tab_stop(&self, document: &mut Document, navigable: bool) {
        let result = if navigable {
            document.set_tab_index(self.widget, self.config.tabindex)
        } else if let Some(value) = self.config.disabled_tabindex {
            document.set_tab_index(self.widget, value)
        } else if let Some(value) = self.original_tabindex.as_deref() {
            document.set_attribute(self.widget, "tabindex", value)
        } else {
            document.remove_attribute(self.widget, "tabindex").map(|_| ())
        };
        if let Err(err) = result {
            tracing::warn!("Cannot update tab stop of {:?}: {}", self.widget, err);
        }
    }
}

impl std::fmt::Debug for FocusNavigationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusNavigationCoordinator")
            .field("widget", &self.widget)
            .field("modules", &self.modules)
            .field("cursor", &self.cursor)
            .field("cause", &self.cause)
            .field("anchor", &self.anchor())
            .field("live", &self.live)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NavigationModule;
    use keynav_dom::{Key, KeyModifiers};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records hook calls; answers keys from a fixed response
    struct Probe {
        name: &'static str,
        valid: Rc<Cell<bool>>,
        answer: Rc<Cell<ResponseCode>>,
        log: Log,
    }

    impl NavigationModule for Probe {
        fn validate(&self, _ctx: &NavContext<'_>) -> bool {
            self.valid.get()
        }

        fn init(&mut self, _ctx: &mut NavContext<'_>, direction: Direction) {
            self.log.borrow_mut().push(format!("init {} {:?}", self.name, direction));
        }

        fn run(&mut self, _ctx: &mut NavContext<'_>, _event: &DomEvent) -> ResponseCode {
            self.answer.get()
        }

        fn terminate(&mut self, _ctx: &mut NavContext<'_>, direction: Option<Direction>) {
            self.log.borrow_mut().push(format!("terminate {} {:?}", self.name, direction));
        }
    }

    struct Fixture {
        doc: Document,
        widget: NodeId,
        before: NodeId,
        log: Log,
        valid: Vec<Rc<Cell<bool>>>,
        answer: Rc<Cell<ResponseCode>>,
        nav: FocusNavigationCoordinator,
    }

    fn fixture(validity: &[bool]) -> Fixture {
        let mut doc = Document::new();
        let body = doc.body();
        let before = doc.create_child(body, "button").unwrap();
        doc.set_tab_index(before, 0).unwrap();
        let widget = doc.create_child(body, "div").unwrap();

        let log: Log = Rc::default();
        let answer = Rc::new(Cell::new(ResponseCode::Success));
        let valid: Vec<_> = validity.iter().map(|&v| Rc::new(Cell::new(v))).collect();
        let names = ["a", "b", "c", "d", "e"];

        let mut factories = ModuleFactories::new();
        for (name, flag) in names.iter().zip(&valid) {
            let (name, flag, answer, log) = (*name, flag.clone(), answer.clone(), log.clone());
            factories.register(name, move |_: &FactoryContext<'_>| {
                Box::new(Probe {
                    name,
                    valid: flag.clone(),
                    answer: answer.clone(),
                    log: log.clone(),
                }) as Box<dyn NavigationModule>
            });
        }

        let order: Vec<_> = names[..validity.len()].to_vec();
        let config = KeyboardNavigationConfig::default().with_order(order.clone());
        let mut nav = FocusNavigationCoordinator::initialize(&mut doc, widget, config, factories);
        nav.rebuild(&mut doc, order.iter().map(|s| s.to_string()).collect()).unwrap();

        Fixture { doc, widget, before, log, valid, answer, nav }
    }

    impl Fixture {
        fn enter_from_before(&mut self) {
            let event = DomEvent::focus(self.widget, Some(self.before));
            self.nav.on_focus_enter(&mut self.doc, &event);
        }

        fn press(&mut self, key: Key) -> DomEvent {
            let mut event = DomEvent::key_down(self.widget.into(), key, KeyModifiers::default());
            self.nav.on_key_down(&mut self.doc, &mut event);
            event
        }

        fn drain(&mut self) -> Vec<DomEvent> {
            std::iter::from_fn(|| self.doc.next_event()).collect()
        }

        fn entries(&self) -> Vec<String> {
            self.log.borrow().clone()
        }
    }

    #[test]
    fn test_initialize_sets_tab_stop() {
        let f = fixture(&[true]);
        assert_eq!(f.doc.attribute(f.widget, "tabindex"), Some("0"));
        assert!(f.nav.anchor().is_some());
        assert_eq!(f.nav.subscriptions(), 7);
        assert_eq!(f.nav.current_index(), 0);
    }

    #[test]
    fn test_first_entry_does_not_validate() {
        let mut f = fixture(&[false, true]);
        f.enter_from_before();
        assert_eq!(f.nav.active_index(), Some(0));
        assert_eq!(f.entries(), vec!["init a Forward"]);
    }

    #[test]
    fn test_first_entry_can_opt_into_validation() {
        let mut f = fixture(&[false, true]);
        f.nav.config.skip_first_invalid = true;
        f.enter_from_before();
        assert_eq!(f.nav.active_index(), Some(1));
    }

    #[test]
    fn test_focus_from_inside_or_click_does_not_enter() {
        let mut f = fixture(&[true]);
        let inner = f.doc.create_child(f.widget, "rect").unwrap();
        let event = DomEvent::focus(f.widget, Some(inner));
        f.nav.on_focus_enter(&mut f.doc, &event);
        assert_eq!(f.nav.active_index(), None);

        f.nav.pointer.pressed = true;
        f.enter_from_before();
        assert_eq!(f.nav.active_index(), None);
        assert!(f.entries().is_empty());
    }

    #[test]
    fn test_success_suppresses_default() {
        let mut f = fixture(&[true, true]);
        f.enter_from_before();
        let event = f.press(Key::ArrowRight);
        assert!(event.is_default_prevented());
        assert!(event.is_propagation_stopped());
        assert_eq!(f.nav.active_index(), Some(0));
    }

    #[test]
    fn test_no_response_leaves_default() {
        let mut f = fixture(&[true]);
        f.enter_from_before();
        f.answer.set(ResponseCode::NoResponse);
        let event = f.press(Key::Character('x'));
        assert!(!event.is_default_prevented());
    }

    #[test]
    fn test_keys_outside_widget_ignored_while_resting() {
        let mut f = fixture(&[true]);
        let mut event = DomEvent::key_down(f.before.into(), Key::ArrowRight, KeyModifiers::default());
        f.nav.on_key_down(&mut f.doc, &mut event);
        assert!(!event.is_default_prevented());
        assert!(f.entries().is_empty());
    }

    #[test]
    fn test_key_on_resting_widget_starts_first_module() {
        let mut f = fixture(&[true, true]);
        let event = f.press(Key::ArrowRight);
        assert!(event.is_default_prevented());
        assert_eq!(f.nav.active_index(), Some(0));
        assert_eq!(f.entries(), vec!["init a Forward"]);

        f.answer.set(ResponseCode::MoveNext);
        f.press(Key::Tab);
        assert_eq!(f.nav.active_index(), Some(1));
    }

    #[test]
    fn test_key_on_resting_widget_honours_skip_first_invalid() {
        let mut f = fixture(&[false, true]);
        f.nav.config.skip_first_invalid = true;
        f.press(Key::ArrowRight);
        assert_eq!(f.nav.active_index(), Some(1));
    }

    #[test]
    fn test_move_never_lands_on_invalid_module() {
        let len = 5;
        for invalid in 0..len {
            for start in (0..len).filter(|&s| s != invalid) {
                for direction in [Direction::Forward, Direction::Backward] {
                    let validity: Vec<_> = (0..len).map(|i| i != invalid).collect();
                    let mut f = fixture(&validity);
                    f.nav.activate(&mut f.doc, start, Direction::Forward);

                    let mut expected = direction.step(start);
                    if expected == Some(invalid) {
                        expected = direction.step(invalid);
                    }
                    let expected = expected.filter(|&i| i < len);

                    let landed = f.nav.move_by(&mut f.doc, direction);
                    assert_eq!(landed, expected.is_some(), "{invalid} {start} {direction:?}");
                    assert_eq!(f.nav.active_index(), expected, "{invalid} {start} {direction:?}");
                    assert_ne!(f.nav.active_index(), Some(invalid));
                    if expected.is_none() {
                        let boundary = match direction {
                            Direction::Forward => f.nav.anchor(),
                            Direction::Backward => Some(f.widget),
                        };
                        assert_eq!(f.doc.focused(), boundary);
                    }
                }
            }
        }
    }

    #[test]
    fn test_native_tab_out_releases_active_module() {
        let mut f = fixture(&[true]);
        f.enter_from_before();
        let item = f.doc.create_child(f.widget, "rect").unwrap();
        f.doc.show_focus_indicator(item);

        let anchor = f.nav.anchor().unwrap();
        let event = DomEvent::focus(anchor, Some(f.widget));
        f.nav.on_anchor_focus(&mut f.doc, &event);
        assert_eq!(f.nav.active_index(), None);
        assert_eq!(f.nav.cause(), CauseState::Idle);
        assert_eq!(f.doc.focus_indicator(), None);
        assert_eq!(f.entries(), vec!["init a Forward", "terminate a Some(Forward)"]);
    }

    #[test]
    fn test_rebuild_clears_indicator_of_active_module() {
        let mut f = fixture(&[true]);
        f.enter_from_before();
        let item = f.doc.create_child(f.widget, "rect").unwrap();
        f.doc.show_focus_indicator(item);

        f.nav.rebuild(&mut f.doc, Vec::new()).unwrap();
        assert_eq!(f.doc.focus_indicator(), None);
        assert_eq!(f.nav.active_index(), None);
    }

    #[test]
    fn test_set_tabindex_mirrors_onto_anchor() {
        let mut f = fixture(&[true]);
        let anchor = f.nav.anchor().unwrap();
        f.nav.set_tabindex(&mut f.doc, 2).unwrap();
        assert_eq!(f.doc.attribute(f.widget, "tabindex"), Some("2"));
        assert_eq!(f.doc.attribute(anchor, "tabindex"), Some("2"));

        f.nav.rebuild(&mut f.doc, vec!["a".into()]).unwrap();
        let anchor = f.nav.anchor().unwrap();
        assert_eq!(f.doc.attribute(anchor, "tabindex"), Some("2"));
    }

    #[test]
    fn test_move_skips_invalid_module() {
        let mut f = fixture(&[true, false, true]);
        f.enter_from_before();
        f.answer.set(ResponseCode::MoveNext);
        let event = f.press(Key::Tab);

        assert!(event.is_default_prevented());
        assert_eq!(f.nav.active_index(), Some(2));
        assert_eq!(
            f.entries(),
            vec!["init a Forward", "terminate a Some(Forward)", "init c Forward"]
        );
    }

    #[test]
    fn test_move_past_end_exits_to_anchor() {
        let mut f = fixture(&[true]);
        f.enter_from_before();
        f.drain();
        f.answer.set(ResponseCode::MoveNext);
        let event = f.press(Key::Tab);

        assert!(!event.is_default_prevented());
        assert_eq!(f.nav.active_index(), None);
        assert_eq!(f.nav.current_index(), 0);
        assert_eq!(f.nav.cause(), CauseState::ProgrammaticExit);
        assert_eq!(f.doc.focused(), f.nav.anchor());

        // The placement's own focus event is an exit, not a re-entry
        let focus = f.drain().pop().unwrap();
        f.nav.on_anchor_focus(&mut f.doc, &focus);
        assert_eq!(f.nav.cause(), CauseState::Idle);
        assert_eq!(f.nav.active_index(), None);
    }

    #[test]
    fn test_move_backward_past_start_returns_to_widget() {
        let mut f = fixture(&[true, true]);
        f.doc.focus(f.widget);
        f.drain();
        f.enter_from_before();
        f.answer.set(ResponseCode::MovePrev);
        f.press(Key::Tab);

        // Widget already had focus: nothing to consume the exit state
        assert_eq!(f.nav.cause(), CauseState::Idle);
        assert_eq!(f.doc.focused(), Some(f.widget));
        assert_eq!(f.nav.active_index(), None);
    }

    #[test]
    fn test_all_invalid_exits_in_direction() {
        let mut f = fixture(&[true, false, false]);
        f.enter_from_before();
        assert!(!f.nav.move_by(&mut f.doc, Direction::Forward));
        assert_eq!(f.doc.focused(), f.nav.anchor());
        assert_eq!(f.nav.active_index(), None);
    }

    #[test]
    fn test_backward_reentry_resumes_at_last_valid() {
        let mut f = fixture(&[true, true, false]);
        let anchor = f.nav.anchor().unwrap();
        let after = f.doc.create_child(f.doc.body(), "button").unwrap();
        f.doc.set_tab_index(after, 0).unwrap();
        f.doc.focus(anchor);
        f.drain();

        let event = DomEvent::focus(anchor, Some(after));
        f.nav.on_anchor_focus(&mut f.doc, &event);
        assert_eq!(f.nav.active_index(), Some(1));
        assert_eq!(f.nav.cause(), CauseState::ReenteringBackward);
        assert_eq!(f.doc.focused(), Some(f.widget));

        // The widget's focus event closes the re-entry without init on 0
        let focus = f.drain().pop().unwrap();
        f.nav.on_focus_enter(&mut f.doc, &focus);
        assert_eq!(f.nav.cause(), CauseState::Idle);
        assert_eq!(f.nav.active_index(), Some(1));
        assert_eq!(f.entries(), vec!["init b Backward"]);
    }

    #[test]
    fn test_pointer_up_outside_resets_once() {
        let mut f = fixture(&[true, true]);
        f.enter_from_before();
        let item = f.doc.create_child(f.widget, "rect").unwrap();
        f.doc.show_focus_indicator(item);

        f.nav.on_pointer_up(&mut f.doc);
        assert_eq!(f.nav.cause(), CauseState::PointerReset);
        assert_eq!(f.nav.active_index(), None);
        assert_eq!(f.doc.focus_indicator(), None);

        f.doc.show_focus_indicator(item);
        f.nav.on_pointer_up(&mut f.doc);
        assert_eq!(f.doc.focus_indicator(), Some(item));
        assert_eq!(f.entries(), vec!["init a Forward", "terminate a None"]);
    }

    #[test]
    fn test_pointer_up_over_widget_keeps_state() {
        let mut f = fixture(&[true]);
        f.enter_from_before();
        f.nav.pointer.over = true;
        f.nav.on_pointer_up(&mut f.doc);
        assert_eq!(f.nav.active_index(), Some(0));
        assert_eq!(f.nav.cause(), CauseState::Idle);
    }

    #[test]
    fn test_text_input_keys_ignored() {
        let mut f = fixture(&[true]);
        f.enter_from_before();
        let input = f.doc.create_child(f.widget, "input").unwrap();
        let mut event = DomEvent::key_down(input.into(), Key::ArrowRight, KeyModifiers::default());
        f.nav.on_key_down(&mut f.doc, &mut event);
        assert!(!event.is_default_prevented());

        f.doc.set_attribute(input, PROXY_ATTRIBUTE, "").unwrap();
        f.nav.on_key_down(&mut f.doc, &mut event);
        assert!(event.is_default_prevented());
    }

    #[test]
    fn test_rebuild_resets_cursor() {
        let mut f = fixture(&[true, true]);
        f.enter_from_before();
        f.nav.move_by(&mut f.doc, Direction::Forward);
        assert_eq!(f.nav.current_index(), 1);

        let count = f.nav.rebuild(&mut f.doc, vec!["b".into(), "a".into()]).unwrap();
        assert_eq!(count, 2);
        assert_eq!(f.nav.current_index(), 0);
        assert_eq!(f.nav.active_index(), None);
        assert_eq!(f.nav.modules().names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(f.entries().contains(&"terminate b None".to_string()));
    }

    #[test]
    fn test_rebuild_empty_collapses() {
        let mut f = fixture(&[true]);
        let anchor = f.nav.anchor().unwrap();
        assert_eq!(f.nav.rebuild(&mut f.doc, Vec::new()).unwrap(), 0);
        assert_eq!(f.nav.anchor(), None);
        assert!(!f.doc.tree().is_attached(anchor));
        assert_eq!(f.doc.attribute(f.widget, "tabindex"), None);
        assert_eq!(f.nav.subscriptions(), 6);
    }

    #[test]
    fn test_rebuild_empty_uses_disabled_tabindex() {
        let mut f = fixture(&[true]);
        f.nav.config.disabled_tabindex = Some(-1);
        f.nav.rebuild(&mut f.doc, Vec::new()).unwrap();
        assert_eq!(f.doc.attribute(f.widget, "tabindex"), Some("-1"));
    }

    #[test]
    fn test_rebuild_unknown_features() {
        let mut f = fixture(&[true]);
        let err = f.nav.rebuild(&mut f.doc, vec!["sonification".into()]).unwrap_err();
        assert!(matches!(err, NavError::Configuration(_)));
        assert!(f.nav.modules().is_empty());
        assert_eq!(f.nav.anchor(), None);

        // Unknown names next to known ones are skipped
        assert_eq!(f.nav.rebuild(&mut f.doc, vec!["x".into(), "a".into()]).unwrap(), 1);
    }

    #[test]
    fn test_mount_unavailable_keeps_order() {
        let mut doc = Document::new();
        let widget = doc.tree_mut().create_element("div");
        let factories = ModuleFactories::button_groups(["zoom"]);
        let config = KeyboardNavigationConfig::default().with_order(["zoom"]);
        let mut nav = FocusNavigationCoordinator::initialize(&mut doc, widget, config, factories);

        let err = nav.refresh(&mut doc).unwrap_err();
        assert!(matches!(err, NavError::MountUnavailable(_)));
        assert!(nav.modules().is_empty());
        assert_eq!(nav.config().order, vec!["zoom"]);

        let body = doc.body();
        doc.tree_mut().append_child(body, widget).unwrap();
        assert_eq!(nav.refresh(&mut doc).unwrap(), 1);
        assert!(nav.anchor().is_some());
    }

    #[test]
    fn test_teardown_idempotent() {
        let mut f = fixture(&[true]);
        f.enter_from_before();
        f.nav.teardown(&mut f.doc);
        f.nav.teardown(&mut f.doc);

        assert!(!f.nav.is_live());
        assert_eq!(f.nav.subscriptions(), 0);
        assert!(f.doc.listeners().is_empty());
        assert_eq!(f.nav.anchor(), None);
        assert_eq!(f.doc.attribute(f.widget, "tabindex"), None);
        assert_eq!(f.entries(), vec!["init a Forward", "terminate a None"]);
        assert_eq!(f.nav.rebuild(&mut f.doc, vec!["a".into()]).unwrap(), 0);
    }

    #[test]
    fn test_dismiss_callbacks() {
        let mut f = fixture(&[true]);
        let calls = Rc::new(Cell::new(0));
        for answer in [false, true] {
            let calls = calls.clone();
            f.nav.on_dismiss(Box::new(move |_: &mut NavContext<'_>| {
                calls.set(calls.get() + 1);
                answer
            }));
        }
        assert!(f.nav.dismiss(&mut f.doc));
        assert_eq!(calls.get(), 2);

        f.nav.teardown(&mut f.doc);
        assert!(!f.nav.dismiss(&mut f.doc));
    }

    #[test]
    fn test_validity_can_change_between_moves() {
        let mut f = fixture(&[true, true, true]);
        f.enter_from_before();
        f.valid[1].set(false);
        f.nav.move_by(&mut f.doc, Direction::Forward);
        assert_eq!(f.nav.active_index(), Some(2));
        f.valid[1].set(true);
        f.nav.move_by(&mut f.doc, Direction::Backward);
        assert_eq!(f.nav.active_index(), Some(1));
    }
}
