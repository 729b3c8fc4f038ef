//! Keyboard Handler Module
//!
//! A general module assembled from a key map plus optional hooks.
//! Tab and Shift+Tab fall through to the next / previous module when no
//! binding claims them.

use keynav_dom::{DomEvent, Key};

use crate::{Direction, NavContext, NavigationModule, ResponseCode};

type KeyFn = Box<dyn FnMut(&mut NavContext<'_>, &DomEvent) -> ResponseCode>;
type ValidateFn = Box<dyn Fn(&NavContext<'_>) -> bool>;
type InitFn = Box<dyn FnMut(&mut NavContext<'_>, Direction)>;
type TerminateFn = Box<dyn FnMut(&mut NavContext<'_>, Option<Direction>)>;

enum Binding {
    Handler(KeyFn),
    Response(ResponseCode),
    /// Declared with a response name outside the protocol
    Invalid(String),
}

/// Key-map driven navigation module
#[derive(Default)]
pub struct KeyboardHandler {
    bindings: Vec<(Vec<Key>, Binding)>,
    validate: Option<ValidateFn>,
    init: Option<InitFn>,
    terminate: Option<TerminateFn>,
}

impl KeyboardHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind keys to a handler; earlier bindings win
    pub fn bind<K, F>(mut self, keys: K, handler: F) -> Self
    where
        K: IntoIterator<Item = Key>,
        F: FnMut(&mut NavContext<'_>, &DomEvent) -> ResponseCode + 'static,
    {
        self.bindings
            .push((keys.into_iter().collect(), Binding::Handler(Box::new(handler))));
        self
    }

    /// Bind keys to a fixed response given by name ("success", "prev",
    /// "next", "none"). Unknown names answer `NoResponse` at run time.
    pub fn bind_response<K>(mut self, keys: K, response: &str) -> Self
    where
        K: IntoIterator<Item = Key>,
    {
        let binding = match response.parse::<ResponseCode>() {
            Ok(code) => Binding::Response(code),
            Err(err) => {
                tracing::warn!("{}", err);
                Binding::Invalid(response.to_string())
            }
        };
        self.bindings.push((keys.into_iter().collect(), binding));
        self
    }

    pub fn with_validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&NavContext<'_>) -> bool + 'static,
    {
        self.validate = Some(Box::new(validate));
        self
    }

    pub fn on_init<F>(mut self, init: F) -> Self
    where
        F: FnMut(&mut NavContext<'_>, Direction) + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }

    pub fn on_terminate<F>(mut self, terminate: F) -> Self
    where
        F: FnMut(&mut NavContext<'_>, Option<Direction>) + 'static,
    {
        self.terminate = Some(Box::new(terminate));
        self
    }
}

impl NavigationModule for KeyboardHandler {
    fn validate(&self, ctx: &NavContext<'_>) -> bool {
        self.validate.as_ref().is_none_or(|validate| validate(ctx))
    }

    fn init(&mut self, ctx: &mut NavContext<'_>, direction: Direction) {
        if let Some(init) = self.init.as_mut() {
            init(ctx, direction);
        }
    }

    fn run(&mut self, ctx: &mut NavContext<'_>, event: &DomEvent) -> ResponseCode {
        let Some(key) = event.key.as_ref() else {
            return ResponseCode::NoResponse;
        };

        let binding = self
            .bindings
            .iter_mut()
            .find(|(keys, _)| keys.contains(key))
            .map(|(_, binding)| binding);

        match binding {
            Some(Binding::Handler(handler)) => handler(ctx, event),
            Some(Binding::Response(code)) => *code,
            Some(Binding::Invalid(name)) => {
                tracing::debug!("Binding for {:?} answers unrecognized {:?}, ignoring", key, name);
                ResponseCode::NoResponse
            }
            None if *key == Key::Tab => {
                ResponseCode::toward(Direction::from_shift(event.modifiers.shift))
            }
            None => ResponseCode::NoResponse,
        }
    }

    fn terminate(&mut self, ctx: &mut NavContext<'_>, direction: Option<Direction>) {
        if let Some(terminate) = self.terminate.as_mut() {
            terminate(ctx, direction);
        }
    }
}
