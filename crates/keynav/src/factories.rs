//! Module Factories
//!
//! Feature name -> module constructor. The coordinator assembles its
//! sequence from these whenever the enabled-feature order changes.

use std::collections::HashMap;

use keynav_dom::{Document, NodeId};

use crate::{ButtonGroup, NavigationModule};

/// What a factory sees while building
pub struct FactoryContext<'a> {
    pub document: &'a Document,
    pub widget: NodeId,
}

/// Builds one module for a widget
pub type ModuleFactory = Box<dyn Fn(&FactoryContext<'_>) -> Box<dyn NavigationModule>>;

/// Factories keyed on feature name
#[derive(Default)]
pub struct ModuleFactories {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `name`
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&FactoryContext<'_>) -> Box<dyn NavigationModule> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// Builder form of [`register`](Self::register)
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&FactoryContext<'_>) -> Box<dyn NavigationModule> + 'static,
    {
        self.register(name, factory);
        self
    }

    /// One [`ButtonGroup`] factory per name, collecting the widget
    /// descendants tagged with that name
    pub fn button_groups<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut factories = Self::new();
        for name in names {
            let name: String = name.into();
            let group = name.clone();
            factories.register(name, move |ctx: &FactoryContext<'_>| {
                Box::new(ButtonGroup::collect(ctx.document, ctx.widget, &group))
                    as Box<dyn NavigationModule>
            });
        }
        factories
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build the module for `name`; None for unknown features
    pub fn build(&self, name: &str, ctx: &FactoryContext<'_>) -> Option<Box<dyn NavigationModule>> {
        self.factories.get(name).map(|factory| factory(ctx))
    }
}

impl std::fmt::Debug for ModuleFactories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ModuleFactories").field("features", &names).finish()
    }
}
