//! keynav
//!
//! Keyboard navigation through the internally drawn regions of a
//! composite widget (data series, zoom buttons, legend), handing focus
//! back to the page's native tab order at the boundaries.
//!
//! Features:
//! - Ordered navigation modules built from named feature factories
//! - Response-code protocol between modules and the coordinator
//! - Exit anchors bridging internal and native tab order
//! - Pointer-aware reset of keyboard state
//! - Escape broadcast to every live widget
//!
//! # Example
//! ```rust,ignore
//! use keynav::{KeyboardNavigationConfig, ModuleFactories, NavigationHost};
//!
//! let mut host = NavigationHost::new(document);
//! let config = KeyboardNavigationConfig::from_json(r#"{"order": ["legend"]}"#)?;
//! let widget = host.mount(chart, config, ModuleFactories::button_groups(["legend"]))?;
//! host.key_down(Key::Tab, KeyModifiers::default());
//! ```

pub mod config;
pub mod response;
pub mod module;
pub mod handler;
pub mod button_group;
pub mod factories;
pub mod subscriptions;
pub mod exit_anchor;
pub mod coordinator;
pub mod registry;
pub mod host;

pub use config::KeyboardNavigationConfig;
pub use response::{ResponseCode, Direction};
pub use module::{NavigationModule, NavContext, ModuleSequence};
pub use handler::KeyboardHandler;
pub use button_group::ButtonGroup;
pub use factories::{ModuleFactories, FactoryContext, ModuleFactory};
pub use subscriptions::EventSubscriptionManager;
pub use exit_anchor::{ExitAnchor, AnchorRole};
pub use coordinator::{FocusNavigationCoordinator, CauseState, DismissFn};
pub use registry::{WidgetRegistry, WidgetId};
pub use host::NavigationHost;

pub use keynav_dom as dom;

use keynav_dom::{DomError, NodeId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Navigation error
///
/// None of these reach the end user: every failure leaves the widget
/// as a plain native tab stop.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("Invalid navigation configuration: {0}")]
    Configuration(String),

    #[error("Unknown navigation feature: {0}")]
    UnknownFeature(String),

    #[error("Module contract violation: {0}")]
    ModuleContractViolation(String),

    #[error("No mount point for an exit anchor next to {0:?}")]
    MountUnavailable(NodeId),

    #[error("Unknown widget: {0:?}")]
    UnknownWidget(WidgetId),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}
