//! Navigation Configuration
//!
//! Host-supplied settings: the global switch, the ordered feature list
//! and tab stop values.

use serde::{Deserialize, Serialize};

use crate::NavError;

/// Keyboard navigation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyboardNavigationConfig {
    /// Global navigation switch
    pub enabled: bool,
    /// Enabled feature names, in navigation order
    pub order: Vec<String>,
    /// Widget tab stop value, mirrored onto exit anchors
    pub tabindex: i32,
    /// Value left on the widget when navigation collapses;
    /// None removes the attribute
    pub disabled_tabindex: Option<i32>,
    /// Validate module 0 on first entry like every other transition
    pub skip_first_invalid: bool,
}

impl Default for KeyboardNavigationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            order: Vec::new(),
            tabindex: 0,
            disabled_tabindex: None,
            skip_first_invalid: false,
        }
    }
}

impl KeyboardNavigationConfig {
    /// Parse from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, NavError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder: set the feature order
    pub fn with_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Check if internal navigation should be built at all
    pub fn is_active(&self) -> bool {
        self.enabled && !self.order.is_empty()
    }
}
