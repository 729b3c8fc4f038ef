//! keynav DOM - Host Document
//!
//! The small document model a widget's keyboard navigation runs against:
//! an arena element tree, attributes, native focus with sequential tab
//! order, pointer hover tracking, typed input events and a listener
//! registry addressed by listener ids.

mod node;
mod tree;
mod attributes;
mod document;
pub mod events;
mod listeners;
mod focus;

pub use node::Node;
pub use tree::{DomTree, Children, Ancestors};
pub use attributes::{NamedNodeMap, Attr};
pub use document::Document;
pub use events::{DomEvent, EventType, EventTarget, Key, KeyModifiers};
pub use listeners::{ListenerId, ListenerRegistry};
pub use focus::{TabIndex, tab_order};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for missing links
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// DOM error
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),

    #[error("Node {0:?} has no parent")]
    NoParent(NodeId),

    #[error("Inserting {0:?} would create a cycle")]
    Hierarchy(NodeId),

    #[error("Invalid tabindex value: {0:?}")]
    InvalidTabIndex(String),
}
