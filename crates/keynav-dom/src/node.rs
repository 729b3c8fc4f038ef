//! DOM Node
//!
//! Element nodes linked by ids instead of pointers.

use crate::{NodeId, NamedNodeMap};

/// Element node
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Lowercase tag name
    pub tag: String,
    /// Attributes
    pub attributes: NamedNodeMap,
}

impl Node {
    /// Create a detached element
    pub fn element(tag: &str) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            tag: tag.to_ascii_lowercase(),
            attributes: NamedNodeMap::new(),
        }
    }

    /// Tag comparison, case-insensitive
    #[inline]
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub(crate) fn unlink(&mut self) {
        self.parent = NodeId::NONE;
        self.prev_sibling = NodeId::NONE;
        self.next_sibling = NodeId::NONE;
    }
}
