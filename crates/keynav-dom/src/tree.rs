//! DOM Tree (arena-based allocation)

use crate::{DomError, Node, NodeId};

/// Arena-based element tree
///
/// Node 0 is the root; nodes are never freed, only detached.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::element("#document")],
        }
    }

    /// Root node ID
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the root is never removed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn check(&self, id: NodeId) -> Result<(), DomError> {
        match self.get(id) {
            Some(_) => Ok(()),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::element(tag));
        id
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check(parent)?;
        self.check(child)?;
        if self.contains(child, parent) {
            return Err(DomError::Hierarchy(child));
        }
        self.detach(child)?;

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
        Ok(())
    }

    /// Insert `node` directly after `reference` under the same parent
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        self.check(reference)?;
        self.check(node)?;
        let parent = self.parent(reference).ok_or(DomError::NoParent(reference))?;
        if reference == node || self.contains(node, parent) {
            return Err(DomError::Hierarchy(node));
        }
        self.detach(node)?;

        let next = self.nodes[reference.index()].next_sibling;
        {
            let n = &mut self.nodes[node.index()];
            n.parent = parent;
            n.prev_sibling = reference;
            n.next_sibling = next;
        }
        self.nodes[reference.index()].next_sibling = node;
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = node;
        } else {
            self.nodes[parent.index()].last_child = node;
        }
        Ok(())
    }

    /// Remove a node (and its subtree) from its parent
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        self.check(node)?;
        let (parent, prev, next) = {
            let n = &self.nodes[node.index()];
            (n.parent, n.prev_sibling, n.next_sibling)
        };
        if !parent.is_valid() {
            return Ok(());
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }
        self.nodes[node.index()].unlink();
        Ok(())
    }

    /// Parent of a node
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Iterate direct children
    pub fn children(&self, node: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(node).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Iterate ancestors, nearest first, excluding `node`
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(node).unwrap_or(NodeId::NONE),
        }
    }

    /// Inclusive containment: a node contains itself
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if self.get(node).is_none() {
            return false;
        }
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Check if a node is reachable from the root
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(NodeId::ROOT, node)
    }

    /// Descendants of `node` in tree order, excluding `node`
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let mark = stack.len();
            stack.extend(self.children(id));
            stack[mark..].reverse();
        }
        out
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Child iterator
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if !self.next.is_valid() {
            return None;
        }
        let current = self.next;
        self.next = self.tree.get(current).map_or(NodeId::NONE, |n| n.next_sibling);
        Some(current)
    }
}

/// Ancestor iterator
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if !self.next.is_valid() {
            return None;
        }
        let current = self.next;
        self.next = self.tree.parent(current).unwrap_or(NodeId::NONE);
        Some(current)
    }
}
