//! Tab Index
//!
//! `tabindex` parsing and sequential focus order.

use crate::{DomError, DomTree, NodeId};

/// Parsed `tabindex` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabIndex {
    /// Negative: focusable from script only
    Programmatic(i32),
    /// Zero or positive: part of sequential navigation
    Sequential(i32),
}

impl TabIndex {
    pub fn parse(value: &str) -> Result<Self, DomError> {
        match value.trim().parse::<i32>() {
            Ok(n) if n < 0 => Ok(Self::Programmatic(n)),
            Ok(n) => Ok(Self::Sequential(n)),
            Err(_) => Err(DomError::InvalidTabIndex(value.to_string())),
        }
    }

    pub fn is_sequential(&self) -> bool {
        matches!(self, Self::Sequential(_))
    }

    pub fn value(&self) -> i32 {
        match *self {
            Self::Programmatic(n) | Self::Sequential(n) => n,
        }
    }
}

/// Check the `hidden` attribute on a node or any ancestor
pub(crate) fn is_hidden(tree: &DomTree, node: NodeId) -> bool {
    std::iter::once(node)
        .chain(tree.ancestors(node))
        .any(|id| tree.get(id).is_some_and(|n| n.attributes.has_attribute("hidden")))
}

/// Sequential navigation order: positive tabindex ascending, then
/// `tabindex=0` in tree order. Hidden subtrees are skipped.
pub fn tab_order(tree: &DomTree) -> Vec<NodeId> {
    let mut positive = Vec::new();
    let mut zero = Vec::new();

    for (position, id) in tree.descendants(tree.root()).into_iter().enumerate() {
        let Some(node) = tree.get(id) else { continue };
        let Some(Ok(TabIndex::Sequential(n))) = node
            .attributes
            .get_attribute("tabindex")
            .map(TabIndex::parse)
        else {
            continue;
        };
        if is_hidden(tree, id) {
            continue;
        }
        if n > 0 {
            positive.push((n, position, id));
        } else {
            zero.push(id);
        }
    }

    positive.sort_by_key(|&(n, position, _)| (n, position));
    positive.into_iter().map(|(_, _, id)| id).chain(zero).collect()
}
