//! Formatting implementation for the PrefixTrie

use std::fmt::{Debug, Formatter, Result};

use crate::inner::{Children, Node};
use crate::PrefixTrie;

impl<T: Debug> Debug for PrefixTrie<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.root.as_deref() {
            Some(root) => DebugNode(root).fmt(f),
            None => f.debug_map().finish(),
        }
    }
}

struct DebugNode<'a, T>(&'a Node<T>);

/// The prefix of a node, followed by its fan-out if it is a wide node.
struct Label<'a, T>(&'a Node<T>);

impl<T> Debug for Label<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.0.children {
            Children::Binary(_) => self.0.prefix.fmt(f),
            Children::Wide { width, .. } => write!(f, "{:?} x{}", self.0.prefix, width),
        }
    }
}

impl<T: Debug> Debug for DebugNode<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let node = self.0;
        let label = Label(node);
        let children: Vec<Option<DebugNode<'_, T>>> = node
            .slots()
            .iter()
            .map(|s| s.as_deref().map(DebugNode))
            .collect();
        match (node.value.as_ref(), node.is_leaf()) {
            (None, true) => label.fmt(f),
            (Some(v), true) => f.debug_map().entry(&label, v).finish(),
            (None, false) => f.debug_map().entry(&label, &children).finish(),
            (Some(v), false) => f.debug_map().entry(&label, &(v, children)).finish(),
        }
    }
}
