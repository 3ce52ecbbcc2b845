//! The nodes of a prefix trie.

use crate::prefix::extract_u128;
use crate::Prefix;

/// A child slot. Every node is owned by exactly one slot (or by the root of the trie).
pub(crate) type Slot<T> = Option<Box<Node<T>>>;

#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) prefix: Prefix,
    pub(crate) value: Option<T>,
    pub(crate) children: Children<T>,
}

/// Shape of a node.
#[derive(Clone)]
pub(crate) enum Children<T> {
    /// One bit of fan-out, as created by insertion.
    Binary([Slot<T>; 2]),
    /// `width` bits of fan-out, created by compression. `slots` has exactly `1 << width` entries.
    Wide { width: u8, slots: Vec<Slot<T>> },
}

impl<T> Node<T> {
    pub(crate) fn new(prefix: Prefix, value: Option<T>) -> Self {
        Self {
            prefix,
            value,
            children: Children::Binary([None, None]),
        }
    }

    /// get the tuple of prefix and value.
    pub(crate) fn prefix_value(&self) -> Option<(&Prefix, &T)> {
        self.value.as_ref().map(|v| (&self.prefix, v))
    }

    /// Number of bits consumed to select a child.
    pub(crate) fn fanout(&self) -> u8 {
        match &self.children {
            Children::Binary(_) => 1,
            Children::Wide { width, .. } => *width,
        }
    }

    pub(crate) fn slots(&self) -> &[Slot<T>] {
        match &self.children {
            Children::Binary(slots) => slots,
            Children::Wide { slots, .. } => slots,
        }
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Slot<T>] {
        match &mut self.children {
            Children::Binary(slots) => slots,
            Children::Wide { slots, .. } => slots,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.slots().iter().all(Option::is_none)
    }

    /// Index of the slot that `key` falls into, or `None` if `key` is too short to select one.
    /// The caller must ensure that `self.prefix` contains `key`.
    #[inline(always)]
    pub(crate) fn slot_index(&self, key: &Prefix) -> Option<usize> {
        debug_assert!(self.prefix.contains(key));
        let offset = self.prefix.prefix_len() as u32;
        let width = self.fanout() as u32;
        if offset + width > key.prefix_len() as u32 {
            None
        } else {
            Some(extract_u128(key.addr(), offset, width) as usize)
        }
    }

    /// The child that `key` descends into.
    #[inline(always)]
    pub(crate) fn child(&self, key: &Prefix) -> Option<&Node<T>> {
        self.slot_index(key)
            .and_then(|idx| self.slots()[idx].as_deref())
    }

    /// Turn a wide node back into a binary node. Only synthetic nodes are created for pairs of
    /// non-empty halves, so the result is the minimal binary subtree over the same children.
    pub(crate) fn unfold(&mut self) {
        let Children::Wide { mut slots, .. } =
            std::mem::replace(&mut self.children, Children::Binary([None, None]))
        else {
            return;
        };
        let right = slots.split_off(slots.len() / 2);
        let left = rebuild(self.prefix.child(false), slots);
        let right = rebuild(self.prefix.child(true), right);
        self.children = Children::Binary([left, right]);
    }
}

fn rebuild<T>(prefix: Prefix, mut slots: Vec<Slot<T>>) -> Slot<T> {
    if slots.len() == 1 {
        return slots.pop().flatten();
    }
    let right = slots.split_off(slots.len() / 2);
    match (
        rebuild(prefix.child(false), slots),
        rebuild(prefix.child(true), right),
    ) {
        (None, None) => None,
        (Some(node), None) | (None, Some(node)) => Some(node),
        (left, right) => Some(Box::new(Node {
            prefix,
            value: None,
            children: Children::Binary([left, right]),
        })),
    }
}
