//! Implementation of the prefix trie.

use std::net::IpAddr;

use crate::inner::{Children, Node};
use crate::{classify, Prefix, Relation};

mod iter;

pub use iter::*;

/// Prefix trie mapping IP prefixes to values, with longest-prefix match lookups.
#[derive(Clone)]
pub struct PrefixTrie<T> {
    pub(crate) root: Option<Box<Node<T>>>,
    len: usize,
}

impl<T> Default for PrefixTrie<T> {
    fn default() -> Self {
        Self { root: None, len: 0 }
    }
}

impl<T> PrefixTrie<T> {
    /// Create an empty prefix trie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of prefixes stored in the trie.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the trie holds no prefix.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a new item into the trie. If the exact prefix was present before, its value is
    /// replaced and the old one is returned.
    ///
    /// ```
    /// # use lpm_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut trie = PrefixTrie::new();
    /// assert_eq!(trie.insert("192.168.0.0/23".parse()?, 1), None);
    /// assert_eq!(trie.insert("192.168.1.0/24".parse()?, 2), None);
    /// assert_eq!(trie.insert("192.168.1.0/24".parse()?, 3), Some(2));
    /// assert_eq!(trie.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert(&mut self, prefix: Prefix, value: T) -> Option<T> {
        let mut old = None;
        let leaf = Box::new(Node::new(prefix, Some(value)));
        self.root = Some(merge(self.root.take(), leaf, &mut old));
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    /// Longest-prefix match of a single address in the 128-bit key space.
    ///
    /// ```
    /// # use lpm_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut trie = PrefixTrie::new();
    /// trie.insert("2001:db8::/32".parse()?, 1);
    /// trie.insert("2001:db8:1::/48".parse()?, 2);
    /// let addr: std::net::Ipv6Addr = "2001:db8:1::1".parse()?;
    /// assert_eq!(trie.lookup(addr.into()), Some((&"2001:db8:1::/48".parse()?, &2)));
    /// # Ok(())
    /// # }
    /// ```
    pub fn lookup(&self, addr: u128) -> Option<(&Prefix, &T)> {
        self.lookup_prefix(&Prefix::host(addr))
    }

    /// Longest-prefix match of an IPv4 or IPv6 address. IPv4 addresses are mapped into the
    /// 128-bit key space.
    pub fn lookup_ip(&self, addr: IpAddr) -> Option<(&Prefix, &T)> {
        self.lookup_prefix(&Prefix::from(addr))
    }

    /// Get the value of the longest stored prefix that contains `prefix` (including `prefix`
    /// itself).
    ///
    /// ```
    /// # use lpm_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut trie = PrefixTrie::new();
    /// trie.insert("192.168.1.0/24".parse()?, 1);
    /// trie.insert("192.168.0.0/23".parse()?, 2);
    /// assert_eq!(trie.lookup_prefix(&"192.168.1.64/26".parse()?), Some((&"192.168.1.0/24".parse()?, &1)));
    /// assert_eq!(trie.lookup_prefix(&"192.168.0.0/23".parse()?), Some((&"192.168.0.0/23".parse()?, &2)));
    /// assert_eq!(trie.lookup_prefix(&"192.168.0.0/22".parse()?), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn lookup_prefix(&self, prefix: &Prefix) -> Option<(&Prefix, &T)> {
        let mut best_match = None;
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            if !node.prefix.contains(prefix) {
                break;
            }
            best_match = node.prefix_value().or(best_match);
            cur = node.child(prefix);
        }
        best_match
    }

    /// Get the value of an element by matching exactly on the prefix.
    ///
    /// ```
    /// # use lpm_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut trie = PrefixTrie::new();
    /// trie.insert("192.168.1.0/24".parse()?, 1);
    /// assert_eq!(trie.get(&"192.168.1.0/24".parse()?), Some(&1));
    /// assert_eq!(trie.get(&"192.168.1.0/25".parse()?), None);
    /// assert_eq!(trie.get(&"192.168.0.0/23".parse()?), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn get(&self, prefix: &Prefix) -> Option<&T> {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            if node.prefix == *prefix {
                return node.value.as_ref();
            }
            if !node.prefix.contains(prefix) {
                break;
            }
            cur = node.child(prefix);
        }
        None
    }

    /// Get a mutable reference to the value stored for exactly `prefix`.
    pub fn get_mut(&mut self, prefix: &Prefix) -> Option<&mut T> {
        let mut cur = self.root.as_deref_mut();
        while let Some(node) = cur {
            if node.prefix == *prefix {
                return node.value.as_mut();
            }
            if !node.prefix.contains(prefix) {
                break;
            }
            cur = match node.slot_index(prefix) {
                Some(idx) => node.slots_mut()[idx].as_deref_mut(),
                None => None,
            };
        }
        None
    }

    /// Check if exactly `prefix` is stored in the trie.
    pub fn contains_key(&self, prefix: &Prefix) -> bool {
        self.get(prefix).is_some()
    }

    /// Returns `true` if [`Self::compress`] produced at least one wide node.
    pub fn is_compressed(&self) -> bool {
        fn wide<T>(node: &Node<T>) -> bool {
            matches!(node.children, Children::Wide { .. })
                || node.slots().iter().flatten().any(|c| wide(c))
        }
        self.root.as_deref().map_or(false, wide)
    }

    /// The number of nodes on the longest path from the root, which bounds the number of steps a
    /// lookup takes.
    pub fn depth(&self) -> usize {
        fn depth<T>(node: &Node<T>) -> usize {
            1 + node
                .slots()
                .iter()
                .flatten()
                .map(|c| depth(c))
                .max()
                .unwrap_or(0)
        }
        self.root.as_deref().map_or(0, depth)
    }
}

/// Merge `new` into the subtree `existing` and return the new root of that subtree. `existing` is
/// consumed; nodes are moved, never copied. If `new` replaces a value, the old one is written into
/// `old`.
fn merge<T>(
    existing: Option<Box<Node<T>>>,
    mut new: Box<Node<T>>,
    old: &mut Option<T>,
) -> Box<Node<T>> {
    let Some(mut existing) = existing else {
        return new;
    };

    let (relation, common) = classify(&existing.prefix, &new.prefix);
    match relation {
        Relation::Equal => {
            *old = std::mem::replace(&mut existing.value, new.value.take());
            existing
        }
        Relation::Contains(side) => {
            let idx = match existing.children {
                Children::Binary(_) => Some(side.index()),
                Children::Wide { .. } => existing.slot_index(&new.prefix),
            };
            let idx = match idx {
                Some(idx) => idx,
                None => {
                    // `new` ends within the bits folded into this node
                    existing.unfold();
                    side.index()
                }
            };
            let slot = &mut existing.slots_mut()[idx];
            *slot = Some(merge(slot.take(), new, old));
            existing
        }
        Relation::ContainedBy(side) => {
            new.slots_mut()[side.index()] = Some(existing);
            new
        }
        Relation::Overlap(side) => {
            let mut children = [None, None];
            let branch = Prefix::new(existing.prefix.addr(), common);
            children[side.index()] = Some(existing);
            children[side.other().index()] = Some(new);
            Box::new(Node {
                prefix: branch,
                value: None,
                children: Children::Binary(children),
            })
        }
    }
}

impl<T> FromIterator<(Prefix, T)> for PrefixTrie<T> {
    fn from_iter<I: IntoIterator<Item = (Prefix, T)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<T> Extend<(Prefix, T)> for PrefixTrie<T> {
    fn extend<I: IntoIterator<Item = (Prefix, T)>>(&mut self, iter: I) {
        for (prefix, value) in iter {
            self.insert(prefix, value);
        }
    }
}

impl<T: PartialEq> PartialEq for PrefixTrie<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PrefixTrie<T> {}
