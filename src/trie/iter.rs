//! Module that contains the implementation for the iterators

use crate::inner::Node;
use crate::*;

/// An iterator over all entries of a [`PrefixTrie`] in lexicographic order.
#[derive(Clone)]
pub struct Iter<'a, T> {
    nodes: Vec<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a Prefix, &'a T);

    fn next(&mut self) -> Option<(&'a Prefix, &'a T)> {
        while let Some(node) = self.nodes.pop() {
            self.nodes
                .extend(node.slots().iter().rev().flatten().map(|c| &**c));
            if let Some(v) = &node.value {
                return Some((&node.prefix, v));
            }
        }
        None
    }
}

/// An iterator over all prefixes of a [`PrefixTrie`] in lexicographic order.
#[derive(Clone)]
pub struct Keys<'a, T> {
    inner: Iter<'a, T>,
}

impl<'a, T> Iterator for Keys<'a, T> {
    type Item = &'a Prefix;

    fn next(&mut self) -> Option<&'a Prefix> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// An iterator over all values of a [`PrefixTrie`] in lexicographic order of their associated
/// prefixes.
#[derive(Clone)]
pub struct Values<'a, T> {
    inner: Iter<'a, T>,
}

impl<'a, T> Iterator for Values<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl<'a, T> IntoIterator for &'a PrefixTrie<T> {
    type Item = (&'a Prefix, &'a T);

    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            nodes: self.root.as_deref().into_iter().collect(),
        }
    }
}

impl<T> PrefixTrie<T> {
    /// An iterator visiting all key-value pairs in lexicographic order. The iterator element type
    /// is `(&Prefix, &T)`.
    ///
    /// ```
    /// # use lpm_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut trie = PrefixTrie::new();
    /// trie.insert("192.168.0.0/22".parse()?, 1);
    /// trie.insert("192.168.0.0/23".parse()?, 2);
    /// trie.insert("192.168.2.0/23".parse()?, 3);
    /// trie.insert("192.168.0.0/24".parse()?, 4);
    /// trie.insert("192.168.2.0/24".parse()?, 5);
    /// assert_eq!(
    ///     trie.iter().collect::<Vec<_>>(),
    ///     vec![
    ///         (&"192.168.0.0/22".parse()?, &1),
    ///         (&"192.168.0.0/23".parse()?, &2),
    ///         (&"192.168.0.0/24".parse()?, &4),
    ///         (&"192.168.2.0/23".parse()?, &3),
    ///         (&"192.168.2.0/24".parse()?, &5),
    ///     ]
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        self.into_iter()
    }

    /// An iterator visiting all prefixes in lexicographic order.
    pub fn keys(&self) -> Keys<'_, T> {
        Keys { inner: self.iter() }
    }

    /// An iterator visiting all values in lexicographic order of their prefixes.
    pub fn values(&self) -> Values<'_, T> {
        Values { inner: self.iter() }
    }
}
