//! This crate provides a compressed prefix tree for IP prefixes. Any lookup performs
//! longest-prefix match. IPv4 and IPv6 share a single 128-bit key space: IPv4 prefixes are stored
//! in their IPv4-mapped form (`::ffff:a.b.c.d`), with the prefix length offset by 96. Prefixes can
//! be created from [ipnet](https://docs.rs/ipnet), from
//! [ipnetwork](https://crates.io/crates/ipnetwork) (feature `ipnetwork`), from
//! [cidr](https://crates.io/crates/cidr) (feature `cidr`), or parsed from text.
//!
//! ```
//! # use lpm_trie::*;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut trie = PrefixTrie::new();
//! trie.insert("10.0.0.0/8".parse()?, "A");
//! trie.insert("10.1.0.0/16".parse()?, "B");
//! trie.insert("10.1.1.0/24".parse()?, "C");
//! trie.compress();
//! assert_eq!(trie.lookup_ip("10.1.1.5".parse()?).map(|(_, v)| *v), Some("C"));
//! assert_eq!(trie.lookup_ip("10.1.2.5".parse()?).map(|(_, v)| *v), Some("B"));
//! assert_eq!(trie.lookup_ip("10.2.0.0".parse()?).map(|(_, v)| *v), Some("A"));
//! assert_eq!(trie.lookup_ip("11.0.0.0".parse()?), None);
//! # Ok(())
//! # }
//! ```
//!
//! # Description of the Tree
//!
//! Each node consists of a prefix, a container for a potential value (`Option`), and its
//! children. A freshly built tree is a binary tree: the bit directly following a node's prefix
//! selects the left or the right child. Nodes without a value only exist to join two diverging
//! branches, so the depth of the tree is bounded by the number of distinct branching points, not
//! by the prefix length.
//!
//! # Compression
//!
//! Once all prefixes are inserted, [`PrefixTrie::compress`] folds complete layers of single-bit
//! branching nodes into *wide* nodes that consume several bits at once. A wide node with `w` bits
//! of fan-out holds `2^w` child slots, indexed directly by the next `w` bits of the address. This
//! shortens the path of a lookup without changing its result. Folding stops as soon as a layer
//! would become too sparse (see [`Compression`]) or when it reaches a node carrying a value.
//!
//! # Operations on the tree
//!
//! | Operation                         | Complexity          |
//! |-----------------------------------|---------------------|
//! | `insert`                          | `O(depth)`          |
//! | `lookup`, `lookup_prefix`, `get`  | `O(depth)`          |
//! | `compress`                        | `O(n)`              |
//! | `iter`                            | `O(n)`              |
//! | `len` and `is_empty`              | `O(1)`              |
//!
//! There is no removal. Inserting into a compressed tree is supported: wide nodes on the insertion
//! path are unfolded into binary nodes where needed.

#![allow(clippy::collapsible_else_if)]
#![deny(missing_docs)]

mod compress;
mod fmt;
mod inner;
mod prefix;
mod relation;
#[cfg(feature = "serde")]
mod serde;
#[cfg(test)]
mod fuzzing;

pub mod ingest;
pub mod trie;

pub use compress::Compression;
pub use prefix::{extract, Prefix};
pub use relation::{classify, Relation, Side};
pub use trie::PrefixTrie;

/// Errors produced while turning text or address ranges into a [`Prefix`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The text is not a valid `address/length` prefix.
    InvalidPrefix(ipnet::AddrParseError),
    /// The text is not a valid IPv4 or IPv6 address.
    InvalidAddress(std::net::AddrParseError),
    /// A record does not contain the named field.
    MissingField(&'static str),
    /// The two ends of a range belong to different address families.
    MixedFamilies,
    /// The end of a range is smaller than its beginning.
    InvertedRange,
    /// The range does not describe a single, aligned, power-of-two sized block.
    UnalignedRange,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidPrefix(e) => write!(f, "invalid prefix: {e}"),
            ParseError::InvalidAddress(e) => write!(f, "invalid address: {e}"),
            ParseError::MissingField(field) => write!(f, "missing field `{field}`"),
            ParseError::MixedFamilies => write!(f, "range mixes IPv4 and IPv6 addresses"),
            ParseError::InvertedRange => write!(f, "range ends before it begins"),
            ParseError::UnalignedRange => write!(f, "range is not an aligned CIDR block"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::InvalidPrefix(e) => Some(e),
            ParseError::InvalidAddress(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ipnet::AddrParseError> for ParseError {
    fn from(e: ipnet::AddrParseError) -> Self {
        ParseError::InvalidPrefix(e)
    }
}

impl From<std::net::AddrParseError> for ParseError {
    fn from(e: std::net::AddrParseError) -> Self {
        ParseError::InvalidAddress(e)
    }
}
