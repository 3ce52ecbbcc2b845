//! Structural relation between two prefixes.
//!
//! The relation tells insertion where a new prefix belongs relative to an existing node: below
//! it, above it, or next to it under a new branching node. It is directional, so swapping the
//! arguments turns [`Relation::Contains`] into [`Relation::ContainedBy`].

use crate::prefix::{extract, mask_from_prefix_len};
use crate::Prefix;

/// One of the two branches below a binary node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The branch taken when the next bit is `0`.
    Left,
    /// The branch taken when the next bit is `1`.
    Right,
}

impl Side {
    fn from_bit(bit: u64) -> Self {
        if bit == 0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Index of the child slot of a binary node.
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    /// The opposite side.
    pub fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Relation of a prefix `a` to a prefix `b`, as computed by [`classify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Both prefixes are equal.
    Equal,
    /// `a` contains `b`. The side is the branch of `a` that `b` belongs to.
    Contains(Side),
    /// `b` contains `a`. The side is the branch of `b` that `a` belongs to.
    ContainedBy(Side),
    /// The prefixes diverge after their common bits. The side is where `a` belongs below their
    /// common prefix; `b` belongs to the other side.
    Overlap(Side),
}

/// Compute the relation of `a` to `b` and the number of leading bits they have in common (capped
/// at the shorter prefix length).
///
/// ```
/// # use lpm_trie::*;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let a: Prefix = "10.0.0.0/8".parse()?;
/// let b: Prefix = "10.128.0.0/9".parse()?;
/// assert_eq!(classify(&a, &b), (Relation::Contains(Side::Right), 104));
/// assert_eq!(classify(&b, &a), (Relation::ContainedBy(Side::Right), 104));
/// # Ok(())
/// # }
/// ```
pub fn classify(a: &Prefix, b: &Prefix) -> (Relation, u8) {
    let (a_len, b_len) = (a.prefix_len() as u32, b.prefix_len() as u32);
    let (a_hi, a_lo) = split(a.addr());
    let (b_hi, b_lo) = split(b.addr());

    match classify_word(a_hi, b_hi, a_len.min(64), b_len.min(64)) {
        (Relation::Equal, _) => {}
        (relation, common) => return (relation, common as u8),
    }

    match classify_word(
        a_lo,
        b_lo,
        a_len.saturating_sub(64),
        b_len.saturating_sub(64),
    ) {
        (Relation::Equal, _) => (Relation::Equal, a.prefix_len()),
        (relation, common) => (relation, common as u8 + 64),
    }
}

#[inline(always)]
fn split(addr: u128) -> (u64, u64) {
    ((addr >> 64) as u64, addr as u64)
}

/// Classify a single 64-bit word, where only the first `l_bits` and `r_bits` are significant.
fn classify_word(l: u64, r: u64, l_bits: u32, r_bits: u32) -> (Relation, u32) {
    let l = l & mask_from_prefix_len::<u64>(l_bits as u8);
    let r = r & mask_from_prefix_len::<u64>(r_bits as u8);

    if l_bits == r_bits && l == r {
        return (Relation::Equal, l_bits);
    }

    let common = (l ^ r).leading_zeros().min(l_bits).min(r_bits);
    let relation = if common == l_bits {
        Relation::Contains(Side::from_bit(extract(r, common, 1)))
    } else if common == r_bits {
        Relation::ContainedBy(Side::from_bit(extract(l, common, 1)))
    } else {
        Relation::Overlap(Side::from_bit(extract(l, common, 1)))
    };
    (relation, common)
}
