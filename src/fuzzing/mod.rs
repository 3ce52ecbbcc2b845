//! Module for testing using fuzzing (quickcheck)
#![allow(clippy::type_complexity)]

use std::collections::HashMap;
use std::fmt::Debug;

use crate::*;
use quickcheck::Arbitrary;

#[cfg(miri)]
const DEFAULT_NUM_TESTS: usize = 10;
#[cfg(not(miri))]
const DEFAULT_NUM_TESTS: usize = 1000;
const DEFAULT_GEN_SIZE: usize = 100;

/// Number of bits below the base prefix of a [`Family`] that test prefixes may cover.
const BITS: u8 = 8;

fn proptest_runner<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F) {
    let num_tests: usize = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_NUM_TESTS);

    let gen_size: usize = std::env::var("QUICKCHECK_GENERATOR_SIZE")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GEN_SIZE);

    let mut gen = quickcheck::Gen::new(gen_size);

    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        let input_c = input.clone();
        let success = f(input_c);
        if !success {
            shrink_failure(f, input)
        }
    }
}

fn shrink_failure<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F, input: A) -> ! {
    for i in input.shrink() {
        let i_c = i.clone();
        let success = f(i_c);
        if !success {
            shrink_failure(f, i)
        }
    }
    // all shrunken inputs pass, so `input` is minimal
    panic!(
        "[QUICKCHECK] Test case failed!\n  Minimal input:\n    {:?}",
        input
    );
}

/// Region of the key space that the generated prefixes live in.
trait Family {
    /// All generated prefixes are contained in this prefix.
    fn base() -> Prefix;

    fn prefix(p: TestPrefix) -> Prefix {
        let base = Self::base();
        let shift = 128 - base.prefix_len() as u32 - BITS as u32;
        Prefix::new(base.addr() | ((p.0 as u128) << shift), base.prefix_len() + p.1)
    }

    /// Every address below the base that differs in the first [`BITS`] bits, plus one address
    /// right outside of the base.
    fn samples() -> Vec<u128> {
        let base = Self::base();
        let shift = 128 - base.prefix_len() as u32 - BITS as u32;
        let low = 0x5555_5555_5555_5555_5555_5555_5555_5555u128 & ((1u128 << shift) - 1);
        let outside = base.addr() ^ (1u128 << (128 - base.prefix_len() as u32));
        (0..1u128 << BITS)
            .map(|i| base.addr() | (i << shift) | low)
            .chain(std::iter::once(outside))
            .collect()
    }
}

/// IPv4 prefixes, stored in the low word.
struct Ipv4Mapped;

impl Family for Ipv4Mapped {
    fn base() -> Prefix {
        Prefix::from_ipv4(std::net::Ipv4Addr::UNSPECIFIED, 0)
    }
}

/// IPv6 prefixes, all within the high word.
struct Ipv6;

impl Family for Ipv6 {
    fn base() -> Prefix {
        "2001:db8::/32".parse().unwrap()
    }
}

/// Prefixes whose last bits straddle both 64-bit words.
struct WordBoundary;

impl Family for WordBoundary {
    fn base() -> Prefix {
        Prefix::new(0x2001_0db8_dead_beef_0000_0000_0000_0000, 58)
    }
}

/// IPv4 prefixes down to host routes, so that folding runs into bit 128.
struct HostBits;

impl Family for HostBits {
    fn base() -> Prefix {
        Prefix::from_ipv4(std::net::Ipv4Addr::new(192, 0, 2, 0), 24)
    }
}

/// A prefix of up to [`BITS`] bits below the base of a [`Family`].
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
struct TestPrefix(u16, u8);

impl TestPrefix {
    fn from_repr_len(repr: u16, len: u8) -> Self {
        let mask = !(u16::MAX >> len) & ((1 << BITS) - 1) << (16 - BITS);
        TestPrefix((repr & mask) >> (16 - BITS), len)
    }
}

impl Debug for TestPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let addr = format!("{:0w$b}", self.0, w = BITS as usize)[..self.1 as usize].to_string();
        write!(f, "0b{addr}/{}", self.1)
    }
}

impl Arbitrary for TestPrefix {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        #[rustfmt::skip]
        let len: u8 = *g
            .choose(&[
                0,
                1, 1,
                2, 2, 2,
                3, 3, 3, 3,
                4, 4, 4, 4, 4,
                5, 5, 5, 5, 5, 5,
                6, 6, 6, 6, 6, 6, 6,
                7, 7, 7, 7, 7, 7, 7, 7,
                8, 8, 8, 8, 8, 8, 8, 8, 8,
            ])
            .unwrap();
        let x = u16::arbitrary(g);
        Self::from_repr_len(x, len)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.1 == 0 {
            quickcheck::empty_shrinker()
        } else {
            let len = self.1 - 1;
            let x = Self::from_repr_len(self.0 << (16 - BITS), len);
            quickcheck::single_shrinker(x)
        }
    }
}

/// Build the trie and the reference map, with later entries replacing earlier ones.
fn build<F: Family>(list: &[(TestPrefix, u8)]) -> (PrefixTrie<u8>, HashMap<Prefix, u8>) {
    let mut trie = PrefixTrie::new();
    let mut map = HashMap::new();
    for (p, t) in list {
        trie.insert(F::prefix(*p), *t);
        map.insert(F::prefix(*p), *t);
    }
    (trie, map)
}

/// Longest-prefix match by scanning all entries.
fn naive_lookup(map: &HashMap<Prefix, u8>, addr: u128) -> Option<(&Prefix, &u8)> {
    map.iter()
        .filter(|(p, _)| p.contains_addr(addr))
        .max_by_key(|(p, _)| p.prefix_len())
}

/// Check every sample address of `F` against the reference map.
fn lookups_agree<F: Family>(trie: &PrefixTrie<u8>, map: &HashMap<Prefix, u8>) -> bool {
    F::samples()
        .into_iter()
        .all(|addr| trie.lookup(addr) == naive_lookup(map, addr))
}

mod lookup;
mod structure;

#[test]
fn test_prefix() {
    let p = TestPrefix::from_repr_len(0b1011_0111_1100_0000, 3);
    assert_eq!(p, TestPrefix(0b10100000, 3));
    assert_eq!(format!("{p:?}"), "0b101/3");
    assert_eq!(
        Ipv6::prefix(p),
        "2001:db8:a000::/35".parse::<Prefix>().unwrap()
    );
    assert_eq!(
        Ipv4Mapped::prefix(TestPrefix(0b00001010, 8)),
        "10.0.0.0/8".parse::<Prefix>().unwrap()
    );
    let samples = WordBoundary::samples();
    assert_eq!(samples.len(), 257);
    assert!(samples[..256]
        .iter()
        .all(|a| WordBoundary::base().contains_addr(*a)));
    assert!(!WordBoundary::base().contains_addr(samples[256]));
    assert_eq!(
        HostBits::prefix(TestPrefix(0b11111111, 8)),
        "192.0.2.255/32".parse::<Prefix>().unwrap()
    );
    assert_eq!(HostBits::samples()[3], HostBits::base().addr() | 3);
}
