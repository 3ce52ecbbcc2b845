use itertools::Itertools;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use super::*;

fn _iter<F: Family>(list: Vec<(TestPrefix, u8)>) -> bool {
    let (mut trie, map) = build::<F>(&list);
    let sorted: Vec<(Prefix, u8)> = map.into_iter().sorted().collect();
    let plain = trie.iter().map(|(p, t)| (*p, *t)).eq(sorted.iter().copied());
    trie.compress();
    let compressed = trie.iter().map(|(p, t)| (*p, *t)).eq(sorted.iter().copied());
    plain && compressed && trie.len() == sorted.len()
}

fn _order_independent<F: Family>((list, seed): (Vec<(TestPrefix, u8)>, u64)) -> bool {
    let (mut trie, map) = build::<F>(&list);
    let mut entries: Vec<(Prefix, u8)> = map.iter().map(|(p, t)| (*p, *t)).collect();
    entries.shuffle(&mut StdRng::seed_from_u64(seed));
    let mut shuffled: PrefixTrie<u8> = entries.into_iter().collect();

    let same_shape = format!("{trie:?}") == format!("{shuffled:?}");
    let same_lookups = lookups_agree::<F>(&shuffled, &map);
    trie.compress();
    shuffled.compress();
    same_shape
        && same_lookups
        && trie == shuffled
        && format!("{trie:?}") == format!("{shuffled:?}")
}

fn _get<F: Family>((list, query): (Vec<(TestPrefix, u8)>, TestPrefix)) -> bool {
    let (mut trie, map) = build::<F>(&list);
    trie.compress();
    let query = F::prefix(query);
    let found = trie.get(&query) == map.get(&query)
        && trie.contains_key(&query) == map.contains_key(&query);
    let all_found = map.iter().all(|(p, t)| trie.get(p) == Some(t));
    if let Some(t) = trie.get_mut(&query) {
        *t = t.wrapping_add(1);
    }
    let updated = trie.get(&query).copied() == map.get(&query).map(|t| t.wrapping_add(1));
    found && all_found && updated
}

fn _compression_flattens<F: Family>(list: Vec<(TestPrefix, u8)>) -> bool {
    let (mut trie, _) = build::<F>(&list);
    let depth = trie.depth();
    trie.compress();
    let compressed = format!("{trie:?}");
    let flattened = trie.depth() <= depth;
    // a second pass finds nothing left to fold
    trie.compress();
    flattened && format!("{trie:?}") == compressed
}

#[generic_tests::define]
mod t {
    use super::*;

    #[test]
    fn iter<F: Family>() {
        proptest_runner(_iter::<F>)
    }

    #[test]
    fn order_independent<F: Family>() {
        proptest_runner(_order_independent::<F>)
    }

    #[test]
    fn get<F: Family>() {
        proptest_runner(_get::<F>)
    }

    #[test]
    fn compression_flattens<F: Family>() {
        proptest_runner(_compression_flattens::<F>)
    }

    #[instantiate_tests(<Ipv4Mapped>)]
    mod ipv4 {}

    #[instantiate_tests(<Ipv6>)]
    mod ipv6 {}

    #[instantiate_tests(<WordBoundary>)]
    mod word_boundary {}

    #[instantiate_tests(<HostBits>)]
    mod host_bits {}
}
