use super::*;

fn _lookup<F: Family>(list: Vec<(TestPrefix, u8)>) -> bool {
    let (trie, map) = build::<F>(&list);
    lookups_agree::<F>(&trie, &map)
}

fn _lookup_compressed<F: Family>(list: Vec<(TestPrefix, u8)>) -> bool {
    let (mut trie, map) = build::<F>(&list);
    trie.compress();
    lookups_agree::<F>(&trie, &map)
}

fn _lookup_compressed_with<F: Family>(
    (list, sparsity, min_width): (Vec<(TestPrefix, u8)>, u8, u8),
) -> bool {
    let (mut trie, map) = build::<F>(&list);
    trie.compress_with(&Compression {
        max_sparsity: (sparsity % 10 + 1) as f64 / 10.0,
        min_width: min_width % 5,
    });
    lookups_agree::<F>(&trie, &map)
}

fn _lookup_prefix<F: Family>((list, query): (Vec<(TestPrefix, u8)>, TestPrefix)) -> bool {
    let (mut trie, map) = build::<F>(&list);
    let query = F::prefix(query);
    let want = map
        .iter()
        .filter(|(p, _)| p.contains(&query))
        .max_by_key(|(p, _)| p.prefix_len());
    let before = trie.lookup_prefix(&query) == want;
    trie.compress();
    before && trie.lookup_prefix(&query) == want
}

fn _insert_after_compress<F: Family>(
    (first, second): (Vec<(TestPrefix, u8)>, Vec<(TestPrefix, u8)>),
) -> bool {
    let (mut trie, _) = build::<F>(&first);
    trie.compress();
    trie.extend(second.iter().map(|(p, t)| (F::prefix(*p), *t)));
    let all: Vec<_> = first.into_iter().chain(second).collect();
    let (_, map) = build::<F>(&all);
    trie.len() == map.len() && lookups_agree::<F>(&trie, &map)
}

#[generic_tests::define]
mod t {
    use super::*;

    #[test]
    fn lookup<F: Family>() {
        proptest_runner(_lookup::<F>)
    }

    #[test]
    fn lookup_compressed<F: Family>() {
        proptest_runner(_lookup_compressed::<F>)
    }

    #[test]
    fn lookup_compressed_with<F: Family>() {
        proptest_runner(_lookup_compressed_with::<F>)
    }

    #[test]
    fn lookup_prefix<F: Family>() {
        proptest_runner(_lookup_prefix::<F>)
    }

    #[test]
    fn insert_after_compress<F: Family>() {
        proptest_runner(_insert_after_compress::<F>)
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
