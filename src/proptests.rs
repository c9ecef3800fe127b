use super::*;

use crate::arena::NodeId;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

/// Walk the tree from the root and check every structural invariant.
fn validate_tree<V>(t: &RadixTree<V>) {
    let arena = &t.arena;
    let root = arena.node(NodeId::ROOT);
    assert_eq!(root.parent, None, "root must have no parent");

    let free: HashSet<NodeId> = arena.free_ids().iter().copied().collect();
    assert_eq!(free.len(), arena.free_len(), "node freed twice");
    assert!(!free.contains(&NodeId::ROOT), "root on the free list");

    let mut reachable: HashSet<NodeId> = HashSet::new();
    let mut valued = 0usize;
    let mut stack = vec![NodeId::ROOT];
    while let Some(id) = stack.pop() {
        assert!(reachable.insert(id), "node {} reached twice", id.as_usize());
        assert!(!free.contains(&id), "free node {} is reachable", id.as_usize());

        let node = arena.node(id);
        if node.value.is_some() {
            valued += 1;
        }
        if id != NodeId::ROOT {
            assert!(
                !node.is_dead_leaf(),
                "dead leaf {} still linked",
                id.as_usize()
            );
        }

        for (byte, child) in node.children.iter() {
            let c = arena.node(child);
            assert_eq!(c.parent, Some(id), "child parent link mismatch");
            assert_eq!(c.byte, byte, "child stored under the wrong byte");
            stack.push(child);
        }
    }

    assert_eq!(valued, t.len(), "valued node count must match len");
    assert_eq!(
        reachable.len(),
        arena.live(),
        "every live node must be reachable"
    );
    assert_eq!(
        reachable.len() + arena.free_len(),
        arena.slots(),
        "reachable plus free must account for every slot"
    );
    assert!(arena.slots() <= arena.capacity());
    assert!(arena.capacity() <= arena.limit());

    for &id in &free {
        let node = arena.node(id);
        assert!(node.is_dead_leaf() && node.parent.is_none() && node.byte == 0);
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, u64),
    Remove(Vec<u8>),
    Get(Vec<u8>),
    Clear,
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A narrow alphabet makes shared prefixes and exact collisions common.
    prop_oneof![
        prop::collection::vec(prop::sample::select(b"abc/".to_vec()), 0..=8),
        prop::collection::vec(any::<u8>(), 0..=24),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        50 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        25 => key.clone().prop_map(Op::Remove),
        24 => key.clone().prop_map(Op::Get),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=1000)
}

fn entries<V: Clone + Ord>(t: &RadixTree<V>) -> Vec<(Vec<u8>, V)> {
    let mut got: Vec<(Vec<u8>, V)> = t.iter().map(|(k, v)| (k, v.clone())).collect();
    got.sort();
    got
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy(), initial in 1usize..64) {
        let mut t: RadixTree<u64> = RadixTree::with_capacity(initial);
        let mut m: HashMap<Vec<u8>, u64> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let old_t = t.insert(&key, value);
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Remove(key) => {
                    let old_t = t.remove(&key);
                    let old_m = m.remove(&key);
                    prop_assert_eq!(old_t, old_m);
                    prop_assert!(!t.contains_key(&key));
                }
                Op::Get(key) => {
                    let got_t = t.get(&key).copied();
                    let got_m = m.get(&key).copied();
                    prop_assert_eq!(got_t, got_m);
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);
        let mut expected: Vec<(Vec<u8>, u64)> = m.into_iter().collect();
        expected.sort();
        prop_assert_eq!(entries(&t), expected);
    }

    #[test]
    fn prop_bounded_insert_is_all_or_nothing(
        keys in prop::collection::vec(key_strategy(), 0..=64),
        max_nodes in 1usize..48,
    ) {
        let config = Config::default().with_initial_capacity(1).with_max_nodes(max_nodes);
        let mut t: RadixTree<usize> = RadixTree::with_config(config).unwrap();
        let mut m: HashMap<Vec<u8>, usize> = HashMap::new();

        for (i, key) in keys.into_iter().enumerate() {
            let nodes_before = t.node_count();
            match t.try_insert(&key, i) {
                Ok(old) => {
                    prop_assert_eq!(old, m.insert(key, i));
                }
                Err(Error::CapacityExceeded { limit, .. }) => {
                    prop_assert_eq!(limit, max_nodes);
                    prop_assert_eq!(t.node_count(), nodes_before);
                    prop_assert!(!m.contains_key(&key));
                    prop_assert_eq!(t.get(&key), None);
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
            prop_assert!(t.node_count() <= max_nodes);
        }

        validate_tree(&t);
        prop_assert_eq!(t.len(), m.len());
    }

    #[test]
    fn prop_bounded_bulk_insert_keeps_len(
        keys in prop::collection::vec(key_strategy(), 0..=64),
        max_nodes in 1usize..48,
    ) {
        let config = Config::default().with_initial_capacity(1).with_max_nodes(max_nodes);
        let map: RadixMap<usize> = RadixMap::with_config(config.clone()).unwrap();
        let mut reference: RadixTree<usize> = RadixTree::with_config(config).unwrap();

        let pairs: Vec<(Vec<u8>, usize)> = keys.into_iter().zip(0..).collect();
        let expected = reference.try_extend(pairs.iter().cloned());
        prop_assert_eq!(map.try_extend(pairs), expected);

        let guard = map.read();
        let tree: &RadixTree<usize> = &guard;
        validate_tree(tree);
        prop_assert_eq!(map.len(), tree.len());
        prop_assert_eq!(entries(tree), entries(&reference));
    }

    #[test]
    fn prop_remove_all_frees_everything(keys in prop::collection::vec(key_strategy(), 0..=128)) {
        let mut t: RadixTree<usize> = RadixTree::with_capacity(1);
        for (i, key) in keys.iter().enumerate() {
            t.insert(key, i);
        }
        let slots = t.arena.slots();

        for key in &keys {
            t.remove(key);
            validate_tree(&t);
        }

        prop_assert!(t.is_empty());
        prop_assert_eq!(t.node_count(), 1);
        prop_assert_eq!(t.free_nodes(), slots - 1);
    }
}

#[test]
fn panicking_extend_leaves_consistent_map() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let config = Config::default().with_initial_capacity(1).with_max_nodes(6);
    let map: RadixMap<u64> = RadixMap::with_config(config).unwrap();
    map.insert("cat", 0);

    let result = catch_unwind(AssertUnwindSafe(|| {
        map.extend([("car", 1), ("cab", 2), ("dog", 3)]);
    }));
    assert!(result.is_err());

    let guard = map.read();
    let tree: &RadixTree<u64> = &guard;
    validate_tree(tree);
    assert_eq!(map.len(), 3);
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.get("dog"), None);
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

fn small_key_set() -> Vec<Vec<u8>> {
    vec![
        b"".to_vec(),
        b"c".to_vec(),
        b"ca".to_vec(),
        b"cat".to_vec(),
        b"car".to_vec(),
        b"dog".to_vec(),
    ]
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = small_key_set();

    for_each_permutation(&keys, |perm| {
        let mut t: RadixTree<u64> = RadixTree::with_capacity(1);
        for k in perm.iter() {
            let v = keys.iter().position(|x| x == k).unwrap() as u64;
            assert_eq!(t.insert(k, v), None);
        }

        validate_tree(&t);
        // root + c, a, t, r, d, o, g
        assert_eq!(t.node_count(), 8);
        let expected: Vec<(Vec<u8>, u64)> = {
            let mut e: Vec<_> = keys.iter().cloned().zip(0u64..).collect();
            e.sort();
            e
        };
        assert_eq!(entries(&t), expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys = small_key_set();

    // Insert in a fixed order, then remove in all permutations.
    let mut base: RadixTree<u64> = RadixTree::new();
    let mut base_map: HashMap<Vec<u8>, u64> = HashMap::new();
    for (i, k) in keys.iter().enumerate() {
        let v = i as u64;
        assert_eq!(base.insert(k, v), base_map.insert(k.clone(), v));
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        let mut m = base_map.clone();

        for k in perm {
            assert_eq!(t.remove(&k), m.remove(&k));
            assert_eq!(t.len(), m.len());
            validate_tree(&t);
            for (rest, v) in &m {
                assert_eq!(t.get(rest), Some(v));
            }
        }
        assert_eq!(t.len(), 0);
        assert_eq!(t.node_count(), 1);
        assert_eq!(t.free_nodes(), 7);
    });
}
